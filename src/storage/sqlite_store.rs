use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::IssueRepository;
use crate::entity::{
    Category, CategoryRef, Comment, Issue, IssueKeyword, IssueState, Keyword,
    KnowledgeBaseArticle, NewArticle, NewComment, NewIssue, NewUser, State, User, UserRef,
    UserRole, ROLE_IT_STAFF, ROLE_MANAGER, ROLE_USER,
};
use crate::error::{HelpdeskError, Result};

pub const HELPDESK_DIR: &str = ".helpdesk";
const HELPDESK_DB: &str = "helpdesk.db";

const ISSUE_COLUMNS: &str = "id, title, description, resolution_details, category_id, category,
     state, date_reported, date_resolved, reported_by_id, reported_by_name,
     assigned_to_id, assigned_to_name";

const USER_SELECT: &str = "SELECT u.id, u.username, u.password, u.first_name, u.last_name,
            u.email, u.contact_number, u.role_id, r.name
     FROM users u JOIN roles r ON r.id = u.role_id";

const COMMENT_SELECT: &str = "SELECT c.id, c.issue_id, c.user_id,
            u.first_name || ' ' || u.last_name, c.text, c.date
     FROM comments c LEFT JOIN users u ON u.id = c.user_id";

const ARTICLE_SELECT: &str = "SELECT k.id, k.issue_id, i.title, i.description, k.title,
            k.description, k.resolution_details, k.date_resolved
     FROM knowledge_base k JOIN issues i ON i.id = k.issue_id";

/// SQLite-backed store for every helpdesk record.
///
/// One connection, opened per process. There is no version stamp on issue
/// rows, so concurrent updates to the same issue are last-write-wins.
pub struct SqliteStore {
    conn: Connection,
    path: PathBuf,
}

impl SqliteStore {
    /// Initialize a new helpdesk project under `root`
    pub fn init(root: &Path) -> Result<Self> {
        let helpdesk_dir = root.join(HELPDESK_DIR);

        if helpdesk_dir.exists() {
            return Err(HelpdeskError::AlreadyInitialized);
        }

        fs::create_dir_all(&helpdesk_dir)?;

        let path = helpdesk_dir.join(HELPDESK_DB);
        let store = Self::connect(path)?;
        store.seed()?;

        tracing::info!(path = %store.path.display(), "initialized helpdesk database");
        Ok(store)
    }

    /// Open an existing helpdesk project
    pub fn open(root: &Path) -> Result<Self> {
        let path = root.join(HELPDESK_DIR).join(HELPDESK_DB);

        if !path.exists() {
            return Err(HelpdeskError::NotInitialized);
        }

        Self::connect(path)
    }

    fn connect(path: PathBuf) -> Result<Self> {
        let conn = Connection::open(&path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let store = Self { conn, path };
        store.init_schema()?;
        Ok(store)
    }

    /// Directory holding the database, config and exports.
    pub fn helpdesk_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS roles (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT NOT NULL,
                contact_number TEXT,
                role_id INTEGER NOT NULL REFERENCES roles(id)
            );

            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS states (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS issues (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                resolution_details TEXT,
                category_id INTEGER NOT NULL REFERENCES categories(id),
                state TEXT NOT NULL,
                date_reported TEXT NOT NULL,
                date_resolved TEXT,
                reported_by_id INTEGER NOT NULL REFERENCES users(id),
                assigned_to_id INTEGER REFERENCES users(id)
            );

            CREATE INDEX IF NOT EXISTS idx_issues_category ON issues(category_id);
            CREATE INDEX IF NOT EXISTS idx_issues_assigned ON issues(assigned_to_id);
            CREATE INDEX IF NOT EXISTS idx_issues_reporter ON issues(reported_by_id);

            CREATE TABLE IF NOT EXISTS keywords (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS issue_keywords (
                id INTEGER PRIMARY KEY,
                issue_id INTEGER NOT NULL REFERENCES issues(id),
                keyword_id INTEGER NOT NULL REFERENCES keywords(id),
                UNIQUE (issue_id, keyword_id)
            );

            CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY,
                issue_id INTEGER NOT NULL REFERENCES issues(id),
                user_id INTEGER NOT NULL REFERENCES users(id),
                text TEXT NOT NULL,
                date TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_comments_issue ON comments(issue_id);

            CREATE TABLE IF NOT EXISTS knowledge_base (
                id INTEGER PRIMARY KEY,
                issue_id INTEGER NOT NULL REFERENCES issues(id),
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                resolution_details TEXT,
                date_resolved TEXT
            );

            -- Issues with category, reporter and assignee names resolved
            CREATE VIEW IF NOT EXISTS issue_view AS
            SELECT i.id, i.title, i.description, i.resolution_details,
                   i.category_id, c.name AS category, i.state,
                   i.date_reported, i.date_resolved,
                   i.reported_by_id, r.first_name || ' ' || r.last_name AS reported_by_name,
                   i.assigned_to_id, a.first_name || ' ' || a.last_name AS assigned_to_name
            FROM issues i
            LEFT JOIN categories c ON c.id = i.category_id
            LEFT JOIN users r ON r.id = i.reported_by_id
            LEFT JOIN users a ON a.id = i.assigned_to_id;
            ",
        )?;
        Ok(())
    }

    fn seed(&self) -> Result<()> {
        for role in [ROLE_USER, ROLE_IT_STAFF, ROLE_MANAGER] {
            self.conn
                .execute("INSERT OR IGNORE INTO roles (name) VALUES (?1)", [role])?;
        }
        for state in IssueState::KNOWN {
            self.conn
                .execute("INSERT OR IGNORE INTO states (name) VALUES (?1)", [state])?;
        }
        Ok(())
    }

    fn query_issues(&self, filter: &str, id: Option<i64>) -> Result<Vec<Issue>> {
        let sql = format!("SELECT {} FROM issue_view {} ORDER BY id", ISSUE_COLUMNS, filter);
        let mut stmt = self.conn.prepare(&sql)?;

        let issues = match id {
            Some(id) => stmt.query_map([id], issue_from_row)?,
            None => stmt.query_map([], issue_from_row)?,
        }
        .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(issues)
    }

    // ------------------------------------------------------------------
    // Users and roles
    // ------------------------------------------------------------------

    pub fn insert_user(&self, user: &NewUser) -> Result<User> {
        self.conn.execute(
            "INSERT INTO users
             (username, password, first_name, last_name, email, contact_number, role_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user.username,
                user.password,
                user.first_name,
                user.last_name,
                user.email,
                user.contact_number,
                user.role_id,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::info!(user = id, username = %user.username, "registered user");
        self.get_user(id)?
            .ok_or_else(|| HelpdeskError::Storage("Failed to read back new user".to_string()))
    }

    pub fn update_user(&self, user: &User) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE users SET username = ?1, password = ?2, first_name = ?3, last_name = ?4,
                    email = ?5, contact_number = ?6, role_id = ?7
             WHERE id = ?8",
            params![
                user.username,
                user.password,
                user.first_name,
                user.last_name,
                user.email,
                user.contact_number,
                user.role_id,
                user.id,
            ],
        )?;
        expect_changed(changed, "User", user.id)
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("{} WHERE u.id = ?1", USER_SELECT);
        let user = self.conn.query_row(&sql, [id], user_from_row).optional()?;
        Ok(user)
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("{} WHERE u.username = ?1", USER_SELECT);
        let user = self
            .conn
            .query_row(&sql, [username], user_from_row)
            .optional()?;
        Ok(user)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        let sql = format!("{} ORDER BY u.id", USER_SELECT);
        let mut stmt = self.conn.prepare(&sql)?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Look up a user by numeric id or username.
    ///
    /// A numeric key that matches no id is tried as a username.
    pub fn lookup_user(&self, key: &str) -> Result<User> {
        let key = key.trim();
        let by_id = match key.parse::<i64>() {
            Ok(id) => self.get_user(id)?,
            Err(_) => None,
        };
        let found = match by_id {
            Some(user) => Some(user),
            None => self.get_user_by_username(key)?,
        };
        found.ok_or_else(|| HelpdeskError::not_found("User", key))
    }

    /// Users who can be assigned issues.
    pub fn list_staff(&self) -> Result<Vec<User>> {
        Ok(self
            .list_users()?
            .into_iter()
            .filter(User::is_staff)
            .collect())
    }

    pub fn list_roles(&self) -> Result<Vec<UserRole>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM roles ORDER BY id")?;
        let roles = stmt
            .query_map([], |row| {
                Ok(UserRole {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(roles)
    }

    pub fn insert_role(&self, name: &str) -> Result<UserRole> {
        self.conn
            .execute("INSERT INTO roles (name) VALUES (?1)", [name])?;
        Ok(UserRole {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    pub fn update_role(&self, role: &UserRole) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE roles SET name = ?1 WHERE id = ?2",
            params![role.name, role.id],
        )?;
        expect_changed(changed, "Role", role.id)
    }

    /// Look up a role by name, ignoring case.
    pub fn find_role(&self, name: &str) -> Result<Option<UserRole>> {
        Ok(self
            .list_roles()?
            .into_iter()
            .find(|r| r.name.eq_ignore_ascii_case(name)))
    }

    // ------------------------------------------------------------------
    // Categories and states
    // ------------------------------------------------------------------

    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM categories ORDER BY id")?;
        let categories = stmt
            .query_map([], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let category = self
            .conn
            .query_row(
                "SELECT id, name FROM categories WHERE id = ?1",
                [id],
                |row| {
                    Ok(Category {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(category)
    }

    /// Look up a category by name, ignoring case.
    pub fn find_category(&self, name: &str) -> Result<Option<Category>> {
        Ok(self
            .list_categories()?
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(name)))
    }

    /// Look up a category by numeric id or name.
    pub fn lookup_category(&self, key: &str) -> Result<Category> {
        let key = key.trim();
        let by_id = match key.parse::<i64>() {
            Ok(id) => self.get_category(id)?,
            Err(_) => None,
        };
        let found = match by_id {
            Some(category) => Some(category),
            None => self.find_category(key)?,
        };
        found.ok_or_else(|| HelpdeskError::not_found("Category", key))
    }

    pub fn insert_category(&self, name: &str) -> Result<Category> {
        self.conn
            .execute("INSERT INTO categories (name) VALUES (?1)", [name])?;
        Ok(Category {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    pub fn update_category(&self, category: &Category) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE categories SET name = ?1 WHERE id = ?2",
            params![category.name, category.id],
        )?;
        expect_changed(changed, "Category", category.id)
    }

    pub fn list_states(&self) -> Result<Vec<State>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM states ORDER BY id")?;
        let states = stmt
            .query_map([], |row| {
                Ok(State {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(states)
    }

    pub fn insert_state(&self, name: &str) -> Result<State> {
        self.conn
            .execute("INSERT INTO states (name) VALUES (?1)", [name])?;
        Ok(State {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    pub fn update_state(&self, state: &State) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE states SET name = ?1 WHERE id = ?2",
            params![state.name, state.id],
        )?;
        expect_changed(changed, "State", state.id)
    }

    // ------------------------------------------------------------------
    // Keywords
    // ------------------------------------------------------------------

    pub fn list_keywords(&self) -> Result<Vec<Keyword>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM keywords ORDER BY id")?;
        let keywords = stmt
            .query_map([], |row| {
                Ok(Keyword {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keywords)
    }

    pub fn insert_keyword(&self, name: &str) -> Result<Keyword> {
        self.conn
            .execute("INSERT INTO keywords (name) VALUES (?1)", [name])?;
        Ok(Keyword {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    pub fn update_keyword(&self, keyword: &Keyword) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE keywords SET name = ?1 WHERE id = ?2",
            params![keyword.name, keyword.id],
        )?;
        expect_changed(changed, "Keyword", keyword.id)
    }

    /// Find a keyword by name, creating it if needed.
    pub fn ensure_keyword(&self, name: &str) -> Result<Keyword> {
        let existing = self
            .conn
            .query_row(
                "SELECT id, name FROM keywords WHERE name = ?1",
                [name],
                |row| {
                    Ok(Keyword {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;

        match existing {
            Some(keyword) => Ok(keyword),
            None => self.insert_keyword(name),
        }
    }

    pub fn add_issue_keyword(&self, issue_id: i64, keyword_id: i64) -> Result<IssueKeyword> {
        self.conn.execute(
            "INSERT OR IGNORE INTO issue_keywords (issue_id, keyword_id) VALUES (?1, ?2)",
            params![issue_id, keyword_id],
        )?;

        self.list_issue_keywords(issue_id)?
            .into_iter()
            .find(|k| k.keyword_id == keyword_id)
            .ok_or_else(|| HelpdeskError::Storage("Failed to read back issue keyword".to_string()))
    }

    pub fn list_issue_keywords(&self, issue_id: i64) -> Result<Vec<IssueKeyword>> {
        let mut stmt = self.conn.prepare(
            "SELECT ik.id, ik.issue_id, ik.keyword_id, k.name
             FROM issue_keywords ik JOIN keywords k ON k.id = ik.keyword_id
             WHERE ik.issue_id = ?1
             ORDER BY ik.id",
        )?;
        let keywords = stmt
            .query_map([issue_id], |row| {
                Ok(IssueKeyword {
                    id: row.get(0)?,
                    issue_id: row.get(1)?,
                    keyword_id: row.get(2)?,
                    keyword: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keywords)
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    pub fn insert_comment(&self, comment: &NewComment) -> Result<Comment> {
        self.conn.execute(
            "INSERT INTO comments (issue_id, user_id, text, date) VALUES (?1, ?2, ?3, ?4)",
            params![
                comment.issue_id,
                comment.user_id,
                comment.text,
                comment.date.to_rfc3339(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!(issue = comment.issue_id, comment = id, "added comment");

        let sql = format!("{} WHERE c.id = ?1", COMMENT_SELECT);
        let stored = self.conn.query_row(&sql, [id], comment_from_row)?;
        Ok(stored)
    }

    pub fn update_comment(&self, comment: &Comment) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE comments SET issue_id = ?1, user_id = ?2, text = ?3, date = ?4 WHERE id = ?5",
            params![
                comment.issue_id,
                comment.user_id,
                comment.text,
                comment.date.to_rfc3339(),
                comment.id,
            ],
        )?;
        expect_changed(changed, "Comment", comment.id)
    }

    pub fn list_comments(&self, issue_id: i64) -> Result<Vec<Comment>> {
        let sql = format!("{} WHERE c.issue_id = ?1 ORDER BY c.date, c.id", COMMENT_SELECT);
        let mut stmt = self.conn.prepare(&sql)?;
        let comments = stmt
            .query_map([issue_id], comment_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(comments)
    }

    // ------------------------------------------------------------------
    // Knowledge base
    // ------------------------------------------------------------------

    pub fn insert_article(&self, article: &NewArticle) -> Result<KnowledgeBaseArticle> {
        self.conn.execute(
            "INSERT INTO knowledge_base
             (issue_id, title, description, resolution_details, date_resolved)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                article.issue_id,
                article.title,
                article.description,
                article.resolution_details,
                article.date_resolved.map(|d| d.to_rfc3339()),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::info!(issue = article.issue_id, article = id, "published article");

        let sql = format!("{} WHERE k.id = ?1", ARTICLE_SELECT);
        let stored = self.conn.query_row(&sql, [id], article_from_row)?;
        Ok(stored)
    }

    pub fn update_article(&self, article: &KnowledgeBaseArticle) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE knowledge_base
             SET issue_id = ?1, title = ?2, description = ?3, resolution_details = ?4,
                 date_resolved = ?5
             WHERE id = ?6",
            params![
                article.issue_id,
                article.title,
                article.description,
                article.resolution_details,
                article.date_resolved.map(|d| d.to_rfc3339()),
                article.id,
            ],
        )?;
        expect_changed(changed, "Article", article.id)
    }

    pub fn list_articles(&self) -> Result<Vec<KnowledgeBaseArticle>> {
        let sql = format!("{} ORDER BY k.id", ARTICLE_SELECT);
        let mut stmt = self.conn.prepare(&sql)?;
        let articles = stmt
            .query_map([], article_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(articles)
    }

    pub fn list_articles_for_issue(&self, issue_id: i64) -> Result<Vec<KnowledgeBaseArticle>> {
        let sql = format!("{} WHERE k.issue_id = ?1 ORDER BY k.id", ARTICLE_SELECT);
        let mut stmt = self.conn.prepare(&sql)?;
        let articles = stmt
            .query_map([issue_id], article_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(articles)
    }
}

impl IssueRepository for SqliteStore {
    fn fetch_all_issues(&self) -> Result<Vec<Issue>> {
        self.query_issues("", None)
    }

    fn fetch_issue(&self, id: i64) -> Result<Option<Issue>> {
        let sql = format!("SELECT {} FROM issue_view WHERE id = ?1", ISSUE_COLUMNS);
        let issue = self.conn.query_row(&sql, [id], issue_from_row).optional()?;
        Ok(issue)
    }

    fn fetch_issues_by_category(&self, category_id: i64) -> Result<Vec<Issue>> {
        self.query_issues("WHERE category_id = ?1", Some(category_id))
    }

    fn fetch_issues_assigned_to(&self, user_id: i64) -> Result<Vec<Issue>> {
        self.query_issues("WHERE assigned_to_id = ?1", Some(user_id))
    }

    fn fetch_issues_created_by(&self, user_id: i64) -> Result<Vec<Issue>> {
        self.query_issues("WHERE reported_by_id = ?1", Some(user_id))
    }

    fn insert_issue(&self, issue: &NewIssue) -> Result<Issue> {
        if self.get_category(issue.category_id)?.is_none() {
            return Err(HelpdeskError::not_found("Category", issue.category_id));
        }
        if self.get_user(issue.reporter_id)?.is_none() {
            return Err(HelpdeskError::not_found("User", issue.reporter_id));
        }

        self.conn.execute(
            "INSERT INTO issues
             (title, description, resolution_details, category_id, state,
              date_reported, date_resolved, reported_by_id, assigned_to_id)
             VALUES (?1, ?2, NULL, ?3, ?4, ?5, NULL, ?6, NULL)",
            params![
                issue.title,
                issue.description,
                issue.category_id,
                IssueState::New.to_string(),
                issue.date_reported.to_rfc3339(),
                issue.reporter_id,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::info!(issue = id, reporter = issue.reporter_id, "reported issue");

        self.fetch_issue(id)?
            .ok_or_else(|| HelpdeskError::Storage("Failed to read back new issue".to_string()))
    }

    fn update_issue(&self, issue: &Issue) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE issues
             SET title = ?1, description = ?2, resolution_details = ?3, category_id = ?4,
                 state = ?5, date_reported = ?6, date_resolved = ?7, reported_by_id = ?8,
                 assigned_to_id = ?9
             WHERE id = ?10",
            params![
                issue.title,
                issue.description,
                issue.resolution_details,
                issue.category.id,
                issue.state.to_string(),
                issue.date_reported.to_rfc3339(),
                issue.date_resolved.map(|d| d.to_rfc3339()),
                issue.reporter.id,
                issue.assignee.as_ref().map(|a| a.id),
                issue.id,
            ],
        )?;

        tracing::debug!(issue = issue.id, state = %issue.state, "updated issue");
        expect_changed(changed, "Issue", issue.id)
    }
}

fn expect_changed(changed: usize, kind: &'static str, id: i64) -> Result<()> {
    if changed == 0 {
        return Err(HelpdeskError::not_found(kind, id));
    }
    Ok(())
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_optional_timestamp(idx: usize, value: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    value.map(|v| parse_timestamp(idx, &v)).transpose()
}

fn issue_from_row(row: &Row<'_>) -> rusqlite::Result<Issue> {
    let state: String = row.get(6)?;
    let date_reported: String = row.get(7)?;
    let assigned_to_id: Option<i64> = row.get(11)?;

    Ok(Issue {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        resolution_details: row.get(3)?,
        category: CategoryRef {
            id: row.get(4)?,
            name: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        },
        state: IssueState::from(state),
        date_reported: parse_timestamp(7, &date_reported)?,
        date_resolved: parse_optional_timestamp(8, row.get(8)?)?,
        reporter: UserRef {
            id: row.get(9)?,
            full_name: row.get(10)?,
        },
        assignee: match assigned_to_id {
            Some(id) => Some(UserRef {
                id,
                full_name: row.get(12)?,
            }),
            None => None,
        },
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        email: row.get(5)?,
        contact_number: row.get(6)?,
        role_id: row.get(7)?,
        role: row.get(8)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    let date: String = row.get(5)?;
    Ok(Comment {
        id: row.get(0)?,
        issue_id: row.get(1)?,
        user_id: row.get(2)?,
        user_full_name: row.get(3)?,
        text: row.get(4)?,
        date: parse_timestamp(5, &date)?,
    })
}

fn article_from_row(row: &Row<'_>) -> rusqlite::Result<KnowledgeBaseArticle> {
    Ok(KnowledgeBaseArticle {
        id: row.get(0)?,
        issue_id: row.get(1)?,
        issue_title: row.get(2)?,
        issue_description: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        resolution_details: row.get(6)?,
        date_resolved: parse_optional_timestamp(7, row.get(7)?)?,
    })
}
