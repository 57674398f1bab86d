use std::env;
use std::io::{self, Read};
use std::path::PathBuf;

use chrono::{Local, Utc};

use crate::config::HelpdeskConfig;
use crate::entity::{Issue, NewIssue, NewUser, User, UserRef};
use crate::error::{HelpdeskError, Result};
use crate::export::{generate_export, EXPORT_DIR};
use crate::knowledge;
use crate::lifecycle::{self, Action};
use crate::mcp::HelpdeskServer;
use crate::resolution::{resolving_days, with_resolving_times};
use crate::search::parse_query;
use crate::stats::Statistics;
use crate::storage::{IssueRepository, SqliteStore, HELPDESK_DIR};

/// Find the project root by looking for .helpdesk/
fn find_project_root() -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut current = cwd.as_path();
    loop {
        if current.join(HELPDESK_DIR).exists() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return cwd,
        }
    }
}

fn open_project() -> Result<(SqliteStore, HelpdeskConfig)> {
    let root = find_project_root();
    let store = SqliteStore::open(&root)?;
    let config = HelpdeskConfig::load(store.helpdesk_dir())?;
    Ok((store, config))
}

fn require_staff(user: &User) -> Result<()> {
    if !user.is_staff() {
        return Err(HelpdeskError::Validation(format!(
            "{} is not IT staff (role '{}')",
            user.username, user.role
        )));
    }
    Ok(())
}

fn print_issue_line(issue: &Issue) {
    let days = resolving_days(&issue.date_reported, &issue.state, &Local::now())
        .map(|d| format!(" - {}d open", d))
        .unwrap_or_default();
    let assignee = issue
        .assignee_name()
        .map(|n| format!(" @{}", n))
        .unwrap_or_default();

    println!(
        "  #{:<4} [{}] {} ({}){}{}",
        issue.id, issue.state, issue.title, issue.category.name, assignee, days
    );
}

fn print_issue_result(verb: &str, issue: &Issue, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(issue)?);
    } else {
        println!("{} issue #{} [{}] - {}", verb, issue.id, issue.state, issue.title);
    }
    Ok(())
}

fn run_action(id: i64, action: Action, verb: &str, json: bool) -> Result<()> {
    let (store, config) = open_project()?;
    let issue = lifecycle::execute(&store, id, &action, Utc::now(), config.transition_policy)?;
    print_issue_result(verb, &issue, json)
}

pub fn handle_init() -> Result<()> {
    let root = env::current_dir()?;

    let store = SqliteStore::init(&root)?;
    HelpdeskConfig::default().save(store.helpdesk_dir())?;

    println!("Initialized helpdesk in {}", root.display());
    Ok(())
}

pub fn handle_report(
    title: String,
    description: String,
    category: String,
    user: String,
    stdin: bool,
    json: bool,
) -> Result<()> {
    if title.trim().is_empty() {
        return Err(HelpdeskError::Validation("Title cannot be empty".to_string()));
    }

    let (store, _config) = open_project()?;
    let category = store.lookup_category(&category)?;
    let reporter = store.lookup_user(&user)?;

    let mut description = description;
    if stdin {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        if !content.is_empty() {
            description = content;
        }
    }

    let new_issue = NewIssue::new(title.trim().to_string(), description, category.id, reporter.id);
    let issue = store.insert_issue(&new_issue)?;

    print_issue_result("Reported", &issue, json)
}

pub fn handle_list(
    query: Vec<String>,
    assigned_to: Option<String>,
    reported_by: Option<String>,
    json: bool,
) -> Result<()> {
    let (store, _config) = open_project()?;

    let issues = match (assigned_to, reported_by) {
        (Some(staff), _) => {
            let staff = store.lookup_user(&staff)?;
            store.fetch_issues_assigned_to(staff.id)?
        }
        (None, Some(reporter)) => {
            let reporter = store.lookup_user(&reporter)?;
            store.fetch_issues_created_by(reporter.id)?
        }
        (None, None) => store.fetch_all_issues()?,
    };

    let filter = parse_query(&query.join(" "));
    let issues = filter.apply(issues);

    if json {
        let listed = with_resolving_times(issues, &Local::now());
        println!("{}", serde_json::to_string_pretty(&listed)?);
    } else if issues.is_empty() {
        println!("No issues found.");
    } else {
        println!("Issues:\n");
        for issue in &issues {
            print_issue_line(issue);
        }
    }

    Ok(())
}

pub fn handle_get(id: i64, json: bool) -> Result<()> {
    let (store, _config) = open_project()?;

    let issue = store
        .fetch_issue(id)?
        .ok_or_else(|| HelpdeskError::not_found("Issue", id))?;
    let comments = store.list_comments(id)?;
    let keywords: Vec<String> = store
        .list_issue_keywords(id)?
        .into_iter()
        .map(|k| k.keyword)
        .collect();
    let resolving_time = resolving_days(&issue.date_reported, &issue.state, &Local::now());

    if json {
        #[derive(serde::Serialize)]
        struct IssueDetail<'a> {
            #[serde(flatten)]
            issue: &'a Issue,
            resolving_time: Option<i64>,
            keywords: &'a [String],
            comments: &'a [crate::entity::Comment],
        }

        let detail = IssueDetail {
            issue: &issue,
            resolving_time,
            keywords: &keywords,
            comments: &comments,
        };
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    println!("Issue #{}", issue.id);
    println!("Title: {}", issue.title);
    println!("Category: {}", issue.category.name);
    println!("State: {}", issue.state);
    println!(
        "Reported: {} by {}",
        issue.date_reported.format("%Y-%m-%d %H:%M"),
        issue.reporter.full_name.as_deref().unwrap_or("unknown")
    );
    if let Some(name) = issue.assignee_name() {
        println!("Assignee: {}", name);
    }
    if let Some(days) = resolving_time {
        println!("Open for: {} days", days);
    }
    if let Some(resolved) = issue.date_resolved {
        println!("Resolved: {}", resolved.format("%Y-%m-%d %H:%M"));
    }
    if !keywords.is_empty() {
        println!("Keywords: {}", keywords.join(", "));
    }
    if !issue.description.is_empty() {
        println!("\n{}", issue.description);
    }
    if let Some(details) = &issue.resolution_details {
        println!("\nResolution: {}", details);
    }
    if !comments.is_empty() {
        println!("\nComments:");
        for c in &comments {
            println!(
                "  [{}] {}: {}",
                c.date.format("%Y-%m-%d %H:%M"),
                c.user_full_name.as_deref().unwrap_or("unknown"),
                c.text
            );
        }
    }

    Ok(())
}

pub fn handle_assign(id: i64, staff: String, json: bool) -> Result<()> {
    let (store, config) = open_project()?;
    let staff = store.lookup_user(&staff)?;
    require_staff(&staff)?;

    let action = Action::Assign { staff_id: staff.id };
    let issue = lifecycle::execute(&store, id, &action, Utc::now(), config.transition_policy)?;
    print_issue_result("Assigned", &issue, json)
}

pub fn handle_nominate(id: i64, staff: String, json: bool) -> Result<()> {
    let (store, config) = open_project()?;
    let staff = store.lookup_user(&staff)?;
    require_staff(&staff)?;

    let action = Action::Nominate {
        staff: UserRef::new(staff.id, staff.full_name()),
    };
    let issue = lifecycle::execute(&store, id, &action, Utc::now(), config.transition_policy)?;
    print_issue_result("Nominated", &issue, json)
}

pub fn handle_comment(id: i64, text: String, user: String, json: bool) -> Result<()> {
    if text.trim().is_empty() {
        return Err(HelpdeskError::Validation("Comment cannot be empty".to_string()));
    }

    let (store, _config) = open_project()?;
    let user = store.lookup_user(&user)?;
    let issue = store
        .fetch_issue(id)?
        .ok_or_else(|| HelpdeskError::not_found("Issue", id))?;

    let comment = store.insert_comment(&lifecycle::comment(&issue, user.id, text, Utc::now()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&comment)?);
    } else {
        println!("Commented on issue #{}", issue.id);
    }
    Ok(())
}

pub fn handle_resolve(id: i64, resolution: String, json: bool) -> Result<()> {
    run_action(id, Action::Resolve { resolution }, "Resolved", json)
}

pub fn handle_set_state(id: i64, state: String, json: bool) -> Result<()> {
    if state.trim().is_empty() {
        return Err(HelpdeskError::Validation("State cannot be empty".to_string()));
    }
    run_action(id, Action::UpdateState { state }, "Updated", json)
}

pub fn handle_finalize(id: i64, json: bool) -> Result<()> {
    run_action(id, Action::Finalize, "Finalized", json)
}

pub fn handle_stats(json: bool) -> Result<()> {
    let (store, config) = open_project()?;
    let options = config.stats_options();
    let stats = Statistics::collect(&store, &Utc::now(), &options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Total issues: {}", stats.total_issues);
    println!(
        "Average resolution time (last {} days): {:.1} days",
        options.window_days, stats.average_resolution_time
    );

    let sections = [
        ("By category", &stats.issues_per_category),
        ("By state", &stats.issues_per_status),
        ("By staff", &stats.issues_per_staff),
    ];
    for (heading, counts) in sections {
        println!("\n{}:", heading);
        if counts.is_empty() {
            println!("  (none)");
        }
        for (key, count) in counts {
            println!("  {:<20} {}", key, count);
        }
    }

    println!("\nLongest unresolved:");
    if stats.longest_unresolved.is_empty() {
        println!("  (none)");
    }
    for issue in &stats.longest_unresolved {
        print_issue_line(issue);
    }

    Ok(())
}

pub fn handle_kb_list(category: Option<String>, json: bool) -> Result<()> {
    let (store, _config) = open_project()?;
    let issues = store.fetch_all_issues()?;
    let groups = knowledge::articles_by_category(&issues, category.as_deref());

    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
    } else if groups.is_empty() {
        println!("No resolved issues found.");
    } else {
        for (name, resolved) in &groups {
            println!("{}:", name);
            for issue in resolved {
                let resolution = issue.resolution_details.as_deref().unwrap_or("");
                println!("  #{:<4} {} - {}", issue.id, issue.title, resolution);
            }
            println!();
        }
    }

    Ok(())
}

pub fn handle_kb_publish(id: i64, title: String, description: String, json: bool) -> Result<()> {
    let (store, _config) = open_project()?;
    let issue = store
        .fetch_issue(id)?
        .ok_or_else(|| HelpdeskError::not_found("Issue", id))?;

    let draft = knowledge::draft_article(&issue, &title, &description)?;
    let article = store.insert_article(&draft)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&article)?);
    } else {
        println!("Published article {} - {}", article.id, article.title);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn handle_user_add(
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    contact_number: Option<String>,
    role: String,
    password: String,
    json: bool,
) -> Result<()> {
    if username.trim().is_empty() {
        return Err(HelpdeskError::Validation("Username cannot be empty".to_string()));
    }

    let (store, _config) = open_project()?;
    if store.get_user_by_username(&username)?.is_some() {
        return Err(HelpdeskError::Validation(format!(
            "Username '{}' is already taken",
            username
        )));
    }

    let role = store
        .find_role(&role)?
        .ok_or_else(|| HelpdeskError::not_found("Role", &role))?;

    let user = store.insert_user(&NewUser {
        username,
        password,
        first_name,
        last_name,
        email,
        contact_number,
        role_id: role.id,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else {
        println!("Added user {} ({}) - {}", user.id, user.username, user.full_name());
    }
    Ok(())
}

pub fn handle_user_list(staff: bool, json: bool) -> Result<()> {
    let (store, _config) = open_project()?;
    let users = if staff {
        store.list_staff()?
    } else {
        store.list_users()?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
    } else if users.is_empty() {
        println!("No users found.");
    } else {
        for u in users {
            println!("  {:<4} {:<16} [{}] {}", u.id, u.username, u.role, u.full_name());
        }
    }
    Ok(())
}

pub fn handle_category_add(name: String, json: bool) -> Result<()> {
    if name.trim().is_empty() {
        return Err(HelpdeskError::Validation("Category name cannot be empty".to_string()));
    }

    let (store, _config) = open_project()?;
    let category = store.insert_category(name.trim())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&category)?);
    } else {
        println!("Added category {} - {}", category.id, category.name);
    }
    Ok(())
}

pub fn handle_category_list(json: bool) -> Result<()> {
    let (store, _config) = open_project()?;
    let categories = store.list_categories()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
    } else if categories.is_empty() {
        println!("No categories found.");
    } else {
        for c in categories {
            println!("  {:<4} {}", c.id, c.name);
        }
    }
    Ok(())
}

pub fn handle_keyword_add(name: String, json: bool) -> Result<()> {
    let (store, _config) = open_project()?;
    let keyword = store.ensure_keyword(name.trim())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&keyword)?);
    } else {
        println!("Keyword {} - {}", keyword.id, keyword.name);
    }
    Ok(())
}

pub fn handle_keyword_list(json: bool) -> Result<()> {
    let (store, _config) = open_project()?;
    let keywords = store.list_keywords()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&keywords)?);
    } else if keywords.is_empty() {
        println!("No keywords found.");
    } else {
        for k in keywords {
            println!("  {:<4} {}", k.id, k.name);
        }
    }
    Ok(())
}

pub fn handle_keyword_tag(id: i64, keyword: String, json: bool) -> Result<()> {
    let (store, _config) = open_project()?;
    if store.fetch_issue(id)?.is_none() {
        return Err(HelpdeskError::not_found("Issue", id));
    }

    let keyword = store.ensure_keyword(keyword.trim())?;
    let tag = store.add_issue_keyword(id, keyword.id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tag)?);
    } else {
        println!("Tagged issue #{} with '{}'", id, tag.keyword);
    }
    Ok(())
}

pub fn handle_export(json: bool) -> Result<()> {
    let (store, config) = open_project()?;
    let export_dir = store.helpdesk_dir().join(EXPORT_DIR);

    let stats = generate_export(&store, &export_dir, &Utc::now(), &config.stats_options())?;

    if json {
        #[derive(serde::Serialize)]
        struct ExportJson<'a> {
            directory: String,
            open_issues: usize,
            closed_issues: usize,
            kb_categories: usize,
            files: &'a [String],
        }

        let out = ExportJson {
            directory: export_dir.display().to_string(),
            open_issues: stats.open_issues,
            closed_issues: stats.closed_issues,
            kb_categories: stats.kb_categories,
            files: &stats.files_generated,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "Exported {} open and {} closed issues, {} knowledge-base categories to {}",
            stats.open_issues,
            stats.closed_issues,
            stats.kb_categories,
            export_dir.display()
        );
    }
    Ok(())
}

pub fn handle_serve(http: Option<String>) -> Result<()> {
    let (store, config) = open_project()?;
    let server = HelpdeskServer::new(store, config);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        match http {
            Some(addr) => server.serve_http(&addr).await,
            None => server.serve_stdio().await,
        }
    })
}
