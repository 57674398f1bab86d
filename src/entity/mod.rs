mod article;
mod comment;
mod issue;
mod lookup;
mod user;

pub use article::{KnowledgeBaseArticle, NewArticle};
pub use comment::{Comment, NewComment};
pub use issue::{CategoryRef, Issue, IssueState, NewIssue, UserRef};
pub use lookup::{Category, IssueKeyword, Keyword, State};
pub use user::{NewUser, User, UserRole, ROLE_IT_STAFF, ROLE_MANAGER, ROLE_USER};
