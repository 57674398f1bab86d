use thiserror::Error;

#[derive(Error, Debug)]
pub enum HelpdeskError {
    #[error("Not in a helpdesk project. Run 'helpdesk init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .helpdesk/ to reinitialize.")]
    AlreadyInitialized,

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Cannot {action} an issue in state '{from}'")]
    InvalidTransition { from: String, action: &'static str },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl HelpdeskError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        HelpdeskError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<rusqlite::Error> for HelpdeskError {
    fn from(e: rusqlite::Error) -> Self {
        HelpdeskError::Storage(format!("SQLite error: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, HelpdeskError>;
