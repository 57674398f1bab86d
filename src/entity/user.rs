// src/entity/user.rs
use serde::{Deserialize, Serialize};

pub const ROLE_USER: &str = "User";
pub const ROLE_IT_STAFF: &str = "IT Staff";
pub const ROLE_MANAGER: &str = "Manager";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    pub id: i64,
    pub name: String,
}

/// A reporter, staff member, or manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Stored credential. Never written to output.
    #[serde(skip_serializing, default)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub contact_number: Option<String>,
    pub role_id: i64,
    pub role: String,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Staff are the only valid assignment targets.
    pub fn is_staff(&self) -> bool {
        self.role.eq_ignore_ascii_case(ROLE_IT_STAFF)
    }

    pub fn is_manager(&self) -> bool {
        self.role.eq_ignore_ascii_case(ROLE_MANAGER)
    }
}

/// Sign-up payload.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub contact_number: Option<String>,
    pub role_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> User {
        User {
            id: 1,
            username: "jdoe".to_string(),
            password: "hunter2".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            contact_number: None,
            role_id: 2,
            role: role.to_string(),
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(user(ROLE_USER).full_name(), "Jane Doe");
    }

    #[test]
    fn test_staff_role_is_case_insensitive() {
        assert!(user("it staff").is_staff());
        assert!(!user(ROLE_MANAGER).is_staff());
        assert!(user(ROLE_MANAGER).is_manager());
    }

    #[test]
    fn test_password_not_serialized() {
        let json = serde_json::to_string(&user(ROLE_USER)).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(!json.contains("password"));
    }
}
