use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::id::RecordId;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

pub const DEMO_PASSWORD: &str = "demo123";
pub const DEMO_USER_COUNT: u64 = 10;

/// All registered users, keyed by email.
pub type UserDirectory = BTreeMap<String, User>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: RecordId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    // Stored as typed; this is a demo with no real security.
    pub password: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Registration form contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Returns a user-facing reason when the form can't be accepted.
    pub fn validate(&self) -> Result<(), String> {
        if !EMAIL_RE.is_match(self.email.trim()) {
            return Err(format!("'{}' is not a valid email address", self.email));
        }
        if self.password.is_empty() {
            return Err("Password must not be empty".to_string());
        }
        Ok(())
    }

    pub fn into_user(self, id: RecordId) -> User {
        User {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email.trim().to_string(),
            password: self.password,
            created_at: Utc::now(),
        }
    }
}

/// The ten built-in accounts used when no user directory has been stored yet.
pub fn demo_users() -> UserDirectory {
    (1..=DEMO_USER_COUNT)
        .map(|i| {
            let email = format!("demo{}@strms.com", i);
            let user = NewUser::new(format!("Demo{}", i), "User", email.clone(), DEMO_PASSWORD)
                .into_user(i);
            (email, user)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_directory_has_ten_accounts() {
        let users = demo_users();
        assert_eq!(users.len(), 10);
        let demo3 = &users["demo3@strms.com"];
        assert_eq!(demo3.id, 3);
        assert_eq!(demo3.first_name, "Demo3");
        assert_eq!(demo3.password, DEMO_PASSWORD);
    }

    #[test]
    fn serializes_with_browser_field_names() {
        let user = NewUser::new("Alice", "Smith", "alice@example.com", "pw1").into_user(42);
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["firstName"], "Alice");
        assert_eq!(json["lastName"], "Smith");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn rejects_malformed_email() {
        assert!(NewUser::new("A", "B", "not-an-email", "pw").validate().is_err());
        assert!(NewUser::new("A", "B", "a@b.co", "").validate().is_err());
        assert!(NewUser::new("A", "B", "a@b.co", "pw").validate().is_ok());
    }
}
