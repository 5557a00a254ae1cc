use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::id::RecordId;
use crate::core::user::User;

/// The signed-in user, as seen by the API.
///
/// Holds only the user's identity; profile fields are always looked up in
/// the user directory so they never go stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: Uuid,
    pub user_id: RecordId,
    pub email: String,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn start(user: &User) -> Self {
        Self {
            token: Uuid::new_v4(),
            user_id: user.id,
            email: user.email.clone(),
            started_at: Utc::now(),
        }
    }

    pub fn belongs_to(&self, user: &User) -> bool {
        self.user_id == user.id && self.email == user.email
    }
}
