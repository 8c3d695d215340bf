//! User model and request/response payloads

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User entity, shaped exactly like the `users` table
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub login_id: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub login_id: String,
    pub password: String,
}

/// User update payload; unset fields are left unchanged
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub login_id: Option<String>,
    pub password: Option<String>,
}

/// Response body for user operations. Never carries the password column.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub login_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl UserResponse {
    /// Render a user with timestamps in the configured display timezone
    pub fn from_user(user: &User, timezone: Tz) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            login_id: user.login_id.clone(),
            created_at: user.created_at.with_timezone(&timezone).to_rfc3339(),
            updated_at: user.updated_at.with_timezone(&timezone).to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn response_never_carries_the_password() {
        let user = User {
            id: 1,
            name: "Alice".to_string(),
            login_id: "alice".to_string(),
            password: "hunter2".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 7, 31, 14, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 7, 31, 14, 0, 0).unwrap(),
        };

        let response = UserResponse::from_user(&user, chrono_tz::Asia::Tokyo);
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["login_id"], "alice");
    }

    #[test]
    fn response_timestamps_are_rendered_in_the_display_timezone() {
        let user = User {
            id: 1,
            name: "Alice".to_string(),
            login_id: "alice".to_string(),
            password: "hunter2".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 7, 31, 14, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 7, 31, 14, 0, 0).unwrap(),
        };

        let response = UserResponse::from_user(&user, chrono_tz::Asia::Tokyo);
        // 14:00 UTC is 23:00 in Tokyo (+09:00).
        assert_eq!(response.created_at, "2025-07-31T23:00:00+09:00");
    }
}
