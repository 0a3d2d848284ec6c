//! Caller identity forwarded by the edge gateway.
//!
//! The gateway validates credentials and forwards the result as plain
//! headers. Nothing here verifies signatures; the values are trusted.

use serde::{Deserialize, Serialize};

/// Header carrying the authenticated user ID.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Header carrying the authenticated username.
pub const USERNAME_HEADER: &str = "X-Username";

/// Header carrying the caller role.
pub const USER_ROLE_HEADER: &str = "X-User-Role";

/// Role of the calling user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    #[default]
    User,
}

impl Role {
    /// Parses a role header value; unknown values fall back to `User`.
    pub fn from_header(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Role::Admin,
            "TEACHER" => Role::Teacher,
            "STUDENT" => Role::Student,
            _ => Role::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Teacher => "TEACHER",
            Role::Student => "STUDENT",
            Role::User => "USER",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pre-validated identity of the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CallerIdentity {
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub role: Role,
}

impl CallerIdentity {
    /// Builds an identity from raw header values.
    pub fn from_headers(user_id: Option<&str>, username: Option<&str>, role: Option<&str>) -> Self {
        Self {
            user_id: user_id.map(str::to_string),
            username: username.map(str::to_string),
            role: role.map(Role::from_header).unwrap_or_default(),
        }
    }
}
