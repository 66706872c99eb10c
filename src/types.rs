/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type TeamId = i64;

/// Global role of a user. Team-level roles live in the team directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Viewer,
    Editor,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Global admins bypass team-level permission checks
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

/// The authenticated caller of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}
