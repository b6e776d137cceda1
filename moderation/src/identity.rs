//! User identity and the per-user warning record.

use serde::{Deserialize, Serialize};

/// Opaque, stable user identifier assigned by the host platform.
///
/// Usernames can change; warnings are always keyed by this id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A platform user: stable id plus current display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Stable id used as the storage key
    pub id: UserId,
    /// Display name used in rendered text
    pub username: String,
}

impl UserIdentity {
    pub fn new(id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }
}

impl std::fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "u/{}", self.username)
    }
}

/// Snapshot of one user's persisted warning count.
///
/// A user with no stored record is reported with `count == 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningRecord {
    pub user: UserId,
    pub count: u32,
}

impl WarningRecord {
    /// Whether the record is in the logical "no warnings" state.
    pub fn is_clear(&self) -> bool {
        self.count == 0
    }
}
