//! Host platform boundary.
//!
//! Everything SubGuard does outside its own warning store goes through
//! [`Platform`]: resolving content, locking or removing it, replying,
//! audit notes, private messages, suspensions, and team notifications.
//! A binding for a concrete host implements this trait; tests inject fakes.

use async_trait::async_trait;
use moderation::UserIdentity;
use serde::{Deserialize, Serialize};

/// Opaque id of a post or comment on the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Where a piece of content lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Post,
    Comment,
}

impl ContentKind {
    /// Value substituted for `{{location}}`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved post or comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub id: ContentId,
    pub kind: ContentKind,
    pub author: UserIdentity,
    pub permalink: String,
}

/// The community SubGuard is installed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    pub id: String,
    pub name: String,
}

/// Label attached to every audit note SubGuard writes.
pub const AUDIT_LABEL: &str = "SPAM_WATCH";

/// Moderator-visible annotation on a user's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditNote {
    pub community: String,
    pub username: String,
    pub content: ContentId,
    pub label: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suspension {
    pub community: String,
    pub username: String,
    pub duration_days: u32,
    pub reason: String,
}

/// Notification to the community's moderator team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamNotification {
    pub community_id: String,
    pub subject: String,
    pub body_markdown: String,
}

/// Failure reported by the host platform.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("{operation} rejected: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },

    #[error("platform unavailable: {0}")]
    Unavailable(String),
}

impl PlatformError {
    /// Whether the failure is transient (a later attempt may succeed).
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Host platform operations used by SubGuard.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Platform: Send + Sync {
    /// Resolve a post or comment and its author.
    async fn fetch_content(&self, id: &ContentId) -> Result<Content, PlatformError>;

    async fn lock(&self, content: &Content) -> Result<(), PlatformError>;

    async fn remove(&self, content: &Content) -> Result<(), PlatformError>;

    /// Post `text` as a reply on the content.
    async fn reply(&self, id: &ContentId, text: &str) -> Result<(), PlatformError>;

    async fn add_audit_note(&self, note: AuditNote) -> Result<(), PlatformError>;

    async fn send_private_message(&self, message: PrivateMessage) -> Result<(), PlatformError>;

    async fn suspend(&self, suspension: Suspension) -> Result<(), PlatformError>;

    async fn notify_team(&self, notification: TeamNotification) -> Result<(), PlatformError>;

    /// The user invoking a self-service command, if logged in.
    async fn current_user(&self) -> Result<Option<UserIdentity>, PlatformError>;

    async fn community(&self) -> Result<Community, PlatformError>;
}

/// Content-moderation step applied at the start of an escalation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentAction {
    Lock,
    Remove,
}

impl ContentAction {
    pub async fn apply<P>(&self, platform: &P, content: &Content) -> Result<(), PlatformError>
    where
        P: Platform + ?Sized,
    {
        match self {
            Self::Lock => platform.lock(content).await,
            Self::Remove => platform.remove(content).await,
        }
    }

    /// Used in team notifications: "...that has been locked."
    pub fn past_tense(&self) -> &'static str {
        match self {
            Self::Lock => "locked",
            Self::Remove => "removed",
        }
    }
}

impl std::fmt::Display for ContentAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lock => write!(f, "lock"),
            Self::Remove => write!(f, "remove"),
        }
    }
}
