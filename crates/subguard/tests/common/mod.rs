//! Shared fixtures: a recording fake platform and builders.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use moderation::store::update_count;
use moderation::{
    CommunitySettings, EscalationConfig, InMemoryWarningStore, MessageTemplateSet, UserId,
    UserIdentity,
};
use subguard::{
    AuditNote, Community, Content, ContentId, ContentKind, Platform, PlatformError,
    PrivateMessage, SubGuard, Suspension, TeamNotification,
};

/// One recorded side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Lock(ContentId),
    Remove(ContentId),
    Reply { content: ContentId, text: String },
    AuditNote(AuditNote),
    Message(PrivateMessage),
    Suspend(Suspension),
    NotifyTeam(TeamNotification),
}

/// Fake platform that records every mutating call in order.
pub struct RecordingPlatform {
    contents: HashMap<ContentId, Content>,
    current_user: Option<UserIdentity>,
    /// Operation name ("lock", "reply", ...) that fails with `Rejected`.
    fail_on: Option<&'static str>,
    /// Store and user that receive one extra warning while `suspend` runs.
    warn_during_suspend: Option<(Arc<InMemoryWarningStore>, UserId)>,
    calls: Mutex<Vec<Call>>,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self {
            contents: HashMap::new(),
            current_user: None,
            fail_on: None,
            warn_during_suspend: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_content(mut self, content: Content) -> Self {
        self.contents.insert(content.id.clone(), content);
        self
    }

    pub fn logged_in_as(mut self, user: UserIdentity) -> Self {
        self.current_user = Some(user);
        self
    }

    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.fail_on = Some(operation);
        self
    }

    /// Simulate another moderator's warning landing mid-ban.
    pub fn warning_during_suspend(
        mut self,
        store: Arc<InMemoryWarningStore>,
        user: UserId,
    ) -> Self {
        self.warn_during_suspend = Some((store, user));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn replies(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Reply { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn audit_notes(&self) -> Vec<AuditNote> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::AuditNote(note) => Some(note),
                _ => None,
            })
            .collect()
    }

    pub fn messages(&self) -> Vec<PrivateMessage> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Message(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn suspensions(&self) -> Vec<Suspension> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Suspend(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn team_notifications(&self) -> Vec<TeamNotification> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::NotifyTeam(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<(), PlatformError> {
        if self.fail_on == Some(operation) {
            return Err(PlatformError::Rejected {
                operation,
                reason: "injected failure".into(),
            });
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl Platform for RecordingPlatform {
    async fn fetch_content(&self, id: &ContentId) -> Result<Content, PlatformError> {
        self.contents
            .get(id)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(id.to_string()))
    }

    async fn lock(&self, content: &Content) -> Result<(), PlatformError> {
        self.record("lock", Call::Lock(content.id.clone()))
    }

    async fn remove(&self, content: &Content) -> Result<(), PlatformError> {
        self.record("remove", Call::Remove(content.id.clone()))
    }

    async fn reply(&self, id: &ContentId, text: &str) -> Result<(), PlatformError> {
        self.record(
            "reply",
            Call::Reply {
                content: id.clone(),
                text: text.to_string(),
            },
        )
    }

    async fn add_audit_note(&self, note: AuditNote) -> Result<(), PlatformError> {
        self.record("add_audit_note", Call::AuditNote(note))
    }

    async fn send_private_message(&self, message: PrivateMessage) -> Result<(), PlatformError> {
        self.record("send_private_message", Call::Message(message))
    }

    async fn suspend(&self, suspension: Suspension) -> Result<(), PlatformError> {
        self.record("suspend", Call::Suspend(suspension))?;
        if let Some((store, user)) = &self.warn_during_suspend {
            update_count(store.as_ref(), user, |c| c + 1)
                .await
                .map_err(|e| PlatformError::Unavailable(e.to_string()))?;
        }
        Ok(())
    }

    async fn notify_team(&self, notification: TeamNotification) -> Result<(), PlatformError> {
        self.record("notify_team", Call::NotifyTeam(notification))
    }

    async fn current_user(&self) -> Result<Option<UserIdentity>, PlatformError> {
        Ok(self.current_user.clone())
    }

    async fn community(&self) -> Result<Community, PlatformError> {
        Ok(Community {
            id: "t5_rust".into(),
            name: "rustaceans".into(),
        })
    }
}

pub fn alice() -> UserIdentity {
    UserIdentity::new("t2_alice", "alice")
}

pub fn comment_by(author: UserIdentity) -> Content {
    Content {
        id: ContentId::new("t1_comment"),
        kind: ContentKind::Comment,
        author,
        permalink: "https://example.com/r/rustaceans/comments/abc/_/t1_comment".into(),
    }
}

pub fn post_by(author: UserIdentity) -> Content {
    Content {
        id: ContentId::new("t3_post"),
        kind: ContentKind::Post,
        author,
        permalink: "https://example.com/r/rustaceans/comments/t3_post".into(),
    }
}

pub fn settings(threshold: u32, ban_days: u32, team_notifications: bool) -> CommunitySettings {
    CommunitySettings {
        escalation: EscalationConfig::new(threshold, ban_days).unwrap(),
        team_notifications,
        templates: MessageTemplateSet::default(),
    }
}

/// A guard plus handles on its platform and store.
pub struct Harness {
    pub guard: Arc<SubGuard>,
    pub platform: Arc<RecordingPlatform>,
    pub store: Arc<InMemoryWarningStore>,
}

pub fn harness(platform: RecordingPlatform, settings: CommunitySettings) -> Harness {
    harness_with_store(platform, Arc::new(InMemoryWarningStore::new()), settings)
}

pub fn harness_with_store(
    platform: RecordingPlatform,
    store: Arc<InMemoryWarningStore>,
    settings: CommunitySettings,
) -> Harness {
    let platform = Arc::new(platform);
    let guard = Arc::new(SubGuard::new(
        platform.clone(),
        store.clone(),
        settings,
    ));
    Harness {
        guard,
        platform,
        store,
    }
}
