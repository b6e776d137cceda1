//! Escalation cycle: the shared Lock & Warn / Delete & Warn workflow.
//!
//! ```text
//! ContentResolved ─► ContentModerated ─► CounterUpdated ─► AuditNoted ─► Replied ─► Messaged
//!                                                                                      │
//!                        ┌─────────────────── verdict == Ban ─────────────────────────┤
//!                        ▼                                                             │
//!                    Suspended ─► CounterReset ─► ResetNoted ─┐                        │
//!                                                             ▼                        ▼
//!                                                    TeamNotified (if enabled) ─► report
//! ```
//!
//! Steps run strictly in order. A failed step aborts the remaining ones and
//! nothing already done is undone; the error carries the failed step and the
//! steps that completed. The count is updated with compare-and-swap, so two
//! cycles against the same user never lose an increment.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use moderation::store::update_count;
use moderation::{
    CommunitySettings, EscalationOutcome, EscalationPolicy, SharedWarningStore, TemplateContext,
    TemplateKind, UserIdentity,
};

use crate::errors::ModerationError;
use crate::messages;
use crate::platform::{
    AuditNote, Community, Content, ContentAction, ContentId, Platform, PlatformError, Suspension,
    AUDIT_LABEL,
};
use crate::telemetry::{append_cycle_record, log_cycle_record, CycleOutcome, CycleTimer};

/// One state of the escalation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStep {
    ContentResolved,
    ContentModerated,
    CounterUpdated,
    AuditNoted,
    Replied,
    Messaged,
    Suspended,
    CounterReset,
    ResetNoted,
    TeamNotified,
}

impl CycleStep {
    /// Verb phrase for user-facing failure notices.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::ContentResolved => "resolve the content and its author",
            Self::ContentModerated => "lock or remove the content",
            Self::CounterUpdated => "update the warning count",
            Self::AuditNoted => "add the audit note",
            Self::Replied => "reply on the content",
            Self::Messaged => "message the author",
            Self::Suspended => "suspend the author",
            Self::CounterReset => "reset the warning count",
            Self::ResetNoted => "note the warning reset",
            Self::TeamNotified => "notify the moderator team",
        }
    }
}

impl std::fmt::Display for CycleStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContentResolved => write!(f, "content_resolved"),
            Self::ContentModerated => write!(f, "content_moderated"),
            Self::CounterUpdated => write!(f, "counter_updated"),
            Self::AuditNoted => write!(f, "audit_noted"),
            Self::Replied => write!(f, "replied"),
            Self::Messaged => write!(f, "messaged"),
            Self::Suspended => write!(f, "suspended"),
            Self::CounterReset => write!(f, "counter_reset"),
            Self::ResetNoted => write!(f, "reset_noted"),
            Self::TeamNotified => write!(f, "team_notified"),
        }
    }
}

/// Result of a completed escalation cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub content: ContentId,
    pub author: UserIdentity,
    pub action: ContentAction,
    pub outcome: EscalationOutcome,
    pub completed: Vec<CycleStep>,
    /// Status shown to the moderator: "u/{user} warnings: {final}"
    pub status: String,
}

impl CycleReport {
    /// Count left in the store by this cycle (0 after a ban).
    pub fn final_count(&self) -> u32 {
        self.outcome.persisted_count
    }
}

/// Bookkeeping for one cycle: what finished, what is in flight.
#[derive(Debug, Default)]
struct CycleProgress {
    completed: Vec<CycleStep>,
    in_flight: Option<CycleStep>,
    user: Option<String>,
}

impl CycleProgress {
    fn begin(&mut self, step: CycleStep) {
        self.in_flight = Some(step);
    }

    fn complete(&mut self, step: CycleStep) {
        self.in_flight = None;
        self.completed.push(step);
    }

    fn fail(&self, step: CycleStep, source: PlatformError) -> ModerationError {
        warn!(step = %step, completed = self.completed.len(), error = %source, "Cycle step failed");
        ModerationError::StepFailed {
            step,
            completed: self.completed.clone(),
            source,
        }
    }

    async fn platform_step<T, Fut>(
        &mut self,
        step: CycleStep,
        call: Fut,
    ) -> Result<T, ModerationError>
    where
        Fut: std::future::Future<Output = Result<T, PlatformError>>,
    {
        self.begin(step);
        match call.await {
            Ok(value) => {
                self.complete(step);
                Ok(value)
            }
            Err(source) => Err(self.fail(step, source)),
        }
    }
}

/// The SubGuard application: a platform binding, a warning store, and
/// immutable community settings.
pub struct SubGuard {
    pub(crate) platform: Arc<dyn Platform>,
    pub(crate) store: SharedWarningStore,
    pub(crate) settings: CommunitySettings,
    pub(crate) policy: EscalationPolicy,
    telemetry_path: Option<PathBuf>,
}

impl SubGuard {
    pub fn new(
        platform: Arc<dyn Platform>,
        store: SharedWarningStore,
        settings: CommunitySettings,
    ) -> Self {
        let policy = EscalationPolicy::new(settings.escalation);
        Self {
            platform,
            store,
            settings,
            policy,
            telemetry_path: None,
        }
    }

    /// Append a [`crate::telemetry::CycleRecord`] per cycle to this JSONL file.
    pub fn with_telemetry_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.telemetry_path = Some(path.into());
        self
    }

    pub fn settings(&self) -> &CommunitySettings {
        &self.settings
    }

    pub fn store(&self) -> &SharedWarningStore {
        &self.store
    }

    /// Lock the content, then warn (or ban) its author.
    pub async fn lock_and_warn(&self, id: &ContentId) -> Result<CycleReport, ModerationError> {
        self.run_escalation_cycle(id, ContentAction::Lock).await
    }

    /// Remove the content, then warn (or ban) its author.
    pub async fn delete_and_warn(&self, id: &ContentId) -> Result<CycleReport, ModerationError> {
        self.run_escalation_cycle(id, ContentAction::Remove).await
    }

    /// Run one escalation cycle and emit its telemetry record.
    pub async fn run_escalation_cycle(
        &self,
        id: &ContentId,
        action: ContentAction,
    ) -> Result<CycleReport, ModerationError> {
        let timer = CycleTimer::start();
        info!(cycle_id = %timer.cycle_id(), content = %id, action = %action, "Escalation cycle started");

        let mut progress = CycleProgress::default();
        let result = self.escalate(id, action, &mut progress).await;

        let outcome = match &result {
            Ok(report) => CycleOutcome::from(&report.outcome),
            Err(e) => CycleOutcome::Failed {
                step: progress.in_flight,
                error: e.to_string(),
            },
        };
        let record = timer.finish(
            id.clone(),
            progress.user.clone(),
            action,
            progress.completed.clone(),
            outcome,
        );
        log_cycle_record(&record);
        if let Some(path) = &self.telemetry_path {
            append_cycle_record(&record, path);
        }

        match &result {
            Ok(report) => info!(
                content = %id,
                action = %action,
                user = %report.author.id,
                verdict = %report.outcome.verdict,
                final_count = report.final_count(),
                "Escalation cycle finished"
            ),
            Err(e) => warn!(content = %id, action = %action, error = %e, "Escalation cycle aborted"),
        }
        result
    }

    async fn escalate(
        &self,
        id: &ContentId,
        action: ContentAction,
        progress: &mut CycleProgress,
    ) -> Result<CycleReport, ModerationError> {
        // 1. Resolve content, author, and community
        progress.begin(CycleStep::ContentResolved);
        let content = self.resolve_content(id).await?;
        let community = self
            .platform
            .community()
            .await
            .map_err(|source| progress.fail(CycleStep::ContentResolved, source))?;
        progress.user = Some(content.author.id.to_string());
        progress.complete(CycleStep::ContentResolved);

        // 2. Lock or remove
        progress
            .platform_step(
                CycleStep::ContentModerated,
                action.apply(self.platform.as_ref(), &content),
            )
            .await?;

        // 3. Count the infraction
        progress.begin(CycleStep::CounterUpdated);
        let policy = &self.policy;
        let update = update_count(self.store.as_ref(), &content.author.id, |prior| {
            policy.decide(prior).persisted_count
        })
        .await?;
        let outcome = policy.decide(update.prior);
        progress.complete(CycleStep::CounterUpdated);
        info!(
            user = %content.author.id,
            content = %content.id,
            action = %action,
            prior = outcome.prior_count,
            new_count = outcome.new_count,
            crossed = outcome.threshold_crossed,
            "Warning counted"
        );

        let escalation = self.policy.config();
        let username = content.author.username.as_str();

        // 4. Audit note
        let note = messages::warning_note(
            content.kind,
            username,
            outcome.new_count,
            escalation.threshold(),
        );
        progress
            .platform_step(
                CycleStep::AuditNoted,
                self.platform
                    .add_audit_note(audit_note(&community, &content, note)),
            )
            .await?;

        // 5. Public reply
        let kind = if outcome.is_ban() {
            TemplateKind::Ban
        } else {
            TemplateKind::Warn
        };
        let reply = self
            .settings
            .templates
            .render(kind, &self.template_context(&content, outcome.new_count));
        progress
            .platform_step(CycleStep::Replied, self.platform.reply(&content.id, &reply))
            .await?;

        // 6. Private message to the author
        let message = if outcome.is_ban() {
            messages::banned_message(
                username,
                &community.name,
                content.kind,
                escalation.ban_duration_days(),
                &content.permalink,
            )
        } else {
            messages::warned_message(
                username,
                &community.name,
                content.kind,
                outcome.new_count,
                escalation.threshold(),
                escalation.ban_duration_days(),
                &content.permalink,
            )
        };
        progress
            .platform_step(
                CycleStep::Messaged,
                self.platform.send_private_message(message),
            )
            .await?;

        // 7. Ban branch
        if outcome.is_ban() {
            warn!(
                user = %content.author.id,
                new_count = outcome.new_count,
                days = escalation.ban_duration_days(),
                "Threshold reached; suspending user"
            );
            let suspension = Suspension {
                community: community.name.clone(),
                username: username.to_string(),
                duration_days: escalation.ban_duration_days(),
                reason: messages::SUSPENSION_REASON.to_string(),
            };
            progress
                .platform_step(CycleStep::Suspended, self.platform.suspend(suspension))
                .await?;

            progress.begin(CycleStep::CounterReset);
            // Conditional so a warning that landed after step 3 survives
            let reset = self
                .store
                .compare_and_swap(&content.author.id, outcome.persisted_count, 0)
                .await?;
            if !reset {
                info!(
                    user = %content.author.id,
                    "Later warning already recorded; leaving count in place"
                );
            }
            progress.complete(CycleStep::CounterReset);

            let note = messages::reset_note(
                username,
                escalation.ban_duration_days(),
                outcome.new_count,
            );
            progress
                .platform_step(
                    CycleStep::ResetNoted,
                    self.platform
                        .add_audit_note(audit_note(&community, &content, note)),
                )
                .await?;
        }

        // 8. Moderator team
        if self.settings.team_notifications {
            let notification = if outcome.is_ban() {
                messages::team_ban(
                    &community.id,
                    username,
                    content.kind,
                    action,
                    escalation.ban_duration_days(),
                    outcome.new_count,
                    &content.permalink,
                )
            } else {
                messages::team_warning(
                    &community.id,
                    username,
                    content.kind,
                    action,
                    outcome.new_count,
                    escalation.threshold(),
                    escalation.ban_duration_days(),
                    &content.permalink,
                )
            };
            progress
                .platform_step(
                    CycleStep::TeamNotified,
                    self.platform.notify_team(notification),
                )
                .await?;
        } else {
            debug!(user = %content.author.id, "Team notifications disabled; skipping");
        }

        // 9. Report
        let status = messages::cycle_status(username, outcome.persisted_count);
        Ok(CycleReport {
            content: content.id.clone(),
            author: content.author.clone(),
            action,
            outcome,
            completed: progress.completed.clone(),
            status,
        })
    }

    /// Resolve content, mapping a platform miss to `ContentNotFound`.
    pub(crate) async fn resolve_content(&self, id: &ContentId) -> Result<Content, ModerationError> {
        match self.platform.fetch_content(id).await {
            Ok(content) => Ok(content),
            Err(PlatformError::NotFound(_)) => {
                warn!(content = %id, "Content not found");
                Err(ModerationError::ContentNotFound(id.clone()))
            }
            Err(source) => Err(ModerationError::StepFailed {
                step: CycleStep::ContentResolved,
                completed: Vec::new(),
                source,
            }),
        }
    }

    pub(crate) fn template_context(&self, content: &Content, warnings: u32) -> TemplateContext {
        let escalation = self.policy.config();
        TemplateContext {
            location: content.kind.as_str().to_string(),
            author: content.author.username.clone(),
            warnings,
            threshold: escalation.threshold(),
            length_days: escalation.ban_duration_days(),
        }
    }
}

fn audit_note(community: &Community, content: &Content, note: String) -> AuditNote {
    AuditNote {
        community: community.name.clone(),
        username: content.author.username.clone(),
        content: content.id.clone(),
        label: AUDIT_LABEL.to_string(),
        note,
    }
}
