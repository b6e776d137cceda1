//! Command catalogue and the non-escalating operations.
//!
//! | Command | Label | Audience | Locations |
//! |---|---|---|---|
//! | `CommentAndRemind` | Comment & Remind | moderator | post, comment |
//! | `LockAndWarn` | Lock & Warn | moderator | post, comment |
//! | `DeleteAndWarn` | Delete & Warn | moderator | post, comment |
//! | `ShowWarnings` | Show Warnings | moderator | post, comment |
//! | `RemoveWarning` | Remove Warning | moderator | post, comment |
//! | `CheckMyWarnings` | Check my Warnings (SubGuard) | member | community |

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use moderation::store::update_count;
use moderation::TemplateKind;

use crate::errors::ModerationError;
use crate::messages;
use crate::orchestrator::{CycleStep, SubGuard};
use crate::platform::{ContentAction, ContentId};

/// Who may run a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Moderator,
    Member,
}

/// Where a command is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandLocation {
    Post,
    Comment,
    Community,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    CommentAndRemind,
    LockAndWarn,
    DeleteAndWarn,
    ShowWarnings,
    RemoveWarning,
    CheckMyWarnings,
}

const ON_CONTENT: &[CommandLocation] = &[CommandLocation::Post, CommandLocation::Comment];

impl Command {
    pub const ALL: [Command; 6] = [
        Command::CommentAndRemind,
        Command::LockAndWarn,
        Command::DeleteAndWarn,
        Command::ShowWarnings,
        Command::RemoveWarning,
        Command::CheckMyWarnings,
    ];

    /// Menu label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CommentAndRemind => "Comment & Remind",
            Self::LockAndWarn => "Lock & Warn",
            Self::DeleteAndWarn => "Delete & Warn",
            Self::ShowWarnings => "Show Warnings",
            Self::RemoveWarning => "Remove Warning",
            Self::CheckMyWarnings => "Check my Warnings (SubGuard)",
        }
    }

    pub fn audience(&self) -> Audience {
        match self {
            Self::CheckMyWarnings => Audience::Member,
            _ => Audience::Moderator,
        }
    }

    pub fn locations(&self) -> &'static [CommandLocation] {
        match self {
            Self::CheckMyWarnings => &[CommandLocation::Community],
            _ => ON_CONTENT,
        }
    }

    /// Whether the command operates on a post or comment.
    pub fn needs_target(&self) -> bool {
        !matches!(self, Self::CheckMyWarnings)
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CommentAndRemind => write!(f, "comment_and_remind"),
            Self::LockAndWarn => write!(f, "lock_and_warn"),
            Self::DeleteAndWarn => write!(f, "delete_and_warn"),
            Self::ShowWarnings => write!(f, "show_warnings"),
            Self::RemoveWarning => write!(f, "remove_warning"),
            Self::CheckMyWarnings => write!(f, "check_my_warnings"),
        }
    }
}

/// What the invoker sees after a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandReport {
    pub text: String,
    /// Warning count the command read or left behind, when it has one.
    pub warnings: Option<u32>,
}

impl CommandReport {
    fn new(text: impl Into<String>, warnings: Option<u32>) -> Self {
        Self {
            text: text.into(),
            warnings,
        }
    }
}

impl SubGuard {
    /// Route a command to its operation.
    pub async fn dispatch(
        &self,
        command: Command,
        target: Option<&ContentId>,
    ) -> Result<CommandReport, ModerationError> {
        if command == Command::CheckMyWarnings {
            return self.check_my_warnings().await;
        }
        let id = target.ok_or(ModerationError::MissingTarget(command))?;
        debug!(command = %command, content = %id, "Dispatching command");

        match command {
            Command::LockAndWarn | Command::DeleteAndWarn => {
                let action = if command == Command::LockAndWarn {
                    ContentAction::Lock
                } else {
                    ContentAction::Remove
                };
                let report = self.run_escalation_cycle(id, action).await?;
                Ok(CommandReport::new(
                    report.status.clone(),
                    Some(report.final_count()),
                ))
            }
            Command::CommentAndRemind => self.comment_and_remind(id).await,
            Command::ShowWarnings => self.show_warnings(id).await,
            Command::RemoveWarning => self.remove_warning(id).await,
            Command::CheckMyWarnings => self.check_my_warnings().await,
        }
    }

    /// Report the author's current count. Read-only.
    pub async fn show_warnings(&self, id: &ContentId) -> Result<CommandReport, ModerationError> {
        let content = self.resolve_content(id).await?;
        let count = self.store.get(&content.author.id).await?;
        Ok(CommandReport::new(
            messages::show_status(&content.author.username, count),
            Some(count),
        ))
    }

    /// Take one warning off the author. A count of 0 is left alone.
    pub async fn remove_warning(&self, id: &ContentId) -> Result<CommandReport, ModerationError> {
        let content = self.resolve_content(id).await?;
        let username = &content.author.username;
        let update = update_count(self.store.as_ref(), &content.author.id, |count| {
            count.saturating_sub(1)
        })
        .await?;

        if !update.changed() {
            return Ok(CommandReport::new(messages::no_warnings_status(username), Some(0)));
        }
        info!(
            user = %content.author.id,
            prior = update.prior,
            new_count = update.current,
            "Warning removed"
        );
        Ok(CommandReport::new(
            messages::removed_status(username, update.current),
            Some(update.current),
        ))
    }

    /// Post the reminder template on the content. Touches nothing else.
    pub async fn comment_and_remind(
        &self,
        id: &ContentId,
    ) -> Result<CommandReport, ModerationError> {
        let content = self.resolve_content(id).await?;
        let count = self.store.get(&content.author.id).await?;
        let text = self
            .settings
            .templates
            .render(TemplateKind::Reminder, &self.template_context(&content, count));

        self.platform
            .reply(&content.id, &text)
            .await
            .map_err(|source| ModerationError::StepFailed {
                step: CycleStep::Replied,
                completed: vec![CycleStep::ContentResolved],
                source,
            })?;
        info!(user = %content.author.id, content = %content.id, "Reminder posted");
        Ok(CommandReport::new(messages::REMINDER_POSTED, Some(count)))
    }

    /// Self-service count for the invoking user.
    pub async fn check_my_warnings(&self) -> Result<CommandReport, ModerationError> {
        let user = self
            .platform
            .current_user()
            .await
            .map_err(|source| ModerationError::StepFailed {
                step: CycleStep::ContentResolved,
                completed: Vec::new(),
                source,
            })?;
        let Some(user) = user else {
            return Ok(CommandReport::new(messages::LOGIN_REQUIRED, None));
        };

        let count = self.store.get(&user.id).await?;
        let escalation = self.policy.config();
        Ok(CommandReport::new(
            messages::self_check_status(
                count,
                escalation.threshold(),
                escalation.ban_duration_days(),
            ),
            Some(count),
        ))
    }
}
