//! Moderation error taxonomy.
//!
//! | Error | When | Retriable |
//! |---|---|---|
//! | `ContentNotFound` | target id does not resolve; nothing was changed | no |
//! | `StorageUnavailable` | warning store read/write failed | yes |
//! | `ConfigurationInvalid` | settings rejected while loading | no |
//! | `MissingTarget` | content command invoked without a target | no |
//! | `StepFailed` | a platform call failed mid-cycle; earlier steps stand | if the platform was unavailable |
//!
//! No retries happen inside a cycle. Callers decide with
//! [`ModerationError::is_retriable`].

use moderation::{ConfigError, StoreError};
use thiserror::Error;

use crate::commands::Command;
use crate::orchestrator::CycleStep;
use crate::platform::{ContentId, PlatformError};

/// Generic notice shown when the warning store cannot be reached.
pub const STORAGE_NOTICE: &str =
    "SubGuard could not reach its warning store. No warning was recorded.";

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("cannot find a post or comment with id {0}")]
    ContentNotFound(ContentId),

    #[error("warning store unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),

    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(#[from] ConfigError),

    #[error("{0} needs a target post or comment")]
    MissingTarget(Command),

    #[error("{step} failed after {} completed step(s): {source}", .completed.len())]
    StepFailed {
        step: CycleStep,
        completed: Vec<CycleStep>,
        #[source]
        source: PlatformError,
    },
}

impl ModerationError {
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::StorageUnavailable(_) => true,
            Self::StepFailed { source, .. } => source.is_transient(),
            Self::ContentNotFound(_) | Self::ConfigurationInvalid(_) | Self::MissingTarget(_) => {
                false
            }
        }
    }

    /// Whether the user's warning count may have changed before the failure.
    pub fn counter_touched(&self) -> bool {
        match self {
            Self::StepFailed { completed, .. } => completed.contains(&CycleStep::CounterUpdated),
            _ => false,
        }
    }

    /// Short status shown to whoever invoked the command.
    pub fn user_notice(&self) -> String {
        match self {
            Self::ContentNotFound(_) => "Cannot find a post or comment with that ID".to_string(),
            Self::StorageUnavailable(_) => STORAGE_NOTICE.to_string(),
            Self::ConfigurationInvalid(e) => format!("SubGuard settings are invalid: {e}"),
            Self::MissingTarget(command) => {
                format!("{} must be used on a post or comment", command.label())
            }
            Self::StepFailed { step, .. } => {
                format!("SubGuard stopped while trying to {}", step.describe())
            }
        }
    }
}
