//! SubGuard: escalating moderation warnings
//!
//! Moderators lock or remove rule-breaking content; each action warns the
//! author, and reaching the community's threshold bans them and resets
//! their count.
//!
//! # Commands
//!
//! - `Lock & Warn` / `Delete & Warn`: the escalation cycle ([`orchestrator`])
//! - `Comment & Remind`: post the reminder template, nothing else
//! - `Show Warnings` / `Remove Warning`: read or decrement an author's count
//! - `Check my Warnings`: self-service count for community members
//!
//! All host interaction goes through [`platform::Platform`]; counts live in
//! a [`moderation::WarningStore`].
//!
//! # Usage
//!
//! ```bash
//! # Inspect and adjust counts in the file store
//! subguard show t2_alice
//! subguard remove t2_alice
//!
//! # Preview a template and check the effective settings
//! subguard render ban --author alice --location comment
//! subguard validate
//! ```

pub mod commands;
pub mod config;
pub mod errors;
pub mod messages;
pub mod orchestrator;
pub mod platform;
pub mod telemetry;

pub use commands::{Audience, Command, CommandLocation, CommandReport};
pub use config::SubGuardConfig;
pub use errors::ModerationError;
pub use orchestrator::{CycleReport, CycleStep, SubGuard};
pub use platform::{
    AuditNote, Community, Content, ContentAction, ContentId, ContentKind, Platform, PlatformError,
    PrivateMessage, Suspension, TeamNotification,
};
pub use telemetry::{CycleOutcome, CycleRecord};
