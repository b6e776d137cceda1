//! SubGuard moderation core
//!
//! Deterministic building blocks for the escalating warning workflow:
//!
//! - [`store`]: per-user warning counts behind a key-value boundary
//! - [`template`]: placeholder rendering for reply templates
//! - [`escalation`]: the warn/ban decision
//! - [`config`]: typed, validated community settings
//!
//! Nothing here talks to the host platform. Orchestration of the side
//! effects lives in the `subguard` crate.

#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod escalation;
pub mod identity;
pub mod store;
pub mod template;

pub use config::{CommunitySettings, ConfigError, EscalationConfig};
pub use escalation::{decide, EscalationOutcome, EscalationPolicy, Verdict};
pub use identity::{UserId, UserIdentity, WarningRecord};
pub use store::{
    update_count, CountUpdate, FileWarningStore, InMemoryWarningStore, SharedWarningStore,
    StoreError, StoreResult, WarningStore,
};
pub use template::{
    render, MessageTemplateSet, Placeholder, TemplateContext, TemplateKind,
};
