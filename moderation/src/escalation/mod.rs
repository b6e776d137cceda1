//! Escalation: Warning Ladder for Rule Violations
//!
//! Every moderated infraction moves a user one step up the ladder. The
//! ladder is a single integer per user; there is no other state.
//!
//! # Escalation Ladder
//!
//! ```text
//! count 0 ──warn──▶ 1 ──warn──▶ ... ──warn──▶ threshold - 1
//!                                                 │
//!                                                 ├─ next infraction reaches threshold
//!                                                 ▼
//!                                   ban for N days, count reset to 0
//! ```

pub mod engine;

pub use engine::{decide, EscalationOutcome, EscalationPolicy, Verdict};
