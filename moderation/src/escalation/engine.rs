//! Escalation Policy: deterministic warn/ban decision
//!
//! Given a user's prior warning count and the community's
//! [`EscalationConfig`], decide whether this infraction is a warning or a
//! ban and what count should be persisted. No I/O happens here.

use serde::{Deserialize, Serialize};

use crate::config::EscalationConfig;

/// What an escalation cycle does to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Count incremented, below threshold
    Warn,
    /// Threshold reached: suspend and reset the count
    Ban,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warn => write!(f, "warn"),
            Self::Ban => write!(f, "ban"),
        }
    }
}

/// Result of one decision. Transient; only `persisted_count` is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationOutcome {
    /// Count read before this infraction
    pub prior_count: u32,
    /// `prior_count + 1`; the value shown in notes and messages
    pub new_count: u32,
    /// Value written back to the store (0 after a ban)
    pub persisted_count: u32,
    /// Whether `new_count` reached the threshold
    pub threshold_crossed: bool,
    pub verdict: Verdict,
}

impl EscalationOutcome {
    pub fn is_ban(&self) -> bool {
        self.verdict == Verdict::Ban
    }
}

/// Decide the outcome of one infraction.
///
/// Uses `>=` rather than `==`, so lowering the threshold below a count a
/// user already holds still bans on their next infraction.
pub fn decide(prior_count: u32, config: &EscalationConfig) -> EscalationOutcome {
    let new_count = prior_count.saturating_add(1);
    let threshold_crossed = new_count >= config.threshold();

    if threshold_crossed {
        EscalationOutcome {
            prior_count,
            new_count,
            persisted_count: 0,
            threshold_crossed,
            verdict: Verdict::Ban,
        }
    } else {
        EscalationOutcome {
            prior_count,
            new_count,
            persisted_count: new_count,
            threshold_crossed,
            verdict: Verdict::Warn,
        }
    }
}

/// Stateless wrapper that owns a config, for callers that decide repeatedly.
#[derive(Debug, Clone, Default)]
pub struct EscalationPolicy {
    config: EscalationConfig,
}

impl EscalationPolicy {
    pub fn new(config: EscalationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EscalationConfig {
        &self.config
    }

    pub fn decide(&self, prior_count: u32) -> EscalationOutcome {
        decide(prior_count, &self.config)
    }

    /// Infractions left before the next one bans. Zero means the next one bans.
    pub fn remaining_before_ban(&self, current_count: u32) -> u32 {
        self.config
            .threshold()
            .saturating_sub(current_count)
            .saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(threshold: u32) -> EscalationConfig {
        EscalationConfig::new(threshold, 30).unwrap()
    }

    #[test]
    fn test_first_warning() {
        let outcome = decide(0, &config(3));
        assert_eq!(outcome.verdict, Verdict::Warn);
        assert_eq!(outcome.new_count, 1);
        assert_eq!(outcome.persisted_count, 1);
        assert!(!outcome.threshold_crossed);
    }

    #[test]
    fn test_reaching_threshold_bans_and_resets() {
        let outcome = decide(2, &config(3));
        assert_eq!(outcome.verdict, Verdict::Ban);
        assert_eq!(outcome.prior_count, 2);
        assert_eq!(outcome.new_count, 3);
        assert_eq!(outcome.persisted_count, 0);
        assert!(outcome.threshold_crossed);
    }

    #[test]
    fn test_threshold_one_bans_immediately() {
        let outcome = decide(0, &config(1));
        assert!(outcome.is_ban());
        assert_eq!(outcome.persisted_count, 0);
    }

    #[test]
    fn test_lowered_threshold_still_triggers() {
        // User accrued 5 under an old threshold; the new threshold is 3.
        let outcome = decide(5, &config(3));
        assert!(outcome.is_ban());
        assert_eq!(outcome.new_count, 6);
    }

    #[test]
    fn test_decide_property_over_range() {
        for threshold in 1..=11 {
            let cfg = config(threshold);
            for prior in 0..20u32 {
                let outcome = decide(prior, &cfg);
                if prior + 1 >= threshold {
                    assert_eq!(outcome.persisted_count, 0, "prior={prior} t={threshold}");
                    assert!(outcome.is_ban());
                } else {
                    assert_eq!(outcome.persisted_count, prior + 1);
                    assert!(outcome.persisted_count < threshold);
                }
            }
        }
    }

    #[test]
    fn test_saturating_prior() {
        let outcome = decide(u32::MAX, &config(3));
        assert_eq!(outcome.new_count, u32::MAX);
        assert!(outcome.is_ban());
    }

    #[test]
    fn test_remaining_before_ban() {
        let policy = EscalationPolicy::new(config(3));
        assert_eq!(policy.remaining_before_ban(0), 2);
        assert_eq!(policy.remaining_before_ban(1), 1);
        assert_eq!(policy.remaining_before_ban(2), 0);
        assert_eq!(policy.remaining_before_ban(7), 0);
    }

    #[test]
    fn test_verdict_serde() {
        let json = serde_json::to_string(&Verdict::Ban).unwrap();
        assert_eq!(json, "\"ban\"");
    }
}
