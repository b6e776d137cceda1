//! Per-cycle telemetry.
//!
//! Every escalation cycle produces one [`CycleRecord`], successful or not.
//! Records are logged through `tracing` and, when a sink path is configured,
//! appended to a JSON-lines file.

use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use moderation::{EscalationOutcome, Verdict};

use crate::orchestrator::CycleStep;
use crate::platform::{ContentAction, ContentId};

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CycleOutcome {
    Completed {
        verdict: Verdict,
        prior_count: u32,
        new_count: u32,
        persisted_count: u32,
    },
    Failed {
        /// Step that failed, if the failure happened inside a step.
        step: Option<CycleStep>,
        error: String,
    },
}

impl From<&EscalationOutcome> for CycleOutcome {
    fn from(outcome: &EscalationOutcome) -> Self {
        Self::Completed {
            verdict: outcome.verdict,
            prior_count: outcome.prior_count,
            new_count: outcome.new_count,
            persisted_count: outcome.persisted_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleRecord {
    pub cycle_id: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub content: ContentId,
    /// Author id; absent when the content never resolved.
    pub user: Option<String>,
    pub action: ContentAction,
    pub completed_steps: Vec<CycleStep>,
    pub outcome: CycleOutcome,
}

/// Start/stop clock for one cycle.
pub struct CycleTimer {
    cycle_id: String,
    started_at: DateTime<Utc>,
    start: Instant,
}

impl CycleTimer {
    pub fn start() -> Self {
        Self {
            cycle_id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            start: Instant::now(),
        }
    }

    pub fn cycle_id(&self) -> &str {
        &self.cycle_id
    }

    pub fn finish(
        self,
        content: ContentId,
        user: Option<String>,
        action: ContentAction,
        completed_steps: Vec<CycleStep>,
        outcome: CycleOutcome,
    ) -> CycleRecord {
        CycleRecord {
            cycle_id: self.cycle_id,
            started_at: self.started_at,
            elapsed_ms: self.start.elapsed().as_millis() as u64,
            content,
            user,
            action,
            completed_steps,
            outcome,
        }
    }
}

impl CycleRecord {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, CycleOutcome::Completed { .. })
    }
}

/// Log a cycle record at info (success) or warn (failure).
pub fn log_cycle_record(record: &CycleRecord) {
    match &record.outcome {
        CycleOutcome::Completed {
            verdict,
            persisted_count,
            ..
        } => info!(
            cycle_id = %record.cycle_id,
            content = %record.content,
            action = %record.action,
            verdict = %verdict,
            persisted = persisted_count,
            elapsed_ms = record.elapsed_ms,
            "Cycle telemetry"
        ),
        CycleOutcome::Failed { step, error } => warn!(
            cycle_id = %record.cycle_id,
            content = %record.content,
            action = %record.action,
            step = ?step,
            completed = record.completed_steps.len(),
            error = %error,
            "Cycle telemetry (failed)"
        ),
    }
}

/// Append a cycle record to a JSONL file. Failures are logged, not returned.
pub fn append_cycle_record(record: &CycleRecord, path: &Path) {
    match serde_json::to_string(record) {
        Ok(json) => {
            use std::io::Write;
            match std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
            {
                Ok(mut file) => {
                    if let Err(e) = writeln!(file, "{json}") {
                        warn!("Failed to append cycle telemetry: {e}");
                    } else {
                        info!(path = %path.display(), "Appended cycle telemetry");
                    }
                }
                Err(e) => warn!("Failed to open telemetry file: {e}"),
            }
        }
        Err(e) => warn!("Failed to serialize cycle telemetry: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(outcome: CycleOutcome) -> CycleRecord {
        CycleTimer::start().finish(
            ContentId::new("t3_post"),
            Some("t2_alice".into()),
            ContentAction::Lock,
            vec![CycleStep::ContentResolved, CycleStep::ContentModerated],
            outcome,
        )
    }

    #[test]
    fn test_cycle_ids_are_unique() {
        let a = CycleTimer::start();
        let b = CycleTimer::start();
        assert_ne!(a.cycle_id(), b.cycle_id());
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let record = sample(CycleOutcome::Failed {
            step: Some(CycleStep::CounterUpdated),
            error: "store down".into(),
        });
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["outcome"]["result"], "failed");
        assert_eq!(json["outcome"]["step"], "counter_updated");
        assert_eq!(json["action"], "lock");
        assert_eq!(json["completed_steps"][1], "content_moderated");
        assert!(!record.succeeded());
    }

    #[test]
    fn test_append_cycle_record_writes_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cycles.jsonl");

        let completed = sample(CycleOutcome::Completed {
            verdict: Verdict::Warn,
            prior_count: 0,
            new_count: 1,
            persisted_count: 1,
        });
        assert!(completed.succeeded());
        append_cycle_record(&completed, &path);
        append_cycle_record(&completed, &path);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: CycleRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.cycle_id, completed.cycle_id);
        assert_eq!(parsed.outcome, completed.outcome);
    }
}
