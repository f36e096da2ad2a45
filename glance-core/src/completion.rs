//! Completion logs and the completion use case.
//!
//! A `CompletionLog` records that one occurrence of a task was closed.
//! Occurrence identity depends on the task's resolved recurrence behavior:
//! one-off tasks have a single `"once"` occurrence, habit-reset tasks one per
//! local calendar day, rollover tasks one per scheduled `next_due_at`.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::date_key::DateKey;
use crate::snapshot::Snapshot;
use crate::task::{EffectiveBehavior, Task};

/// Occurrence key shared by every non-recurring task.
pub const ONCE_KEY: &str = "once";

/// Immutable record of a completed occurrence. Unique per
/// (task_id, occurrence_key); created once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionLog {
    pub task_id: String,
    pub occurrence_key: String,
    pub completed_at: DateTime<Utc>,
}

impl CompletionLog {
    pub fn new(
        task_id: impl Into<String>,
        occurrence_key: impl Into<String>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            occurrence_key: occurrence_key.into(),
            completed_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("rollover task {0} has no recurrence rule")]
    RolloverMissingRule(String),
    #[error("rollover task {0} has no next occurrence due")]
    RolloverMissingNextOccurrence(String),
}

/// What the caller persists: the log, and for rollover tasks the advanced
/// copy of the task. `was_already_completed` marks the idempotent no-op path.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOutcome {
    pub log: CompletionLog,
    pub was_already_completed: bool,
    pub updated_task: Option<Task>,
}

/// Occurrence key a completion of `task` would close right now.
///
/// `day_key` identifies the habit day being closed; `tz` resolves a rollover
/// task's `next_due_at` to its calendar day. Fails on rollover tasks with
/// broken recurrence data so callers can tell "already done" from "broken".
pub fn occurrence_key(task: &Task, day_key: DateKey, tz: Tz) -> Result<String, CompletionError> {
    match task.effective_behavior() {
        EffectiveBehavior::OneOff => Ok(ONCE_KEY.to_string()),
        EffectiveBehavior::HabitReset => Ok(day_key.value()),
        EffectiveBehavior::Rollover => {
            if task.rule.is_none() {
                return Err(CompletionError::RolloverMissingRule(task.id.clone()));
            }
            let due = task
                .next_due_at
                .ok_or_else(|| CompletionError::RolloverMissingNextOccurrence(task.id.clone()))?;
            Ok(DateKey::from_instant(due, tz).value())
        }
    }
}

/// Record one completion against the supplied snapshot.
///
/// Pure: returns the records to persist instead of writing anything.
/// Re-completing an already-closed occurrence is success with
/// `was_already_completed = true` — never an error. Rollover tasks come back
/// with `next_due_at` advanced by their rule, anchored at the pre-advance due
/// instant.
pub fn complete_task(
    snapshot: &Snapshot,
    task_id: &str,
    day_key: DateKey,
    completed_at: DateTime<Utc>,
    tz: Tz,
) -> Result<CompletionOutcome, CompletionError> {
    let task = snapshot
        .task(task_id)
        .ok_or_else(|| CompletionError::TaskNotFound(task_id.to_string()))?;

    let key = occurrence_key(task, day_key, tz)?;

    if let Some(existing) = snapshot.completion(task_id, &key) {
        return Ok(CompletionOutcome {
            log: existing.clone(),
            was_already_completed: true,
            updated_task: None,
        });
    }

    let log = CompletionLog::new(task_id, key, completed_at);

    let updated_task = if task.effective_behavior() == EffectiveBehavior::Rollover {
        // occurrence_key already guaranteed rule and next_due_at are present.
        let rule = task.rule.as_ref().expect("rollover rule checked above");
        let due = task.next_due_at.expect("rollover next_due_at checked above");
        let mut advanced = task.clone();
        advanced.next_due_at = Some(rule.next_occurrence(due));
        Some(advanced)
    } else {
        None
    };

    Ok(CompletionOutcome {
        log,
        was_already_completed: false,
        updated_task,
    })
}
