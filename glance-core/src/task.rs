//! Project and task entities for the Glance engine.
//!
//! The engine treats these as read-only value snapshots; all mutation happens
//! in use cases that return fresh copies for the caller to persist.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::recurrence::RecurrenceRule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Archived,
    Completed,
}

/// A project. Only `active` projects contribute tasks to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub starts_on: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_on: Option<NaiveDate>,
    pub status: ProjectStatus,
}

impl Project {
    pub fn new(id: impl Into<String>, title: impl Into<String>, starts_on: NaiveDate) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            starts_on,
            due_on: None,
            status: ProjectStatus::Active,
        }
    }

    pub fn with_due_on(mut self, due_on: NaiveDate) -> Self {
        self.due_on = Some(due_on);
        self
    }

    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == ProjectStatus::Active
    }

    /// Upstream invariant check; the engine never rejects inputs on it.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(due) = self.due_on {
            if due < self.starts_on {
                return Err(format!(
                    "project {}: due date {due} is before start date {}",
                    self.id, self.starts_on
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    P1,
    P2,
    P3,
    #[default]
    P4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowState {
    #[default]
    Todo,
    Doing,
    Done,
}

/// Explicit recurrence behavior override stored on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceBehavior {
    HabitReset,
    Rollover,
}

/// Resolved behavior every other component consults. Closed set: the
/// resolution below is the only place the legacy flag and rule presence are
/// interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveBehavior {
    OneOff,
    HabitReset,
    Rollover,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub state: WorkflowState,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<RecurrenceRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<RecurrenceBehavior>,
    /// Rollover only: the occurrence currently being worked toward.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_due_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_by: Vec<String>,

    /// Legacy recurring flag kept so old snapshots keep their daily habits.
    #[serde(default)]
    pub recurring: bool,

    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        project_id: impl Into<String>,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            title: title.into(),
            due_at: None,
            priority: Priority::default(),
            state: WorkflowState::default(),
            rule: None,
            behavior: None,
            next_due_at: None,
            blocked_by: Vec::new(),
            recurring: false,
            created_at,
        }
    }

    pub fn with_due_at(mut self, due_at: DateTime<Utc>) -> Self {
        self.due_at = Some(due_at);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_state(mut self, state: WorkflowState) -> Self {
        self.state = state;
        self
    }

    pub fn with_rule(mut self, rule: RecurrenceRule) -> Self {
        self.rule = Some(rule);
        self
    }

    pub fn with_behavior(mut self, behavior: RecurrenceBehavior) -> Self {
        self.behavior = Some(behavior);
        self
    }

    pub fn with_next_due_at(mut self, next_due_at: DateTime<Utc>) -> Self {
        self.next_due_at = Some(next_due_at);
        self
    }

    pub fn with_blocked_by(mut self, blocked_by: Vec<String>) -> Self {
        self.blocked_by = blocked_by;
        self
    }

    pub fn with_legacy_recurring(mut self) -> Self {
        self.recurring = true;
        self
    }

    /// Resolve the recurrence behavior this task actually follows.
    ///
    /// Explicit override wins; legacy-recurring tasks default to habit-reset;
    /// rule-bearing tasks default to rollover; everything else is one-off.
    pub fn effective_behavior(&self) -> EffectiveBehavior {
        match self.behavior {
            Some(RecurrenceBehavior::HabitReset) => EffectiveBehavior::HabitReset,
            Some(RecurrenceBehavior::Rollover) => EffectiveBehavior::Rollover,
            None if self.recurring => EffectiveBehavior::HabitReset,
            None if self.rule.is_some() => EffectiveBehavior::Rollover,
            None => EffectiveBehavior::OneOff,
        }
    }
}
