//! glance-core: outstanding-task selection and completion engine for the
//! Glance personal task manager.
//!
//! Everything here is a pure transform over an in-memory [`Snapshot`]: the
//! computer ranks outstanding tasks for a space-constrained surface, the
//! completion use case returns the records a persistence layer should write.
//! No I/O, no ambient clock, no shared mutable state.

pub mod completion;
pub mod date_key;
pub mod outstanding;
pub mod privacy;
pub mod recurrence;
pub mod snapshot;
pub mod task;

pub use completion::{
    complete_task, occurrence_key, CompletionError, CompletionLog, CompletionOutcome, ONCE_KEY,
};
pub use date_key::DateKey;
pub use outstanding::{
    compute_outstanding, DisplayTask, FallbackReason, OutstandingCounters, OutstandingSummary,
    SelectionPolicy,
};
pub use privacy::{
    mask_notice, mask_project_title, mask_title, PrivacyMode, VISIBLE_TITLE_MAX,
};
pub use recurrence::{RecurrenceKind, RecurrenceRule, TimeOfDay};
pub use snapshot::Snapshot;
pub use task::{
    EffectiveBehavior, Priority, Project, ProjectStatus, RecurrenceBehavior, Task, WorkflowState,
};
