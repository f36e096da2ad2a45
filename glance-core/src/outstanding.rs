//! Outstanding task selection for the glance surface.
//!
//! Pure, total and deterministic: a read-only pass over a snapshot that
//! filters out completed/blocked/inactive-project tasks, classifies the
//! survivors into six strictly-ordered priority groups, sorts them with a
//! five-key tie-break chain and truncates to a display cap. Counters are
//! computed over the full outstanding set, never the truncated slice.
//! Malformed input (unknown blocker ids, partial recurrence data) degrades
//! instead of erroring.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::completion::{occurrence_key, ONCE_KEY};
use crate::date_key::DateKey;
use crate::privacy::{mask_title, PrivacyMode};
use crate::snapshot::Snapshot;
use crate::task::{EffectiveBehavior, Priority, ProjectStatus, Task, WorkflowState};

/// Tasks due within this window after `now` rank as "due soon".
const DUE_SOON_WINDOW: Duration = Duration::hours(24);

/// How the glance surface scopes its task set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Restrict to one pinned project; falls back to the full scope when the
    /// pin is absent or the project is gone/archived/completed.
    PinnedFirst { project_id: Option<String> },
    /// Full scope across all active projects.
    TodayOverview,
}

/// Why the display list came back empty (or the pin was ignored).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    NoTasks,
    AllCompleted,
    NoPinnedProject,
    PinnedProjectArchived,
    PinnedProjectCompleted,
}

/// Aggregates over the full outstanding set. `recurring_total` /
/// `recurring_done` cover the scoped set before completion filtering, so a
/// finished habit still shows up in the "done today" tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutstandingCounters {
    pub outstanding_total: usize,
    pub overdue_count: usize,
    pub due_soon_count: usize,
    pub p1_count: usize,
    pub doing_count: usize,
    pub recurring_total: usize,
    pub recurring_done: usize,
    pub blocked_count: usize,
}

/// One display slot: masked title plus the ranking flags copied from the
/// source task at selection time. Masking never touches the flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayTask {
    pub task_id: String,
    pub display_title: String,
    pub is_doing: bool,
    pub is_overdue: bool,
    pub priority: Priority,
    pub is_p1: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutstandingSummary {
    pub display_list: Vec<DisplayTask>,
    pub counters: OutstandingCounters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
}

/// Compute the outstanding summary for one glance.
///
/// Algorithm (deterministic):
/// 1) drop tasks of non-active projects, completed occurrences, blocked tasks
/// 2) scope by policy, remembering any pin fallback
/// 3) classify into groups G1..G6 (first match wins)
/// 4) sort by (group, due, priority, created_at, id)
/// 5) truncate to `top_n`; counters stay full-set
/// 6) attach a fallback reason only when the display list is empty
pub fn compute_outstanding(
    snapshot: &Snapshot,
    policy: &SelectionPolicy,
    privacy: PrivacyMode,
    top_n: usize,
    now: DateTime<Utc>,
    day_key: DateKey,
    tz: Tz,
) -> OutstandingSummary {
    let active_projects: HashSet<&str> = snapshot
        .projects
        .iter()
        .filter(|p| p.is_active())
        .map(|p| p.id.as_str())
        .collect();

    // Step 2 first: the scope decides which tasks the counters cover.
    let (scope_project, policy_fallback) = resolve_scope(snapshot, policy);

    let scoped: Vec<&Task> = snapshot
        .tasks
        .iter()
        .filter(|t| active_projects.contains(t.project_id.as_str()))
        .filter(|t| scope_project.is_none_or(|pid| t.project_id == pid))
        .collect();

    // Step 1: completion and blocking filters.
    let is_completed =
        |task: &Task| -> bool { completed_for_current_occurrence(snapshot, task, day_key, tz) };

    let blocked: Vec<&Task> = scoped
        .iter()
        .copied()
        .filter(|t| !is_completed(t))
        .filter(|t| {
            t.blocked_by
                .iter()
                .any(|id| !blocker_resolved(snapshot, &active_projects, id, day_key, tz))
        })
        .collect();
    let blocked_ids: HashSet<&str> = blocked.iter().map(|t| t.id.as_str()).collect();

    let outstanding: Vec<&Task> = scoped
        .iter()
        .copied()
        .filter(|t| !is_completed(t))
        .filter(|t| !blocked_ids.contains(t.id.as_str()))
        .collect();

    // Steps 3-4: classify and order.
    let mut ranked: Vec<(&Task, u8)> = outstanding
        .iter()
        .map(|t| (*t, priority_group(t, now)))
        .collect();
    ranked.sort_by(|(a, ga), (b, gb)| {
        ga.cmp(gb)
            .then_with(|| cmp_due(effective_due(a), effective_due(b)))
            .then_with(|| a.priority.cmp(&b.priority))
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });

    // Step 5: truncated display list, full-set counters.
    let display_list: Vec<DisplayTask> = ranked
        .iter()
        .take(top_n)
        .enumerate()
        .map(|(i, (task, _))| DisplayTask {
            task_id: task.id.clone(),
            display_title: mask_title(&task.title, i + 1, privacy),
            is_doing: task.state == WorkflowState::Doing,
            is_overdue: is_overdue(task, now),
            priority: task.priority,
            is_p1: task.priority == Priority::P1,
        })
        .collect();

    let is_daily_recurring =
        |t: &Task| t.effective_behavior() == EffectiveBehavior::HabitReset || t.recurring;
    let counters = OutstandingCounters {
        outstanding_total: outstanding.len(),
        overdue_count: outstanding.iter().filter(|t| is_overdue(t, now)).count(),
        due_soon_count: outstanding.iter().filter(|t| is_due_soon(t, now)).count(),
        p1_count: outstanding
            .iter()
            .filter(|t| t.priority == Priority::P1)
            .count(),
        doing_count: outstanding
            .iter()
            .filter(|t| t.state == WorkflowState::Doing)
            .count(),
        recurring_total: scoped.iter().filter(|t| is_daily_recurring(t)).count(),
        recurring_done: scoped
            .iter()
            .filter(|t| is_daily_recurring(t))
            .filter(|t| snapshot.has_completion(&t.id, &day_key.value()))
            .count(),
        blocked_count: blocked.len(),
    };

    // Step 6: diagnose empty output. A policy fallback wins; otherwise
    // distinguish "nothing there" from "everything handled".
    let fallback_reason = if display_list.is_empty() {
        policy_fallback.or(if scoped.is_empty() {
            Some(FallbackReason::NoTasks)
        } else if outstanding.is_empty() {
            Some(FallbackReason::AllCompleted)
        } else {
            // Only reachable with top_n == 0 while work remains.
            None
        })
    } else {
        None
    };

    OutstandingSummary {
        display_list,
        counters,
        fallback_reason,
    }
}

fn resolve_scope<'a>(
    snapshot: &'a Snapshot,
    policy: &'a SelectionPolicy,
) -> (Option<&'a str>, Option<FallbackReason>) {
    match policy {
        SelectionPolicy::TodayOverview => (None, None),
        SelectionPolicy::PinnedFirst { project_id } => {
            let Some(pid) = project_id else {
                return (None, Some(FallbackReason::NoPinnedProject));
            };
            match snapshot.project(pid) {
                None => (None, Some(FallbackReason::NoPinnedProject)),
                Some(p) => match p.status {
                    ProjectStatus::Archived => (None, Some(FallbackReason::PinnedProjectArchived)),
                    ProjectStatus::Completed => {
                        (None, Some(FallbackReason::PinnedProjectCompleted))
                    }
                    ProjectStatus::Active => (Some(pid.as_str()), None),
                },
            }
        }
    }
}

/// Completion test for the task's current occurrence. Broken rollover data
/// degrades to the one-off key; a residual `done` state counts as completed
/// even without a log.
fn completed_for_current_occurrence(
    snapshot: &Snapshot,
    task: &Task,
    day_key: DateKey,
    tz: Tz,
) -> bool {
    if task.state == WorkflowState::Done {
        return true;
    }
    let key = occurrence_key(task, day_key, tz).unwrap_or_else(|_| ONCE_KEY.to_string());
    snapshot.has_completion(&task.id, &key)
}

/// A blocker holds its dependents only while it is itself outstanding:
/// unknown ids and tasks of non-active projects resolve immediately.
fn blocker_resolved(
    snapshot: &Snapshot,
    active_projects: &HashSet<&str>,
    blocker_id: &str,
    day_key: DateKey,
    tz: Tz,
) -> bool {
    match snapshot.task(blocker_id) {
        None => true,
        Some(blocker) => {
            !active_projects.contains(blocker.project_id.as_str())
                || completed_for_current_occurrence(snapshot, blocker, day_key, tz)
        }
    }
}

/// Due instant used for overdue/due-soon tests and the sort chain: a healthy
/// rollover task is due at its scheduled occurrence, everything else at its
/// own due field.
fn effective_due(task: &Task) -> Option<DateTime<Utc>> {
    if task.effective_behavior() == EffectiveBehavior::Rollover
        && task.rule.is_some()
        && task.next_due_at.is_some()
    {
        return task.next_due_at;
    }
    task.due_at
}

fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    effective_due(task).is_some_and(|due| due < now)
}

fn is_due_soon(task: &Task, now: DateTime<Utc>) -> bool {
    effective_due(task).is_some_and(|due| due > now && due <= now + DUE_SOON_WINDOW)
}

/// G1 doing, G2 overdue, G3 due soon, G4 P1, G5 habit, G6 rest.
/// A task lands in the first group it matches.
fn priority_group(task: &Task, now: DateTime<Utc>) -> u8 {
    if task.state == WorkflowState::Doing {
        return 1;
    }
    if is_overdue(task, now) {
        return 2;
    }
    if is_due_soon(task, now) {
        return 3;
    }
    if task.priority == Priority::P1 {
        return 4;
    }
    if task.effective_behavior() == EffectiveBehavior::HabitReset {
        return 5;
    }
    6
}

/// Tasks with a due instant sort before those without; otherwise earlier due
/// first.
fn cmp_due(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
