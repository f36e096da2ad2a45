//! End-to-end flows through the engine: complete tasks, recompute the
//! glance, and check the properties the widget surface depends on.

use chrono::{DateTime, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use glance_core::{
    complete_task, compute_outstanding, CompletionLog, DateKey, FallbackReason, PrivacyMode,
    Priority, Project, RecurrenceBehavior, RecurrenceRule, SelectionPolicy, Snapshot, Task,
    WorkflowState,
};

const TZ: Tz = chrono_tz::America::Chicago;

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

fn personal() -> Project {
    Project::new("personal", "Personal", NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
}

fn task(id: &str, title: &str) -> Task {
    Task::new(id, "personal", title, at(2026, 1, 10, 8, 0))
}

/// Persist a completion outcome back into the snapshot the way the app's
/// storage layer would.
fn persist(snapshot: &mut Snapshot, task_id: &str, day: DateKey, now: DateTime<Utc>) -> bool {
    let outcome = complete_task(snapshot, task_id, day, now, TZ).unwrap();
    if !outcome.was_already_completed {
        snapshot.completions.push(outcome.log.clone());
    }
    if let Some(updated) = outcome.updated_task {
        if let Some(slot) = snapshot.tasks.iter_mut().find(|t| t.id == task_id) {
            *slot = updated;
        }
    }
    outcome.was_already_completed
}

#[test]
fn completing_the_same_occurrence_three_times_writes_one_log() {
    let mut snap = Snapshot::new(vec![personal()], vec![task("milk", "Buy milk")], vec![]);
    let day = DateKey::parse("2026-02-03").unwrap();
    let now = at(2026, 2, 3, 15, 0);

    let results: Vec<bool> = (0..3).map(|_| persist(&mut snap, "milk", day, now)).collect();

    assert_eq!(results, vec![false, true, true]);
    assert_eq!(snap.completions.len(), 1);
    assert_eq!(snap.completions[0].occurrence_key, "once");
}

#[test]
fn habit_completed_yesterday_is_outstanding_again_today() {
    let mut snap = Snapshot::new(
        vec![personal()],
        vec![task("stretch", "Stretch").with_behavior(RecurrenceBehavior::HabitReset)],
        vec![],
    );

    let yesterday = DateKey::parse("2026-02-03").unwrap();
    persist(&mut snap, "stretch", yesterday, at(2026, 2, 3, 9, 0));

    let done_view = compute_outstanding(
        &snap,
        &SelectionPolicy::TodayOverview,
        PrivacyMode::Visible,
        5,
        at(2026, 2, 3, 10, 0),
        yesterday,
        TZ,
    );
    assert_eq!(done_view.counters.outstanding_total, 0);
    assert_eq!(done_view.fallback_reason, Some(FallbackReason::AllCompleted));

    let next_day = compute_outstanding(
        &snap,
        &SelectionPolicy::TodayOverview,
        PrivacyMode::Visible,
        5,
        at(2026, 2, 4, 10, 0),
        yesterday.next_day(),
        TZ,
    );
    assert_eq!(next_day.counters.outstanding_total, 1);
    assert_eq!(next_day.display_list[0].task_id, "stretch");
    assert_eq!(next_day.counters.recurring_total, 1);
    assert_eq!(next_day.counters.recurring_done, 0);
}

#[test]
fn weekly_rollover_advances_one_week_and_keys_the_closed_occurrence() {
    // 2026-02-04 is a Wednesday.
    let due = at(2026, 2, 4, 18, 0);
    let mut snap = Snapshot::new(
        vec![personal()],
        vec![task("plants", "Water plants")
            .with_rule(RecurrenceRule::weekly(1, vec![Weekday::Wed], at(2026, 1, 7, 18, 0)))
            .with_next_due_at(due)],
        vec![],
    );

    let day = DateKey::parse("2026-02-04").unwrap();
    persist(&mut snap, "plants", day, at(2026, 2, 4, 20, 0));

    assert_eq!(snap.completions.len(), 1);
    assert_eq!(snap.completions[0].occurrence_key, "2026-02-04");
    assert_eq!(
        snap.task("plants").unwrap().next_due_at,
        Some(at(2026, 2, 11, 18, 0))
    );

    // The closed occurrence no longer shows; the advanced one is not yet due.
    let view = compute_outstanding(
        &snap,
        &SelectionPolicy::TodayOverview,
        PrivacyMode::Visible,
        5,
        at(2026, 2, 4, 21, 0),
        day,
        TZ,
    );
    assert_eq!(view.counters.outstanding_total, 1);
    assert!(!view.display_list[0].is_overdue);
}

#[test]
fn late_rollover_completion_advances_exactly_one_step() {
    // Due two weeks ago; completing now still advances a single interval
    // from the pre-advance due instant, not from "now".
    let due = at(2026, 1, 21, 18, 0); // a Wednesday
    let mut snap = Snapshot::new(
        vec![personal()],
        vec![task("plants", "Water plants")
            .with_rule(RecurrenceRule::weekly(1, vec![Weekday::Wed], at(2026, 1, 7, 18, 0)))
            .with_next_due_at(due)],
        vec![],
    );

    persist(
        &mut snap,
        "plants",
        DateKey::parse("2026-02-04").unwrap(),
        at(2026, 2, 4, 20, 0),
    );

    assert_eq!(snap.completions[0].occurrence_key, "2026-01-21");
    assert_eq!(
        snap.task("plants").unwrap().next_due_at,
        Some(at(2026, 1, 28, 18, 0))
    );
}

#[test]
fn output_is_identical_under_input_permutation() {
    let tasks = vec![
        task("a", "Alpha").with_due_at(at(2026, 2, 5, 9, 0)),
        task("b", "Beta").with_priority(Priority::P1),
        task("c", "Gamma").with_state(WorkflowState::Doing),
        task("d", "Delta").with_behavior(RecurrenceBehavior::HabitReset),
        task("e", "Epsilon"),
        task("f", "Zeta").with_due_at(at(2026, 2, 1, 9, 0)),
    ];
    let logs = vec![CompletionLog::new("e", "once", at(2026, 2, 1, 12, 0))];
    let now = at(2026, 2, 4, 15, 0);
    let day = DateKey::today(now, TZ);

    let reference = compute_outstanding(
        &Snapshot::new(vec![personal()], tasks.clone(), logs.clone()),
        &SelectionPolicy::TodayOverview,
        PrivacyMode::Visible,
        10,
        now,
        day,
        TZ,
    );

    for rotation in 1..tasks.len() {
        let mut shuffled = tasks.clone();
        shuffled.rotate_left(rotation);
        let mut reversed = shuffled.clone();
        reversed.reverse();

        for variant in [shuffled, reversed] {
            let out = compute_outstanding(
                &Snapshot::new(vec![personal()], variant, logs.clone()),
                &SelectionPolicy::TodayOverview,
                PrivacyMode::Visible,
                10,
                now,
                day,
                TZ,
            );
            assert_eq!(out, reference);
        }
    }
}

#[test]
fn n_identical_tasks_come_back_in_id_order() {
    let ids = ["t4", "t1", "t5", "t2", "t3"];
    let tasks: Vec<Task> = ids.iter().map(|id| task(id, "Same title")).collect();
    let snap = Snapshot::new(vec![personal()], tasks, vec![]);
    let now = at(2026, 2, 4, 15, 0);

    let out = compute_outstanding(
        &snap,
        &SelectionPolicy::TodayOverview,
        PrivacyMode::Visible,
        10,
        now,
        DateKey::today(now, TZ),
        TZ,
    );

    let order: Vec<&str> = out.display_list.iter().map(|d| d.task_id.as_str()).collect();
    assert_eq!(order, vec!["t1", "t2", "t3", "t4", "t5"]);
}

#[test]
fn masking_changes_titles_and_nothing_else() {
    let tasks = vec![
        task("a", "Call the bank about the visa")
            .with_state(WorkflowState::Doing)
            .with_priority(Priority::P1),
        task("b", "Pay rent").with_due_at(at(2026, 2, 1, 9, 0)),
        task("c", "Stretch").with_behavior(RecurrenceBehavior::HabitReset),
    ];
    let now = at(2026, 2, 4, 15, 0);
    let day = DateKey::today(now, TZ);
    let snap = Snapshot::new(vec![personal()], tasks, vec![]);

    let run = |mode: PrivacyMode| {
        compute_outstanding(&snap, &SelectionPolicy::TodayOverview, mode, 10, now, day, TZ)
    };

    let visible = run(PrivacyMode::Visible);
    let masked = run(PrivacyMode::Masked);
    let hidden = run(PrivacyMode::Hidden);

    assert_eq!(visible.counters, masked.counters);
    assert_eq!(visible.counters, hidden.counters);

    for i in 0..visible.display_list.len() {
        let (v, m, h) = (&visible.display_list[i], &masked.display_list[i], &hidden.display_list[i]);
        assert_eq!(v.task_id, m.task_id);
        assert_eq!(v.task_id, h.task_id);
        assert_eq!(
            (v.is_doing, v.is_overdue, v.priority, v.is_p1),
            (m.is_doing, m.is_overdue, m.priority, m.is_p1)
        );
        assert_eq!(m.display_title, format!("Task {}", i + 1));
        assert!(h.display_title.is_empty());
    }
}

#[test]
fn summary_serializes_for_the_widget_boundary() {
    let now = at(2026, 2, 4, 15, 0);
    let snap = Snapshot::new(
        vec![personal()],
        vec![task("a", "Pay rent").with_due_at(at(2026, 2, 1, 9, 0))],
        vec![],
    );
    let out = compute_outstanding(
        &snap,
        &SelectionPolicy::TodayOverview,
        PrivacyMode::Visible,
        5,
        now,
        DateKey::today(now, TZ),
        TZ,
    );

    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["counters"]["overdue_count"], 1);
    assert_eq!(json["display_list"][0]["task_id"], "a");
    assert!(json.get("fallback_reason").is_none());
}
