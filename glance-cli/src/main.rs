use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};

mod config;
mod state;

use glance_core::{
    complete_task, compute_outstanding, mask_notice, mask_project_title, DateKey, FallbackReason,
    OutstandingSummary, PrivacyMode, SelectionPolicy, Snapshot,
};

#[derive(Parser, Debug)]
#[command(name = "glance", version, about = "Glance personal task manager CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show today's outstanding glance
    Today {
        /// Limit number of tasks shown (default from config)
        #[arg(long)]
        limit: Option<usize>,

        /// Pin the glance to one project id
        #[arg(long)]
        project: Option<String>,

        /// Privacy mode: visible | masked | hidden (default from config)
        #[arg(long)]
        privacy: Option<String>,

        /// Override the reference instant (RFC3339), mainly for testing
        #[arg(long)]
        at: Option<String>,
    },

    /// Record a completion for a task
    Complete {
        task_id: String,

        /// Day to record a habit completion against (YYYY-MM-DD, default today)
        #[arg(long)]
        day: Option<String>,

        /// Completion instant (RFC3339, default now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Write a default config and empty snapshot under ~/.glance
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Today {
            limit,
            project,
            privacy,
            at,
        } => run_today(limit, project, privacy, at),
        Command::Complete { task_id, day, at } => run_complete(&task_id, day, at),
        Command::Init => run_init(),
    }
}

fn run_today(
    limit: Option<usize>,
    project: Option<String>,
    privacy: Option<String>,
    at: Option<String>,
) -> Result<()> {
    let cfg = config::load_config()?;
    let tz = parse_timezone(&cfg.display.timezone)?;
    let privacy = match privacy {
        Some(s) => parse_privacy(&s)?,
        None => cfg.display.privacy,
    };
    let now = parse_instant_or_now(at)?;
    let day = DateKey::today(now, tz);
    let top_n = limit.unwrap_or(cfg.display.limit);

    let snapshot = state::load_snapshot()?;
    let policy = match &project {
        Some(id) => SelectionPolicy::PinnedFirst {
            project_id: Some(id.clone()),
        },
        None => SelectionPolicy::TodayOverview,
    };

    // Header only when the pin actually narrows the scope; a dead pin falls
    // back to the full overview.
    if let Some(p) = project.as_deref().and_then(|id| snapshot.project(id)) {
        if p.is_active() {
            let header = mask_project_title(&p.title, 1, privacy);
            if !header.is_empty() {
                println!("Project: {header}");
            }
        }
    }

    let summary = compute_outstanding(&snapshot, &policy, privacy, top_n, now, day, tz);
    render_summary(&summary);
    Ok(())
}

fn render_summary(summary: &OutstandingSummary) {
    let c = &summary.counters;
    println!(
        "outstanding {} | overdue {} | due soon {} | doing {} | P1 {} | habits {}/{} | blocked {}",
        c.outstanding_total,
        c.overdue_count,
        c.due_soon_count,
        c.doing_count,
        c.p1_count,
        c.recurring_done,
        c.recurring_total,
        c.blocked_count,
    );

    if summary.display_list.is_empty() {
        let msg = match summary.fallback_reason {
            Some(FallbackReason::NoTasks) => "No tasks yet.",
            Some(FallbackReason::AllCompleted) => "All caught up.",
            Some(FallbackReason::NoPinnedProject) => "No pinned project; showed everything.",
            Some(FallbackReason::PinnedProjectArchived) => {
                "Pinned project is archived; showed everything."
            }
            Some(FallbackReason::PinnedProjectCompleted) => {
                "Pinned project is completed; showed everything."
            }
            None => "Nothing to show.",
        };
        println!("{msg}");
        return;
    }

    for (i, item) in summary.display_list.iter().enumerate() {
        let mut tags = Vec::new();
        if item.is_doing {
            tags.push("doing");
        }
        if item.is_overdue {
            tags.push("overdue");
        }
        let suffix = if tags.is_empty() {
            String::new()
        } else {
            format!(" ({})", tags.join(", "))
        };
        println!(
            "{:>2}. [{:?}] {}{}",
            i + 1,
            item.priority,
            item.display_title,
            suffix
        );
    }
}

fn run_complete(task_id: &str, day: Option<String>, at: Option<String>) -> Result<()> {
    let cfg = config::load_config()?;
    let tz = parse_timezone(&cfg.display.timezone)?;
    let now = parse_instant_or_now(at)?;
    let day = match day {
        Some(s) => DateKey::parse(&s).ok_or_else(|| anyhow!("invalid day: {s}"))?,
        None => DateKey::today(now, tz),
    };

    let mut snapshot = state::load_snapshot()?;
    let title = snapshot
        .task(task_id)
        .map(|t| t.title.clone())
        .unwrap_or_default();

    // Distinct error variants surface as distinct messages, so a broken
    // rollover task never reads like a duplicate completion.
    let outcome = complete_task(&snapshot, task_id, day, now, tz)?;

    if !outcome.was_already_completed {
        snapshot.completions.push(outcome.log.clone());
    }
    if let Some(updated) = outcome.updated_task {
        if let Some(slot) = snapshot.tasks.iter_mut().find(|t| t.id == task_id) {
            *slot = updated;
        }
    }
    state::save_snapshot(&snapshot)?;

    let (notice, generic) = if outcome.was_already_completed {
        (
            format!("Already completed: {title}"),
            "Already completed".to_string(),
        )
    } else {
        (format!("Completed: {title}"), "Task completed".to_string())
    };
    let shown = mask_notice(&notice, &generic, cfg.display.privacy);
    if !shown.is_empty() {
        println!("{shown}");
    }
    Ok(())
}

fn run_init() -> Result<()> {
    let cfg_path = config::config_path()?;
    if cfg_path.exists() {
        println!("Config already exists: {}", cfg_path.display());
    } else {
        config::save_config(&config::Config::default())?;
        println!("Wrote {}", cfg_path.display());
    }

    let snap_path = state::snapshot_path()?;
    if snap_path.exists() {
        println!("Snapshot already exists: {}", snap_path.display());
    } else {
        state::save_snapshot(&Snapshot::default())?;
        println!("Wrote {}", snap_path.display());
    }
    Ok(())
}

fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse().map_err(|_| anyhow!("invalid timezone: {s}"))
}

fn parse_privacy(s: &str) -> Result<PrivacyMode> {
    match s {
        "visible" => Ok(PrivacyMode::Visible),
        "masked" => Ok(PrivacyMode::Masked),
        "hidden" => Ok(PrivacyMode::Hidden),
        other => bail!("invalid privacy mode: {other} (visible|masked|hidden)"),
    }
}

fn parse_instant_or_now(at: Option<String>) -> Result<DateTime<Utc>> {
    match at {
        Some(s) => Ok(DateTime::parse_from_rfc3339(&s)
            .with_context(|| format!("invalid instant: {s}"))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}
