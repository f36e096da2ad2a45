//! Display-string privacy overlay.
//!
//! Applied after ranking, never consulted during it: masking rewrites the
//! strings a surface shows and leaves every ranking signal untouched. In
//! `masked` and `hidden` modes no raw user text may appear anywhere,
//! including success/failure notices.

use serde::{Deserialize, Serialize};

/// Longest title rendered in `visible` mode before truncation.
pub const VISIBLE_TITLE_MAX: usize = 32;

const ELLIPSIS: char = '…';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyMode {
    #[default]
    Visible,
    Masked,
    Hidden,
}

/// Mask a task title for display. `position` is the 1-based slot in the
/// already-sorted display list.
pub fn mask_title(title: &str, position: usize, mode: PrivacyMode) -> String {
    match mode {
        PrivacyMode::Visible => truncate(title, VISIBLE_TITLE_MAX),
        PrivacyMode::Masked => format!("Task {position}"),
        PrivacyMode::Hidden => String::new(),
    }
}

/// Same policy for project titles.
pub fn mask_project_title(title: &str, position: usize, mode: PrivacyMode) -> String {
    match mode {
        PrivacyMode::Visible => truncate(title, VISIBLE_TITLE_MAX),
        PrivacyMode::Masked => format!("Project {position}"),
        PrivacyMode::Hidden => String::new(),
    }
}

/// Short status/intent messages: `notice` may embed user text and is only
/// shown verbatim in `visible` mode; `generic` must not.
pub fn mask_notice(notice: &str, generic: &str, mode: PrivacyMode) -> String {
    match mode {
        PrivacyMode::Visible => notice.to_string(),
        PrivacyMode::Masked => generic.to_string(),
        PrivacyMode::Hidden => String::new(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push(ELLIPSIS);
    out
}
