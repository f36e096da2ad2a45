//! In-memory snapshot of the entities the engine reasons about.
//!
//! The engine never talks to a repository; callers load a consistent
//! `Snapshot` and hand it in. Lookup helpers mirror the store contracts the
//! surrounding app provides (point lookup by id, existence check by
//! (task, occurrence key)).

use serde::{Deserialize, Serialize};

use crate::completion::CompletionLog;
use crate::task::{Project, Task};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub completions: Vec<CompletionLog>,
}

impl Snapshot {
    pub fn new(projects: Vec<Project>, tasks: Vec<Task>, completions: Vec<CompletionLog>) -> Self {
        Self {
            projects,
            tasks,
            completions,
        }
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn completion(&self, task_id: &str, occurrence_key: &str) -> Option<&CompletionLog> {
        self.completions
            .iter()
            .find(|l| l.task_id == task_id && l.occurrence_key == occurrence_key)
    }

    pub fn has_completion(&self, task_id: &str, occurrence_key: &str) -> bool {
        self.completion(task_id, occurrence_key).is_some()
    }
}
