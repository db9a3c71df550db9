use serde::{Deserialize, Serialize};

use crate::auth::guard::Owned;

/// Template for a subtask, used both when creating and when fully replacing one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubTaskInput {
    /// The title of the subtask.
    pub title: String,
    /// Whether the subtask is done. Defaults to `false` when omitted.
    #[serde(default)]
    pub completed: bool,
}

/// Input structure for creating or fully replacing a task.
///
/// A `PUT` with this body is a total replacement: any field the caller omits falls
/// back to its default below rather than keeping the previous value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskInput {
    /// The title of the task.
    pub title: String,
    /// An optional description for the task.
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to `false`.
    #[serde(default)]
    pub completed: bool,
    /// Subtask templates; each one is given a freshly allocated id.
    #[serde(default)]
    pub subtasks: Vec<SubTaskInput>,
}

/// A subtask nested inside a `Task`.
///
/// Ids come from a single system-wide sequence, so they are unique across all tasks
/// even though a subtask is only ever addressed through its parent's id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubTask {
    pub id: u64,
    pub title: String,
    pub completed: bool,
}

/// Represents a task entity as held by the repository and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    /// Unique, never reused identifier.
    pub id: u64,
    /// The title of the task.
    pub title: String,
    /// An optional description for the task.
    pub description: Option<String>,
    pub completed: bool,
    /// Username of the creator. Immutable after creation.
    pub owner: String,
    /// Subtasks in insertion order.
    pub subtasks: Vec<SubTask>,
}

/// Body of the `PATCH .../status` endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusUpdate {
    pub completed: bool,
}

impl SubTask {
    pub fn new(id: u64, input: SubTaskInput) -> Self {
        Self {
            id,
            title: input.title,
            completed: input.completed,
        }
    }
}

impl Task {
    /// Builds a task owned by `owner`. Subtask ids are taken from `next_subtask_id`
    /// in template order.
    pub fn new(
        id: u64,
        owner: &str,
        input: TaskInput,
        next_subtask_id: impl FnMut() -> u64,
    ) -> Self {
        let mut task = Self {
            id,
            title: String::new(),
            description: None,
            completed: false,
            owner: owner.to_string(),
            subtasks: Vec::new(),
        };
        task.replace(input, next_subtask_id);
        task
    }

    /// Overwrites every caller-controlled field. `id` and `owner` are kept.
    pub fn replace(&mut self, input: TaskInput, mut next_subtask_id: impl FnMut() -> u64) {
        self.title = input.title;
        self.description = input.description;
        self.completed = input.completed;
        self.subtasks = input
            .subtasks
            .into_iter()
            .map(|template| SubTask::new(next_subtask_id(), template))
            .collect();
    }

    pub fn subtask_mut(&mut self, subtask_id: u64) -> Option<&mut SubTask> {
        self.subtasks.iter_mut().find(|s| s.id == subtask_id)
    }
}

impl Owned for Task {
    fn owner(&self) -> &str {
        &self.owner
    }
}
