//! In-memory task storage.
//!
//! All tasks, their nested subtasks, and both id sequences live behind one mutex,
//! so id allocation and every read-modify-write are serialized. Except for
//! `create` and `list_by_owner`, each operation runs the ownership guard against
//! the parent task before touching anything.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::auth::guard::{authorize, authorize_mut};
use crate::error::AppError;
use crate::models::{SubTask, SubTaskInput, Task, TaskInput};

/// Monotonic id source starting at 1. Ids are never handed out twice.
#[derive(Debug)]
struct IdSequence {
    next: u64,
}

impl IdSequence {
    fn new() -> Self {
        Self { next: 1 }
    }

    fn next(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

#[derive(Debug)]
struct Tables {
    tasks: BTreeMap<u64, Task>,
    task_ids: IdSequence,
    subtask_ids: IdSequence,
}

pub struct TaskRepository {
    tables: Mutex<Tables>,
}

impl TaskRepository {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables {
                tasks: BTreeMap::new(),
                task_ids: IdSequence::new(),
                subtask_ids: IdSequence::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` against the task if `owner` owns it. The lock is held throughout.
    fn with_owned_task<T>(
        &self,
        owner: &str,
        task_id: u64,
        f: impl FnOnce(&mut Task, &mut IdSequence) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut tables = self.lock();
        let Tables {
            tasks, subtask_ids, ..
        } = &mut *tables;
        let task = authorize_mut(owner, tasks.get_mut(&task_id), AppError::task_not_found)?;
        f(task, subtask_ids)
    }

    /// Creates a task owned by `owner`, allocating one task id and one subtask id per template.
    pub fn create(&self, owner: &str, input: TaskInput) -> Task {
        let mut tables = self.lock();
        let Tables {
            tasks,
            task_ids,
            subtask_ids,
        } = &mut *tables;

        let id = task_ids.next();
        let task = Task::new(id, owner, input, || subtask_ids.next());
        tasks.insert(id, task.clone());
        task
    }

    pub fn get(&self, owner: &str, task_id: u64) -> Result<Task, AppError> {
        let tables = self.lock();
        authorize(owner, tables.tasks.get(&task_id), AppError::task_not_found).cloned()
    }

    /// Tasks owned by `owner`, in ascending id order.
    pub fn list_by_owner(&self, owner: &str) -> Vec<Task> {
        self.lock()
            .tasks
            .values()
            .filter(|task| task.owner == owner)
            .cloned()
            .collect()
    }

    /// Full replacement of title, description, completion and the subtask list.
    pub fn replace(&self, owner: &str, task_id: u64, input: TaskInput) -> Result<Task, AppError> {
        self.with_owned_task(owner, task_id, |task, subtask_ids| {
            task.replace(input, || subtask_ids.next());
            Ok(task.clone())
        })
    }

    pub fn set_status(&self, owner: &str, task_id: u64, completed: bool) -> Result<(), AppError> {
        self.with_owned_task(owner, task_id, |task, _| {
            task.completed = completed;
            Ok(())
        })
    }

    /// Removes the task together with all of its subtasks.
    pub fn delete(&self, owner: &str, task_id: u64) -> Result<(), AppError> {
        let mut tables = self.lock();
        authorize(owner, tables.tasks.get(&task_id), AppError::task_not_found)?;
        tables.tasks.remove(&task_id);
        Ok(())
    }

    pub fn add_subtask(
        &self,
        owner: &str,
        task_id: u64,
        input: SubTaskInput,
    ) -> Result<SubTask, AppError> {
        self.with_owned_task(owner, task_id, |task, subtask_ids| {
            let subtask = SubTask::new(subtask_ids.next(), input);
            task.subtasks.push(subtask.clone());
            Ok(subtask)
        })
    }

    pub fn replace_subtask(
        &self,
        owner: &str,
        task_id: u64,
        subtask_id: u64,
        input: SubTaskInput,
    ) -> Result<SubTask, AppError> {
        self.with_owned_task(owner, task_id, |task, _| {
            let subtask = task
                .subtask_mut(subtask_id)
                .ok_or_else(AppError::subtask_not_found)?;
            subtask.title = input.title;
            subtask.completed = input.completed;
            Ok(subtask.clone())
        })
    }

    pub fn set_subtask_status(
        &self,
        owner: &str,
        task_id: u64,
        subtask_id: u64,
        completed: bool,
    ) -> Result<(), AppError> {
        self.with_owned_task(owner, task_id, |task, _| {
            let subtask = task
                .subtask_mut(subtask_id)
                .ok_or_else(AppError::subtask_not_found)?;
            subtask.completed = completed;
            Ok(())
        })
    }

    pub fn list_subtasks(&self, owner: &str, task_id: u64) -> Result<Vec<SubTask>, AppError> {
        self.with_owned_task(owner, task_id, |task, _| Ok(task.subtasks.clone()))
    }
}

impl Default for TaskRepository {
    fn default() -> Self {
        Self::new()
    }
}
