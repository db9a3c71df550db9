use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{StatusUpdate, TaskInput},
    repository::TaskRepository,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

/// `completed` may arrive as a query parameter instead of a JSON body.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub completed: Option<bool>,
}

/// Picks the new completion flag from the JSON body, falling back to the query string.
pub(crate) fn requested_status(
    body: Option<web::Json<StatusUpdate>>,
    query: web::Query<StatusQuery>,
) -> Result<bool, AppError> {
    body.map(|update| update.completed)
        .or(query.completed)
        .ok_or_else(|| AppError::ValidationError("Field `completed` is required".into()))
}

/// Lists the caller's tasks.
///
/// ## Responses:
/// - `200 OK`: JSON array of the caller's tasks in ascending id order. Other users'
///   tasks are never included.
/// - `401 Unauthorized`: missing, invalid or expired token.
#[get("")]
pub async fn list_tasks(
    repo: web::Data<TaskRepository>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(repo.list_by_owner(user.username())))
}

/// Creates a new task owned by the caller.
///
/// ## Request Body:
/// `TaskInput`: `title` (required), `description`, `completed` (default false) and
/// `subtasks` (list of `{title, completed}` templates, default empty).
///
/// ## Responses:
/// - `201 Created`: the new `Task`, with freshly allocated task and subtask ids.
/// - `401 Unauthorized`: missing, invalid or expired token.
/// - `422 Unprocessable Entity`: malformed body.
#[post("")]
pub async fn create_task(
    repo: web::Data<TaskRepository>,
    user: AuthenticatedUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = repo.create(user.username(), task_data.into_inner());
    log::info!("User {} created task {}", task.owner, task.id);
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves one of the caller's tasks.
///
/// ## Responses:
/// - `200 OK`: the `Task`.
/// - `404 Not Found`: no such task, or it belongs to another user.
#[get("/{task_id}")]
pub async fn get_task(
    repo: web::Data<TaskRepository>,
    user: AuthenticatedUser,
    task_id: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    let task = repo.get(user.username(), task_id.into_inner())?;
    Ok(HttpResponse::Ok().json(task))
}

/// Fully replaces a task.
///
/// Fields missing from the body revert to their defaults; a supplied `subtasks`
/// list replaces the existing one with newly numbered subtasks.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `404 Not Found`: no such task, or it belongs to another user.
/// - `422 Unprocessable Entity`: malformed body.
#[put("/{task_id}")]
pub async fn update_task(
    repo: web::Data<TaskRepository>,
    user: AuthenticatedUser,
    task_id: web::Path<u64>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = repo.replace(user.username(), task_id.into_inner(), task_data.into_inner())?;
    Ok(HttpResponse::Ok().json(task))
}

/// Sets a task's completion flag.
///
/// ## Responses:
/// - `200 OK`: `{"message": "Task status updated"}`.
/// - `404 Not Found`: no such task, or it belongs to another user.
/// - `422 Unprocessable Entity`: `completed` missing from both body and query.
#[patch("/{task_id}/status")]
pub async fn update_task_status(
    repo: web::Data<TaskRepository>,
    user: AuthenticatedUser,
    task_id: web::Path<u64>,
    body: Option<web::Json<StatusUpdate>>,
    query: web::Query<StatusQuery>,
) -> Result<impl Responder, AppError> {
    let completed = requested_status(body, query)?;
    repo.set_status(user.username(), task_id.into_inner(), completed)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Task status updated" })))
}

/// Deletes a task and all of its subtasks.
///
/// ## Responses:
/// - `200 OK`: `{"message": "Task deleted"}`.
/// - `404 Not Found`: no such task, or it belongs to another user.
#[delete("/{task_id}")]
pub async fn delete_task(
    repo: web::Data<TaskRepository>,
    user: AuthenticatedUser,
    task_id: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    repo.delete(user.username(), task_id)?;
    log::info!("User {} deleted task {}", user.username(), task_id);
    Ok(HttpResponse::Ok().json(json!({ "message": "Task deleted" })))
}
