//! Subtask endpoints, nested under `/tasks/{task_id}/subtasks`.
//!
//! Subtasks have no owner of their own; every handler is authorized against the
//! parent task. A foreign or missing parent yields "Task not found", a subtask id
//! that is not part of the parent yields "Subtask not found".

use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{StatusUpdate, SubTaskInput},
    repository::TaskRepository,
    routes::tasks::{requested_status, StatusQuery},
};
use actix_web::{get, patch, post, put, web, HttpResponse, Responder};
use serde_json::json;

#[post("/{task_id}/subtasks")]
pub async fn create_subtask(
    repo: web::Data<TaskRepository>,
    user: AuthenticatedUser,
    task_id: web::Path<u64>,
    subtask_data: web::Json<SubTaskInput>,
) -> Result<impl Responder, AppError> {
    let subtask = repo.add_subtask(
        user.username(),
        task_id.into_inner(),
        subtask_data.into_inner(),
    )?;
    Ok(HttpResponse::Created().json(subtask))
}

#[get("/{task_id}/subtasks")]
pub async fn list_subtasks(
    repo: web::Data<TaskRepository>,
    user: AuthenticatedUser,
    task_id: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    let subtasks = repo.list_subtasks(user.username(), task_id.into_inner())?;
    Ok(HttpResponse::Ok().json(subtasks))
}

/// Fully replaces a subtask's title and completion flag.
#[put("/{task_id}/subtasks/{subtask_id}")]
pub async fn update_subtask(
    repo: web::Data<TaskRepository>,
    user: AuthenticatedUser,
    path: web::Path<(u64, u64)>,
    subtask_data: web::Json<SubTaskInput>,
) -> Result<impl Responder, AppError> {
    let (task_id, subtask_id) = path.into_inner();
    let subtask = repo.replace_subtask(
        user.username(),
        task_id,
        subtask_id,
        subtask_data.into_inner(),
    )?;
    Ok(HttpResponse::Ok().json(subtask))
}

#[patch("/{task_id}/subtasks/{subtask_id}/status")]
pub async fn update_subtask_status(
    repo: web::Data<TaskRepository>,
    user: AuthenticatedUser,
    path: web::Path<(u64, u64)>,
    body: Option<web::Json<StatusUpdate>>,
    query: web::Query<StatusQuery>,
) -> Result<impl Responder, AppError> {
    let (task_id, subtask_id) = path.into_inner();
    let completed = requested_status(body, query)?;
    repo.set_subtask_status(user.username(), task_id, subtask_id, completed)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Subtask status updated" })))
}
