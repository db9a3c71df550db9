pub mod auth;
pub mod subtasks;
pub mod tasks;

use actix_web::{error, web};

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Registers every route. `/register` and `/login` are public; the whole
/// `/tasks` scope sits behind `AuthMiddleware`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .service(auth::register)
        .service(auth::login)
        .service(
            web::scope("/tasks")
                .wrap(AuthMiddleware)
                .service(tasks::list_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::update_task_status)
                .service(tasks::delete_task)
                .service(subtasks::create_subtask)
                .service(subtasks::list_subtasks)
                .service(subtasks::update_subtask)
                .service(subtasks::update_subtask_status),
        );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::ValidationError(err.to_string()))
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::ValidationError(err.to_string()))
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::ValidationError(err.to_string()))
    })
}
