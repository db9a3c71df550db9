use actix_web::web;
use chrono::Duration;

use crate::auth::{CredentialStore, TokenService};
use crate::config::Config;
use crate::repository::TaskRepository;

/// Handles to the shared services, built once at startup and cloned into every
/// worker's `App`.
#[derive(Clone)]
pub struct AppState {
    pub credentials: web::Data<CredentialStore>,
    pub tokens: web::Data<TokenService>,
    pub tasks: web::Data<TaskRepository>,
}

impl AppState {
    pub fn new(credentials: CredentialStore, tokens: TokenService, tasks: TaskRepository) -> Self {
        Self {
            credentials: web::Data::new(credentials),
            tokens: web::Data::new(tokens),
            tasks: web::Data::new(tasks),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            CredentialStore::with_cost(config.bcrypt_cost),
            TokenService::new(
                &config.jwt_secret,
                Duration::minutes(config.token_ttl_minutes),
            ),
            TaskRepository::new(),
        )
    }

    /// Registers the shared state and all routes on an app.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.credentials.clone())
            .app_data(self.tokens.clone())
            .app_data(self.tasks.clone())
            .configure(crate::routes::config);
    }
}
