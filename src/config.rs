use std::env;

use crate::error::AppError;

const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// Process-wide settings, read once at startup.
pub struct Config {
    pub server_port: u16,
    pub server_host: String,
    /// Secret used to sign and verify access tokens. Never rotated while the process runs.
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::InternalServerError("JWT_SECRET must be set".into()))?;

        Ok(Self {
            server_port: parse_var("SERVER_PORT", 8080)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            jwt_secret,
            token_ttl_minutes: parse_var("TOKEN_TTL_MINUTES", DEFAULT_TOKEN_TTL_MINUTES)?,
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::InternalServerError(format!("{} must be a number", name))),
        Err(_) => Ok(default),
    }
}
