#![doc = "The `tasktrack` library crate."]
#![doc = ""]
#![doc = "Task and subtask tracking over HTTP with username/password registration,"]
#![doc = "bearer-token sessions, and per-owner data isolation. The binary (`main.rs`)"]
#![doc = "builds an `AppState` from `Config` and serves `routes::config`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use state::AppState;
