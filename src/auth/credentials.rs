use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use bcrypt::DEFAULT_COST;

use crate::auth::password::{hash_password, verify_password};
use crate::error::AppError;
use crate::models::User;

/// Username to password-hash mapping.
///
/// Usernames are matched exactly (case-sensitive). Only bcrypt hashes are kept;
/// plaintext passwords never outlive the call that receives them.
pub struct CredentialStore {
    users: RwLock<HashMap<String, User>>,
    cost: u32,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::with_cost(DEFAULT_COST)
    }

    pub fn with_cost(cost: u32) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            cost,
        }
    }

    /// Registers a new user.
    ///
    /// Returns `AppError::BadRequest("Username already exists")` if the username is taken;
    /// the existing hash is left untouched in that case.
    pub fn register(&self, username: &str, password: &str) -> Result<(), AppError> {
        if self.contains(username) {
            return Err(already_exists());
        }

        // Hashing is slow, so it runs outside the lock. The entry is re-checked
        // below in case a concurrent registration won the race.
        let password_hash = hash_password(password, self.cost)?;

        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        if users.contains_key(username) {
            return Err(already_exists());
        }
        users.insert(
            username.to_string(),
            User {
                username: username.to_string(),
                password_hash,
            },
        );
        Ok(())
    }

    /// True iff `username` exists and `password` matches its stored hash.
    pub fn verify(&self, username: &str, password: &str) -> Result<bool, AppError> {
        let stored = {
            let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
            match users.get(username) {
                Some(user) => user.password_hash.clone(),
                None => return Ok(false),
            }
        };
        verify_password(password, &stored)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(username)
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

fn already_exists() -> AppError {
    AppError::BadRequest("Username already exists".into())
}
