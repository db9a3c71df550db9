//! Authentication and ownership checks shared by every task and subtask operation.
//!
//! `authenticate` turns a raw bearer token into a username. `authorize` and
//! `authorize_mut` gate access to a looked-up resource: a missing resource and a
//! resource owned by someone else produce the same `NotFound`, so callers cannot
//! discover which ids other users own.

use crate::auth::credentials::CredentialStore;
use crate::auth::token::TokenService;
use crate::error::AppError;

/// A resource with a single owning username.
pub trait Owned {
    fn owner(&self) -> &str;
}

/// Resolves a bearer token to the username it was issued for.
///
/// Fails with `AppError::Unauthorized` for any invalid token.
pub fn authenticate(
    token: &str,
    tokens: &TokenService,
    credentials: &CredentialStore,
) -> Result<String, AppError> {
    tokens.verify(token, credentials)
}

/// Returns `resource` if it exists and belongs to `caller`, otherwise `not_found`.
pub fn authorize<'a, R: Owned>(
    caller: &str,
    resource: Option<&'a R>,
    not_found: fn() -> AppError,
) -> Result<&'a R, AppError> {
    match resource {
        Some(r) if r.owner() == caller => Ok(r),
        _ => Err(not_found()),
    }
}

/// Mutable counterpart of [`authorize`].
pub fn authorize_mut<'a, R: Owned>(
    caller: &str,
    resource: Option<&'a mut R>,
    not_found: fn() -> AppError,
) -> Result<&'a mut R, AppError> {
    match resource {
        Some(r) if r.owner() == caller => Ok(r),
        _ => Err(not_found()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[derive(Debug)]
    struct Doc(&'static str);

    impl Owned for Doc {
        fn owner(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_owner_is_authorized() {
        let doc = Doc("alice");
        assert!(authorize("alice", Some(&doc), AppError::task_not_found).is_ok());
    }

    #[test]
    fn test_foreign_and_missing_are_indistinguishable() {
        let doc = Doc("alice");
        let foreign = authorize("bob", Some(&doc), AppError::task_not_found).unwrap_err();
        let missing = authorize::<Doc>("bob", None, AppError::task_not_found).unwrap_err();
        assert_eq!(foreign, missing);
        assert_eq!(foreign, AppError::task_not_found());
    }

    #[test]
    fn test_authorize_mut_allows_mutation_by_owner() {
        let mut doc = Doc("alice");
        let r = authorize_mut("alice", Some(&mut doc), AppError::task_not_found).unwrap();
        r.0 = "still-alice";
        assert_eq!(doc.0, "still-alice");

        let mut doc = Doc("alice");
        assert!(authorize_mut("bob", Some(&mut doc), AppError::task_not_found).is_err());
    }

    #[test]
    fn test_authenticate() {
        let credentials = CredentialStore::with_cost(4);
        credentials.register("alice", "pw").unwrap();
        let tokens = TokenService::new("secret", Duration::minutes(30));

        let token = tokens.issue("alice").unwrap();
        assert_eq!(authenticate(&token, &tokens, &credentials).unwrap(), "alice");
        assert!(matches!(
            authenticate("bogus", &tokens, &credentials),
            Err(AppError::Unauthorized(_))
        ));
    }
}
