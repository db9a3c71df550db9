use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::credentials::CredentialStore;
use crate::error::AppError;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the username.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch) for the token.
    pub exp: usize,
}

/// Issues and verifies HS256-signed, time-limited access tokens.
///
/// The secret is fixed for the lifetime of the service. Tokens are stateless: once
/// issued, a token stays valid until `exp` and there is no revocation list.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared against the server clock with no skew allowance.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Generates a token for `username` that expires after the configured TTL.
    pub fn issue(&self, username: &str) -> Result<String, AppError> {
        self.issue_with_ttl(username, self.ttl)
    }

    /// Generates a token for `username` expiring `ttl` from now.
    ///
    /// Returns `AppError::InternalServerError` if the expiry overflows or encoding fails.
    pub fn issue_with_ttl(&self, username: &str, ttl: Duration) -> Result<String, AppError> {
        let expiration = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::InternalServerError("Token expiry out of range".into()))?
            .timestamp()
            .max(0) as usize;

        let claims = Claims {
            sub: username.to_string(),
            exp: expiration,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Checks the signature and expiry of `token` and returns its claims.
    ///
    /// Every failure (malformed input, wrong key, tampering, expiry) is reported as the
    /// same `AppError::Unauthorized("Invalid credentials")`; the concrete reason is only logged.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("Rejected access token: {}", e);
                AppError::from(e)
            })
    }

    /// Full token verification: signature, expiry, and that the subject is still a
    /// registered user. Returns the username on success.
    pub fn verify(&self, token: &str, credentials: &CredentialStore) -> Result<String, AppError> {
        let claims = self.decode(token)?;
        if !credentials.contains(&claims.sub) {
            log::debug!("Rejected access token for unknown subject");
            return Err(AppError::invalid_credentials());
        }
        Ok(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SECRET: &str = "test_secret_for_tokens";

    fn service() -> TokenService {
        TokenService::new(SECRET, Duration::minutes(30))
    }

    fn credentials_with(username: &str) -> CredentialStore {
        let credentials = CredentialStore::with_cost(4);
        credentials.register(username, "pw").unwrap();
        credentials
    }

    #[test]
    fn test_token_generation_and_verification() {
        let tokens = service();
        let credentials = credentials_with("alice");

        let token = tokens.issue("alice").unwrap();
        assert_eq!(tokens.verify(&token, &credentials).unwrap(), "alice");
    }

    #[test]
    fn test_token_expiry_uses_configured_ttl() {
        let tokens = service();
        let before = Utc::now().timestamp() as usize;
        let claims = tokens.decode(&tokens.issue("alice").unwrap()).unwrap();
        let after = Utc::now().timestamp() as usize;

        assert_eq!(claims.sub, "alice");
        assert!(claims.exp >= before + 30 * 60);
        assert!(claims.exp <= after + 30 * 60);
    }

    #[test]
    fn test_token_expiration() {
        let tokens = service();
        let credentials = credentials_with("alice");

        let expired = tokens
            .issue_with_ttl("alice", Duration::minutes(-5))
            .unwrap();

        assert_eq!(
            tokens.verify(&expired, &credentials).unwrap_err(),
            AppError::invalid_credentials()
        );
    }

    #[test]
    fn test_token_expired_by_one_second_is_rejected() {
        let tokens = service();
        let credentials = credentials_with("alice");

        let claims = Claims {
            sub: "alice".into(),
            exp: (Utc::now().timestamp() - 1) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(tokens.verify(&token, &credentials).is_err());
    }

    #[test]
    fn test_invalid_token_signature() {
        let credentials = credentials_with("alice");
        let forged = TokenService::new("a_completely_different_secret", Duration::minutes(30))
            .issue("alice")
            .unwrap();

        assert_eq!(
            service().verify(&forged, &credentials).unwrap_err(),
            AppError::invalid_credentials()
        );
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let tokens = service();
        let credentials = credentials_with("alice");
        credentials.register("mallory", "pw").unwrap();

        let token = tokens.issue("mallory").unwrap();
        let other = tokens.issue("alice").unwrap();

        // Splice alice's payload onto mallory's signature.
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert!(tokens.verify(&spliced, &credentials).is_err());
    }

    #[test]
    fn test_malformed_token_is_rejected() {
        let credentials = credentials_with("alice");
        for garbage in ["", "not-a-token", "a.b.c"] {
            assert_eq!(
                service().verify(garbage, &credentials).unwrap_err(),
                AppError::invalid_credentials()
            );
        }
    }

    #[test]
    fn test_unknown_subject_is_rejected() {
        let tokens = service();
        let credentials = credentials_with("alice");

        let token = tokens.issue("ghost").unwrap();
        assert_eq!(
            tokens.verify(&token, &credentials).unwrap_err(),
            AppError::invalid_credentials()
        );
    }
}
