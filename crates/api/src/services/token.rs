//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs valid for seven days. There is no revocation
//! list; logout is a client-side discard of the token.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use clementine_core::{Email, Role};

use crate::models::Identity;

/// Token validity window.
const TOKEN_TTL_DAYS: i64 = 7;

/// Claims carried inside an issued token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User ID, stringified.
    sub: String,
    email: String,
    role: Role,
    iat: i64,
    exp: i64,
}

/// Errors from token issuance.
#[derive(Debug, thiserror::Error)]
#[error("token encoding failed")]
pub struct TokenEncodeError(#[from] jsonwebtoken::errors::Error);

/// Issues and verifies bearer tokens with a shared HS256 secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Build a token service from the configured signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Issue a token for the given identity, valid for seven days.
    ///
    /// # Errors
    ///
    /// Returns `TokenEncodeError` if serialization or signing fails.
    pub fn issue(
        &self,
        user_id: clementine_core::UserId,
        email: &Email,
        role: Role,
    ) -> Result<String, TokenEncodeError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.as_str().to_owned(),
            role,
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };
        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verify a token and recover the identity it was issued for.
    ///
    /// Expired, malformed, and wrongly-signed tokens all return `None`;
    /// callers cannot distinguish why a token was rejected.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<Identity> {
        let data =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation).ok()?;
        let user_id = data.claims.sub.parse().ok()?;
        let email = Email::parse(&data.claims.email).ok()?;
        Some(Identity {
            user_id,
            email,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use clementine_core::UserId;

    fn service(secret: &str) -> TokenService {
        TokenService::new(&SecretString::from(secret.to_owned()))
    }

    fn email() -> Email {
        Email::parse("someone@example.com").unwrap()
    }

    #[test]
    fn test_issue_then_verify_roundtrip() {
        let svc = service("a-test-secret-that-is-long-enough!");
        let token = svc.issue(UserId::new(42), &email(), Role::Admin).unwrap();

        let identity = svc.verify(&token).unwrap();
        assert_eq!(identity.user_id, UserId::new(42));
        assert_eq!(identity.email.as_str(), "someone@example.com");
        assert_eq!(identity.role, Role::Admin);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = service("a-test-secret-that-is-long-enough!");
        let verifier = service("a-different-secret-entirely-here!!");
        let token = issuer.issue(UserId::new(1), &email(), Role::User).unwrap();

        assert!(verifier.verify(&token).is_none());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let svc = service("a-test-secret-that-is-long-enough!");
        let token = svc.issue(UserId::new(1), &email(), Role::User).unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('A') { 'B' } else { 'A' });

        assert!(svc.verify(&tampered).is_none());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let svc = service("a-test-secret-that-is-long-enough!");
        assert!(svc.verify("not-a-token").is_none());
        assert!(svc.verify("").is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let svc = service("a-test-secret-that-is-long-enough!");
        let past = Utc::now() - Duration::hours(2);
        let claims = Claims {
            sub: "1".to_owned(),
            email: "someone@example.com".to_owned(),
            role: Role::User,
            iat: past.timestamp(),
            exp: (past + Duration::hours(1)).timestamp(),
        };
        let token =
            jsonwebtoken::encode(&Header::default(), &claims, &svc.encoding_key).unwrap();

        assert!(svc.verify(&token).is_none());
    }
}
