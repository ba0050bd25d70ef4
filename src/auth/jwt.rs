use chrono::{Duration, Utc};
use error_stack::{Report, ResultExt};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Role, User, UserId};

/// Claims carried by every access token.
///
/// The claim set is a snapshot of the account at login time; a token
/// outlives later profile edits until it expires.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Claims {
    pub sub: UserId,
    pub email: String,
    pub role: Role,
    pub admin_id: Option<UserId>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
#[error("failed to encode access token")]
pub struct EncodeTokenError;

impl Claims {
    #[must_use]
    pub fn generate(user: &User, expiry_secs: u64) -> Self {
        let now = Utc::now();
        Self {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            admin_id: user.admin_id,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expiry_secs as i64)).timestamp(),
        }
    }

    pub fn encode(&self, secret: &str) -> Result<String, Report<EncodeTokenError>> {
        let key = EncodingKey::from_secret(secret.as_bytes());
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), self, &key)
            .change_context(EncodeTokenError)
            .attach_printable("could not encode access token claims")
    }

    /// Decodes and validates a token.
    ///
    /// Key and validation rules are fixed at compile time, so every
    /// decoder failure is the token's fault: expired, tampered, signed
    /// with the wrong algorithm or plain garbage all come back as
    /// `None` and callers answer them uniformly.
    #[must_use]
    pub fn decode(token: &str, secret: &str) -> Option<Self> {
        let key = DecodingKey::from_secret(secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 30;
        validation.validate_exp = true;

        jsonwebtoken::decode::<Self>(token.trim(), &key, &validation)
            .map(|data| data.claims)
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    const SECRET: &str = "test-secret-do-not-reuse";

    fn sample_user(role: Role) -> User {
        User {
            id: UserId::new(),
            email: "grace@example.com".into(),
            password_hash: "salt$digest".into(),
            full_name: "Grace Hopper".into(),
            phone: None,
            role,
            admin_id: None,
            created_at: NaiveDateTime::default(),
            updated_at: None,
        }
    }

    #[test]
    fn round_trips_through_encode_and_decode() {
        let user = sample_user(Role::Admin);
        let claims = Claims::generate(&user, 3600);
        let token = claims.encode(SECRET).unwrap();
        let decoded = Claims::decode(&token, SECRET).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn rejects_a_token_signed_with_another_secret() {
        let user = sample_user(Role::User);
        let token = Claims::generate(&user, 3600).encode(SECRET).unwrap();
        assert_eq!(Claims::decode(&token, "another-secret"), None);
    }

    #[test]
    fn rejects_a_token_signed_with_another_algorithm() {
        let user = sample_user(Role::User);
        let claims = Claims::generate(&user, 3600);
        let key = EncodingKey::from_secret(SECRET.as_bytes());
        let token =
            jsonwebtoken::encode(&Header::new(Algorithm::HS384), &claims, &key).unwrap();
        assert_eq!(Claims::decode(&token, SECRET), None);
    }

    #[test]
    fn rejects_an_expired_token() {
        let user = sample_user(Role::User);
        let mut claims = Claims::generate(&user, 3600);
        claims.iat -= 7200;
        claims.exp -= 7200;
        let token = claims.encode(SECRET).unwrap();
        assert_eq!(Claims::decode(&token, SECRET), None);
    }

    #[test]
    fn rejects_garbage_tokens() {
        assert_eq!(Claims::decode("definitely.not.a-jwt", SECRET), None);
        assert_eq!(Claims::decode("", SECRET), None);
    }
}
