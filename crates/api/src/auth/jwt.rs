//! HS256 access tokens.
//!
//! Tokens are issued by the identity service in front of rollcall; the server
//! only verifies them and reads the acting user id. Minting is kept for
//! operators and integration tests.

use jsonwebtoken::errors::Error as JwtError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rollcall_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::config::env_or;

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Owning user's database id.
    pub sub: DbId,
    /// Unix seconds.
    pub exp: i64,
    /// Unix seconds.
    pub iat: i64,
}

impl Claims {
    fn for_user(user_id: DbId, lifetime_mins: i64) -> Self {
        let iat = chrono::Utc::now().timestamp();
        Self {
            sub: user_id,
            exp: iat + lifetime_mins * 60,
            iat,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Lifetime of tokens minted by [`generate_access_token`].
    pub access_token_expiry_mins: i64,
}

impl JwtConfig {
    /// | Env Var                  | Required | Default |
    /// |--------------------------|----------|---------|
    /// | `JWT_SECRET`             | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS` | no       | `60`    |
    ///
    /// # Panics
    ///
    /// If `JWT_SECRET` is missing or blank.
    pub fn from_env() -> Self {
        let secret = env_or("JWT_SECRET", String::new());
        assert!(
            !secret.trim().is_empty(),
            "JWT_SECRET must be set to a non-empty value"
        );

        Self {
            secret,
            access_token_expiry_mins: env_or("JWT_ACCESS_EXPIRY_MINS", DEFAULT_ACCESS_EXPIRY_MINS),
        }
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.secret.as_bytes())
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.as_bytes())
    }
}

pub fn generate_access_token(user_id: DbId, config: &JwtConfig) -> Result<String, JwtError> {
    let claims = Claims::for_user(user_id, config.access_token_expiry_mins);
    encode(&Header::default(), &claims, &config.encoding_key())
}

/// Check signature and `exp`, then hand back the claims.
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, JwtError> {
    decode::<Claims>(token, &config.decoding_key(), &Validation::default())
        .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            access_token_expiry_mins: 15,
        }
    }

    #[test]
    fn minted_token_round_trips_user_id() {
        let cfg = config("unit-test-secret");
        let token = generate_access_token(42, &cfg).unwrap();

        let claims = validate_token(&token, &cfg).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn token_past_leeway_is_rejected() {
        let cfg = config("unit-test-secret");
        // Default leeway is 60s.
        let stale = Claims::for_user(1, -10);
        let token = encode(&Header::default(), &stale, &cfg.encoding_key()).unwrap();

        assert!(validate_token(&token, &cfg).is_err());
    }

    #[test]
    fn wrong_secret_or_malformed_token_is_rejected() {
        let token = generate_access_token(7, &config("first-secret")).unwrap();
        assert!(validate_token(&token, &config("second-secret")).is_err());
        assert!(validate_token("not.a.jwt", &config("first-secret")).is_err());
    }
}
