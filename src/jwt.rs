//! Access token signing and verification (HS256)

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Sign an access token for `user_id` valid for the configured lifetime
pub fn sign_access_token(
    user_id: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(config.access_token_expiration)).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.access_token_secret.as_bytes()),
    )
}

/// Check signature and expiry, returning the claims
pub fn verify_access_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.access_token_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            access_token_secret: "test-secret".to_string(),
            access_token_expiration: 3600,
        }
    }

    #[test]
    fn test_sign_and_verify() {
        let token = sign_access_token("6633221100", &config()).unwrap();
        assert!(!token.is_empty());

        let claims = verify_access_token(&token, &config()).unwrap();
        assert_eq!(claims.sub, "6633221100");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign_access_token("6633221100", &config()).unwrap();
        let other = JwtConfig {
            access_token_secret: "another-secret".to_string(),
            ..config()
        };
        assert!(verify_access_token(&token, &other).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let expired = JwtConfig {
            access_token_expiration: -60,
            ..config()
        };
        let token = sign_access_token("6633221100", &expired).unwrap();
        assert!(verify_access_token(&token, &config()).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(verify_access_token("not.a.token", &config()).is_err());
    }
}
