use crate::error::{Error, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload: the subject is the user id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Issue an HS256 access token for a user
pub fn create_access_token(
    secret: &str,
    user_id: Uuid,
    expire_minutes: i64,
) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(expire_minutes)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Token encoding failed: {e}")))
}

/// Decode and validate a token, returning the user id it was issued for
pub fn decode_access_token(secret: &str, token: &str) -> Result<Uuid> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| Error::Auth("Invalid or expired token".to_string()))?;

    Uuid::parse_str(&data.claims.sub)
        .map_err(|_| Error::Auth("Invalid token subject".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-16-chars";

    #[test]
    fn test_token_round_trip() {
        let user_id = Uuid::new_v4();
        let token = create_access_token(SECRET, user_id, 60).unwrap();
        let decoded = decode_access_token(SECRET, &token).unwrap();
        assert_eq!(decoded, user_id);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_access_token(SECRET, Uuid::new_v4(), 60).unwrap();
        assert!(decode_access_token("a-different-secret-key", &token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = create_access_token(SECRET, Uuid::new_v4(), -10).unwrap();
        assert!(decode_access_token(SECRET, &token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(decode_access_token(SECRET, "not.a.token").is_err());
    }
}
