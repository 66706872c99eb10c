use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::types::{CurrentUser, Role, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Fails when the expiry lies outside the representable time range
    pub fn new(user: &CurrentUser, expiry_hours: u64) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                JwtError::TokenGeneration(format!("expiry of {} hours is out of range", expiry_hours))
            })?
            .timestamp();

        Ok(Self {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
            exp,
            iat: now.timestamp(),
        })
    }
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            username: claims.username,
            role: claims.role,
        }
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidToken(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidToken(msg) => write!(f, "Invalid JWT token: {}", msg),
            JwtError::InvalidSecret => write!(f, "JWT secret not configured"),
        }
    }
}

impl std::error::Error for JwtError {}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> CurrentUser {
        CurrentUser {
            id: 7,
            username: "alice".into(),
            role: Role::Editor,
        }
    }

    #[test]
    fn token_round_trips_user() {
        let token = generate_jwt(&Claims::new(&alice(), 1).unwrap(), "secret").unwrap();
        let claims = validate_jwt(&token, "secret").unwrap();
        assert_eq!(CurrentUser::from(claims), alice());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_jwt(&Claims::new(&alice(), 1).unwrap(), "secret").unwrap();
        assert!(matches!(validate_jwt(&token, "other"), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(
            generate_jwt(&Claims::new(&alice(), 1).unwrap(), ""),
            Err(JwtError::InvalidSecret)
        ));
    }

    #[test]
    fn oversized_expiry_is_an_error() {
        assert!(matches!(
            Claims::new(&alice(), u64::MAX),
            Err(JwtError::TokenGeneration(_))
        ));
        assert!(matches!(
            Claims::new(&alice(), i64::MAX as u64),
            Err(JwtError::TokenGeneration(_))
        ));
    }
}
