//! Проверка JWT. Токены выпускает внешний сервис авторизации с общим
//! секретом (HS256); здесь только декодирование и валидация `exp`.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// ID пользователя
    pub sub: i64,
    pub email: String,
    #[serde(default)]
    pub is_staff: bool,
    /// Время истечения (unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i64, email: impl Into<String>, is_staff: bool, ttl: Duration) -> Self {
        Self {
            sub: user_id,
            email: email.into(),
            is_staff,
            exp: (Utc::now() + ttl).timestamp(),
        }
    }
}

pub fn verify(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
}

/// Подписывает claims тем же секретом. Нужен для тестов и служебных утилит.
pub fn sign(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}
