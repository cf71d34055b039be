pub mod token;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use base64::{engine::general_purpose, Engine as _};
use std::sync::Arc;

use crate::{error::ApiError, models::User, AppState};

/// Аутентифицированный пользователь (любая роль).
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
    pub is_staff: bool,
}

/// Пользователь с правами администратора (`is_staff`).
#[derive(Debug, Clone, PartialEq)]
pub struct AdminUser(pub AuthUser);

// Bearer JWT или Basic Auth. Нет заголовка или он битый - 401.
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            return bearer_user(token, &state.config.jwt.secret);
        }

        if let Some(encoded) = auth_header.strip_prefix("Basic ") {
            return basic_user(encoded, state).await;
        }

        Err(ApiError::Unauthorized)
    }
}

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_staff {
            tracing::debug!(user_id = user.user_id, "write access denied for non-admin");
            return Err(ApiError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}

fn bearer_user(token: &str, secret: &str) -> Result<AuthUser, ApiError> {
    let claims = token::verify(token.trim(), secret).map_err(|e| {
        tracing::debug!("bearer token rejected: {e}");
        ApiError::Unauthorized
    })?;

    Ok(AuthUser {
        user_id: claims.sub,
        email: claims.email,
        is_staff: claims.is_staff,
    })
}

async fn basic_user(encoded: &str, state: &AppState) -> Result<AuthUser, ApiError> {
    // Декодируем base64
    let decoded = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|_| ApiError::Unauthorized)?;

    let credentials = String::from_utf8(decoded).map_err(|_| ApiError::Unauthorized)?;

    // Разделяем email:password
    let (email, password) = credentials.split_once(':').ok_or(ApiError::Unauthorized)?;

    let user = User::find_active_by_email(email, &state.db)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !user.verify_password(password) {
        return Err(ApiError::Unauthorized);
    }

    Ok(AuthUser {
        user_id: user.id,
        email: user.email,
        is_staff: user.is_staff,
    })
}
