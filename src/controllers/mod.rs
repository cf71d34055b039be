pub mod airplane_types;
pub mod airplanes;
pub mod airports;
pub mod crews;
pub mod flights;
pub mod orders;
pub mod routes;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    Json, Router,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use validator::Validate;

use crate::{error::ApiError, AppState};

pub fn routes(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .merge(airports::routes())
        .merge(routes::routes())
        .merge(airplane_types::routes())
        .merge(airplanes::routes(max_upload_bytes))
        .merge(crews::routes())
        .merge(flights::routes())
        .merge(orders::routes())
}

/// JSON-тело, которое прошло и десериализацию, и `validator`.
/// Битый JSON - 400 с текстом ошибки, нарушение правил - 400 с именем поля.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| ApiError::BadRequest(e.body_text()))?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}

/// Query-строка фильтров; ошибка разбора - 400 в общем формате ответа.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| ApiError::BadRequest(e.body_text()))?;
        Ok(ValidQuery(value))
    }
}
