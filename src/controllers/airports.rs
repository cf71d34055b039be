use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use super::ValidJson;
use crate::{
    error::{ApiError, ApiResult},
    middleware::{AdminUser, AuthUser},
    models::Airport,
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/airports", get(list_airports).post(create_airport))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAirportRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub closest_big_city: String,
}

// GET /api/airports
async fn list_airports(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> ApiResult<Json<Vec<Airport>>> {
    Ok(Json(Airport::list(&state.db.pool).await?))
}

// POST /api/airports
async fn create_airport(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    ValidJson(req): ValidJson<CreateAirportRequest>,
) -> ApiResult<(StatusCode, Json<Airport>)> {
    let airport = Airport::insert(&state.db.pool, &req.name, &req.closest_big_city)
        .await
        .map_err(|e| ApiError::from_constraint(e, "airports"))?;

    tracing::info!(airport_id = airport.id, admin = admin.user_id, "airport created");
    Ok((StatusCode::CREATED, Json(airport)))
}
