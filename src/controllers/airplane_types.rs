use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use super::ValidJson;
use crate::{
    error::ApiResult,
    middleware::{AdminUser, AuthUser},
    models::AirplaneType,
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/airplane_types", get(list_airplane_types).post(create_airplane_type))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAirplaneTypeRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

async fn list_airplane_types(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> ApiResult<Json<Vec<AirplaneType>>> {
    Ok(Json(AirplaneType::list(&state.db.pool).await?))
}

async fn create_airplane_type(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidJson(req): ValidJson<CreateAirplaneTypeRequest>,
) -> ApiResult<(StatusCode, Json<AirplaneType>)> {
    let airplane_type = AirplaneType::insert(&state.db.pool, &req.name).await?;
    Ok((StatusCode::CREATED, Json(airplane_type)))
}
