use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use super::ValidJson;
use crate::{
    error::{ApiError, ApiResult},
    middleware::{AdminUser, AuthUser},
    models::{Route, RouteDetail},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/routes", get(list_routes).post(create_route))
        .route("/routes/{id}", get(get_route))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRouteRequest {
    pub source: i64,
    pub destination: i64,
    #[validate(range(min = 0, message = "distance must be a non-negative number"))]
    pub distance: i32,
}

async fn list_routes(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> ApiResult<Json<Vec<Route>>> {
    Ok(Json(Route::list(&state.db.pool).await?))
}

async fn get_route(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<RouteDetail>> {
    Route::find_detail(&state.db.pool, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Route", id))
}

async fn create_route(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidJson(req): ValidJson<CreateRouteRequest>,
) -> ApiResult<(StatusCode, Json<Route>)> {
    let route = Route::insert(&state.db.pool, req.source, req.destination, req.distance)
        .await
        .map_err(|e| ApiError::from_constraint(e, "routes"))?;
    Ok((StatusCode::CREATED, Json(route)))
}
