use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use super::ValidJson;
use crate::{
    error::ApiResult,
    middleware::{AdminUser, AuthUser},
    models::Crew,
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/crews", get(list_crews).post(create_crew))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCrewRequest {
    #[validate(length(min = 1, max = 255))]
    pub first_name: String,
    #[validate(length(min = 1, max = 255))]
    pub last_name: String,
}

async fn list_crews(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> ApiResult<Json<Vec<Crew>>> {
    Ok(Json(Crew::list(&state.db.pool).await?))
}

async fn create_crew(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidJson(req): ValidJson<CreateCrewRequest>,
) -> ApiResult<(StatusCode, Json<Crew>)> {
    let crew = Crew::insert(&state.db.pool, &req.first_name, &req.last_name).await?;
    tracing::info!(crew_id = crew.id, "crew member created: {}", crew.full_name());
    Ok((StatusCode::CREATED, Json(crew)))
}
