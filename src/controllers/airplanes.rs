use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use super::{ValidJson, ValidQuery};
use crate::{
    error::{ApiError, ApiResult},
    middleware::{AdminUser, AuthUser},
    models::{Airplane, AirplaneDetail, AirplaneFilter, AirplaneListItem},
    services::media::{self, MediaStorage},
    AppState,
};

// Обновление и удаление самолетов не поддерживаются: роутер сам ответит 405
pub fn routes(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/airplanes", get(list_airplanes).post(create_airplane))
        .route("/airplanes/{id}", get(get_airplane))
        .route(
            "/airplanes/{id}/upload-image",
            // запас сверху на служебные части multipart
            post(upload_image).layer(DefaultBodyLimit::max(max_upload_bytes + 64 * 1024)),
        )
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAirplaneRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(range(min = 1, max = 500, message = "rows must be between 1 and 500"))]
    pub rows: i32,
    #[validate(range(min = 1, max = 50, message = "seats_in_row must be between 1 and 50"))]
    pub seats_in_row: i32,
    pub airplane_type: i64,
}

#[derive(Debug, Serialize)]
pub struct AirplaneImageResponse {
    pub id: i64,
    pub image: String,
}

fn public_image(image: Option<String>) -> Option<String> {
    image.map(|path| MediaStorage::url_for(&path))
}

// GET /api/airplanes?airplane_type=1&min_capacity=100
async fn list_airplanes(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    ValidQuery(filter): ValidQuery<AirplaneFilter>,
) -> ApiResult<Json<Vec<AirplaneListItem>>> {
    let airplanes = Airplane::list(&state.db.pool, &filter)
        .await?
        .into_iter()
        .map(|a| AirplaneListItem { image: public_image(a.image), ..a })
        .collect();
    Ok(Json(airplanes))
}

// GET /api/airplanes/{id}
async fn get_airplane(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<AirplaneDetail>> {
    let airplane = Airplane::find_detail(&state.db.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Airplane", id))?;
    Ok(Json(AirplaneDetail { image: public_image(airplane.image), ..airplane }))
}

// POST /api/airplanes
async fn create_airplane(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidJson(req): ValidJson<CreateAirplaneRequest>,
) -> ApiResult<(StatusCode, Json<Airplane>)> {
    let airplane = Airplane::insert(
        &state.db.pool,
        &req.name,
        req.rows,
        req.seats_in_row,
        req.airplane_type,
    )
    .await
    .map_err(|e| ApiError::from_constraint(e, "airplanes"))?;

    tracing::info!(
        airplane_id = airplane.id,
        capacity = airplane.grid().capacity(),
        "airplane created"
    );
    Ok((StatusCode::CREATED, Json(airplane)))
}

// POST /api/airplanes/{id}/upload-image (multipart, поле `image`)
async fn upload_image(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<Json<AirplaneImageResponse>> {
    // 1. Достаем файл из multipart и проверяем до похода в БД
    let mut data: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("image") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Read error: {e}")))?;
            data = Some(bytes.to_vec());
            break;
        }
    }

    let data = data.ok_or_else(|| ApiError::validation("image", "No file was submitted."))?;
    let checked = media::check_image(data, state.config.media.max_upload_bytes)?;

    // 2. Самолет должен существовать
    let airplane = Airplane::find(&state.db.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Airplane", id))?;

    // 3. Пишем файл и путь
    let relative = state
        .media
        .save_airplane_image(&airplane.name, &checked)
        .await
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e).context("failed to store image")))?;

    Airplane::set_image(&state.db.pool, id, &relative).await?;

    Ok(Json(AirplaneImageResponse { id, image: MediaStorage::url_for(&relative) }))
}
