use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use super::{ValidJson, ValidQuery};
use crate::{
    error::{ApiError, ApiResult},
    middleware::{AdminUser, AuthUser},
    models::{
        Airplane, Crew, Flight, FlightFilter, FlightListItem, Route, RouteDetail, TakenPlace, Ticket,
    },
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/flights", get(list_flights).post(create_flight))
        .route("/flights/{id}", get(get_flight))
}

#[derive(Debug, Deserialize)]
pub struct FlightsQuery {
    pub route: Option<i64>,
    pub airplane: Option<i64>,
    pub departure_after: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFlightRequest {
    pub route: i64,
    pub airplane: i64,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    #[serde(default)]
    pub crew: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct FlightDetailResponse {
    pub id: i64,
    pub route: RouteDetail,
    pub airplane: Airplane,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub tickets_available: i64,
    pub crew: Vec<Crew>,
    pub taken_places: Vec<TakenPlace>,
}

/// Нижняя граница времени вылета: RFC 3339, либо дата/время без зоны (UTC),
/// либо просто дата (с полуночи UTC).
pub fn parse_departure_after(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(ApiError::validation(
        "departure_after",
        format!("'{raw}' is not a valid ISO-8601 date or datetime"),
    ))
}

// GET /api/flights?route=1&airplane=2&departure_after=2025-03-01T10:00:00Z
async fn list_flights(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    ValidQuery(params): ValidQuery<FlightsQuery>,
) -> ApiResult<Json<Vec<FlightListItem>>> {
    let filter = FlightFilter {
        route: params.route,
        airplane: params.airplane,
        departure_after: params
            .departure_after
            .as_deref()
            .map(parse_departure_after)
            .transpose()?,
    };

    Ok(Json(Flight::list(&state.db.pool, &filter).await?))
}

// GET /api/flights/{id}
async fn get_flight(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<FlightDetailResponse>> {
    let pool = &state.db.pool;
    let flight = Flight::find_summary(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Flight", id))?;

    // Вложенные данные грузим параллельно
    let (route, airplane, crew, taken_places) = futures::try_join!(
        Route::find_detail(pool, flight.route_id),
        Airplane::find(pool, flight.airplane_id),
        Crew::for_flight(pool, id),
        Ticket::taken_places(pool, id),
    )?;

    let route = route.ok_or_else(|| ApiError::not_found("Route", flight.route_id))?;
    let airplane = airplane.ok_or_else(|| ApiError::not_found("Airplane", flight.airplane_id))?;

    Ok(Json(FlightDetailResponse {
        id: flight.id,
        route,
        airplane,
        departure_time: flight.departure_time,
        arrival_time: flight.arrival_time,
        tickets_available: flight.tickets_available,
        crew,
        taken_places,
    }))
}

// POST /api/flights
async fn create_flight(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ValidJson(req): ValidJson<CreateFlightRequest>,
) -> ApiResult<(StatusCode, Json<Flight>)> {
    let mut tx = state.db.pool.begin().await?;

    let flight = Flight::insert(
        &mut *tx,
        req.route,
        req.airplane,
        req.departure_time,
        req.arrival_time,
        &req.crew,
    )
    .await
    .map_err(flight_constraint)?;

    tx.commit().await?;

    tracing::info!(flight_id = flight.id, crew = flight.crew.len(), "flight created");
    Ok((StatusCode::CREATED, Json(flight)))
}

// Нарушения могут прийти и из flights, и из flight_crew
fn flight_constraint(err: sqlx::Error) -> ApiError {
    let in_crew_table = matches!(
        &err,
        sqlx::Error::Database(db) if db.table() == Some("flight_crew")
    );
    if in_crew_table {
        return ApiError::from_constraint(err, "flight_crew");
    }
    match ApiError::from_constraint(err, "flights") {
        ApiError::Validation { field, .. } if field == "non_field_errors" => ApiError::validation(
            "non_field_errors",
            "The fields route, airplane must make a unique set.",
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn departure_after_accepts_rfc3339_with_offset() {
        let dt = parse_departure_after("2025-03-01T12:00:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn departure_after_accepts_naive_datetime_and_date() {
        assert_eq!(
            parse_departure_after("2025-03-01T08:30:00").unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap()
        );
        assert_eq!(
            parse_departure_after("2025-03-01").unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn departure_after_rejects_garbage() {
        let err = parse_departure_after("next tuesday").unwrap_err();
        assert!(matches!(err, ApiError::Validation { ref field, .. } if field == "departure_after"));
    }
}
