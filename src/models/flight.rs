use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgExecutor};
use std::collections::HashMap;

use super::SeatGrid;

// Свободные места = вместимость самолета минус выданные билеты.
// Считается при каждом чтении, нигде не хранится.
const TICKETS_AVAILABLE: &str = "a.rows::bigint * a.seats_in_row
        - (SELECT COUNT(*) FROM tickets t WHERE t.flight_id = f.id) AS tickets_available";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flight {
    pub id: i64,
    pub route: i64,
    pub airplane: i64,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub crew: Vec<i64>,
}

/// Строка списка рейсов: маршрут строкой, самолет по имени, экипаж полными именами.
#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
pub struct FlightListItem {
    pub id: i64,
    pub route: String,
    pub airplane: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub tickets_available: i64,
    pub crew: Vec<String>,
}

#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct FlightSummary {
    pub id: i64,
    pub route_id: i64,
    pub airplane_id: i64,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub tickets_available: i64,
}

#[derive(Debug, Default, Clone)]
pub struct FlightFilter {
    pub route: Option<i64>,
    pub airplane: Option<i64>,
    pub departure_after: Option<DateTime<Utc>>,
}

impl Flight {
    /// Создает рейс и привязывает экипаж. Вызывать внутри транзакции.
    pub async fn insert(
        conn: &mut PgConnection,
        route: i64,
        airplane: i64,
        departure_time: DateTime<Utc>,
        arrival_time: DateTime<Utc>,
        crew: &[i64],
    ) -> Result<Flight, sqlx::Error> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO flights (route_id, airplane_id, departure_time, arrival_time)
             VALUES ($1, $2, $3, $4)
             RETURNING id"
        )
        .bind(route)
        .bind(airplane)
        .bind(departure_time)
        .bind(arrival_time)
        .fetch_one(&mut *conn)
        .await?;

        let mut crew: Vec<i64> = crew.to_vec();
        crew.sort_unstable();
        crew.dedup();

        if !crew.is_empty() {
            sqlx::query(
                "INSERT INTO flight_crew (flight_id, crew_id)
                 SELECT $1, UNNEST($2::bigint[])"
            )
            .bind(id)
            .bind(&crew)
            .execute(&mut *conn)
            .await?;
        }

        Ok(Flight { id, route, airplane, departure_time, arrival_time, crew })
    }

    pub async fn list<'e, E: PgExecutor<'e>>(
        db: E,
        filter: &FlightFilter,
    ) -> Result<Vec<FlightListItem>, sqlx::Error> {
        let mut q = format!(
            r#"
            SELECT f.id,
                   s.name || '(' || s.closest_big_city || ') - ' || d.name AS route,
                   a.name AS airplane,
                   f.departure_time,
                   f.arrival_time,
                   {TICKETS_AVAILABLE},
                   ARRAY(
                       SELECT c.first_name || ' ' || c.last_name
                       FROM flight_crew fc
                       JOIN crews c ON c.id = fc.crew_id
                       WHERE fc.flight_id = f.id
                       ORDER BY c.id
                   ) AS crew
            FROM flights f
            JOIN routes r ON r.id = f.route_id
            JOIN airports s ON s.id = r.source_id
            JOIN airports d ON d.id = r.destination_id
            JOIN airplanes a ON a.id = f.airplane_id
            WHERE TRUE
            "#
        );
        let mut bind_idx = 1;
        if filter.route.is_some() {
            q.push_str(&format!(" AND f.route_id = ${}", bind_idx));
            bind_idx += 1;
        }
        if filter.airplane.is_some() {
            q.push_str(&format!(" AND f.airplane_id = ${}", bind_idx));
            bind_idx += 1;
        }
        if filter.departure_after.is_some() {
            q.push_str(&format!(" AND f.departure_time >= ${}", bind_idx));
        }
        q.push_str(" ORDER BY f.id");

        let mut dbq = sqlx::query_as::<_, FlightListItem>(&q);
        if let Some(r) = filter.route { dbq = dbq.bind(r); }
        if let Some(a) = filter.airplane { dbq = dbq.bind(a); }
        if let Some(dt) = filter.departure_after { dbq = dbq.bind(dt); }

        dbq.fetch_all(db).await
    }

    pub async fn find_summary<'e, E: PgExecutor<'e>>(
        db: E,
        id: i64,
    ) -> Result<Option<FlightSummary>, sqlx::Error> {
        sqlx::query_as::<_, FlightSummary>(&format!(
            "SELECT f.id, f.route_id, f.airplane_id, f.departure_time, f.arrival_time,
                    {TICKETS_AVAILABLE}
             FROM flights f
             JOIN airplanes a ON a.id = f.airplane_id
             WHERE f.id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Сетки мест самолетов для набора рейсов: flight_id -> (rows, seats_in_row).
    /// Рейсов, которых нет в БД, в ответе не будет.
    pub async fn seat_grids<'e, E: PgExecutor<'e>>(
        db: E,
        flight_ids: &[i64],
    ) -> Result<HashMap<i64, SeatGrid>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (i64, i32, i32)>(
            "SELECT f.id, a.rows, a.seats_in_row
             FROM flights f
             JOIN airplanes a ON a.id = f.airplane_id
             WHERE f.id = ANY($1)"
        )
        .bind(flight_ids)
        .fetch_all(db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, rows, seats_in_row)| (id, SeatGrid::new(rows, seats_in_row)))
            .collect())
    }
}
