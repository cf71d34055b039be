use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use std::collections::HashSet;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    #[sqlx(rename = "flight_id")]
    pub flight: i64,
    #[sqlx(rename = "order_id")]
    pub order: i64,
}

/// Занятое место на рейсе (ряд + кресло).
#[derive(Debug, Clone, Copy, FromRow, Serialize, PartialEq, Eq, Hash)]
pub struct TakenPlace {
    pub row: i32,
    pub seat: i32,
}

// "row" - ключевое слово SQL, поэтому в кавычках
const TICKET_COLUMNS: &str = r#"id, "row", seat, flight_id, order_id"#;

impl Ticket {
    pub async fn insert<'e, E: PgExecutor<'e>>(
        db: E,
        order_id: i64,
        flight_id: i64,
        row: i32,
        seat: i32,
    ) -> Result<Ticket, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(&format!(
            r#"INSERT INTO tickets ("row", seat, flight_id, order_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {TICKET_COLUMNS}"#
        ))
        .bind(row)
        .bind(seat)
        .bind(flight_id)
        .bind(order_id)
        .fetch_one(db)
        .await
    }

    pub async fn for_orders<'e, E: PgExecutor<'e>>(
        db: E,
        order_ids: &[i64],
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE order_id = ANY($1) ORDER BY id"
        ))
        .bind(order_ids)
        .fetch_all(db)
        .await
    }

    pub async fn taken_places<'e, E: PgExecutor<'e>>(
        db: E,
        flight_id: i64,
    ) -> Result<Vec<TakenPlace>, sqlx::Error> {
        sqlx::query_as::<_, TakenPlace>(
            r#"SELECT "row", seat FROM tickets WHERE flight_id = $1 ORDER BY "row", seat"#
        )
        .bind(flight_id)
        .fetch_all(db)
        .await
    }

    /// Все занятые места на указанных рейсах как множество (flight_id, row, seat).
    pub async fn taken_seats<'e, E: PgExecutor<'e>>(
        db: E,
        flight_ids: &[i64],
    ) -> Result<HashSet<(i64, i32, i32)>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (i64, i32, i32)>(
            r#"SELECT flight_id, "row", seat FROM tickets WHERE flight_id = ANY($1)"#
        )
        .bind(flight_ids)
        .fetch_all(db)
        .await?;

        Ok(rows.into_iter().collect())
    }
}
