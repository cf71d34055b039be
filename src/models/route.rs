use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

use super::Airport;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Route {
    pub id: i64,
    #[sqlx(rename = "source_id")]
    pub source: i64,
    #[sqlx(rename = "destination_id")]
    pub destination: i64,
    pub distance: i32,
}

/// Маршрут с развернутыми аэропортами (для детального просмотра).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteDetail {
    pub id: i64,
    pub source: Airport,
    pub destination: Airport,
    pub distance: i32,
}

const ROUTE_COLUMNS: &str = "id, source_id, destination_id, distance";

impl Route {
    pub async fn list<'e, E: PgExecutor<'e>>(db: E) -> Result<Vec<Route>, sqlx::Error> {
        sqlx::query_as::<_, Route>(&format!("SELECT {ROUTE_COLUMNS} FROM routes ORDER BY id"))
            .fetch_all(db)
            .await
    }

    pub async fn insert<'e, E: PgExecutor<'e>>(
        db: E,
        source: i64,
        destination: i64,
        distance: i32,
    ) -> Result<Route, sqlx::Error> {
        sqlx::query_as::<_, Route>(&format!(
            "INSERT INTO routes (source_id, destination_id, distance)
             VALUES ($1, $2, $3)
             RETURNING {ROUTE_COLUMNS}"
        ))
        .bind(source)
        .bind(destination)
        .bind(distance)
        .fetch_one(db)
        .await
    }

    /// Маршрут вместе с обоими аэропортами одним запросом.
    pub async fn find_detail<'e, E: PgExecutor<'e>>(
        db: E,
        id: i64,
    ) -> Result<Option<RouteDetail>, sqlx::Error> {
        let row = sqlx::query_as::<_, (i64, i32, i64, String, String, i64, String, String)>(
            r#"
            SELECT r.id, r.distance,
                   s.id, s.name, s.closest_big_city,
                   d.id, d.name, d.closest_big_city
            FROM routes r
            JOIN airports s ON s.id = r.source_id
            JOIN airports d ON d.id = r.destination_id
            WHERE r.id = $1
            "#
        )
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(row.map(|(id, distance, sid, sname, scity, did, dname, dcity)| RouteDetail {
            id,
            source: Airport { id: sid, name: sname, closest_big_city: scity },
            destination: Airport { id: did, name: dname, closest_big_city: dcity },
            distance,
        }))
    }
}
