use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Airport {
    pub id: i64,
    pub name: String,
    pub closest_big_city: String,
}

impl Airport {
    pub async fn list<'e, E: PgExecutor<'e>>(db: E) -> Result<Vec<Airport>, sqlx::Error> {
        sqlx::query_as::<_, Airport>(
            "SELECT id, name, closest_big_city FROM airports ORDER BY id"
        )
        .fetch_all(db)
        .await
    }

    pub async fn insert<'e, E: PgExecutor<'e>>(
        db: E,
        name: &str,
        closest_big_city: &str,
    ) -> Result<Airport, sqlx::Error> {
        sqlx::query_as::<_, Airport>(
            "INSERT INTO airports (name, closest_big_city)
             VALUES ($1, $2)
             RETURNING id, name, closest_big_city"
        )
        .bind(name)
        .bind(closest_big_city)
        .fetch_one(db)
        .await
    }
}
