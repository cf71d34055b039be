use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct AirplaneType {
    pub id: i64,
    pub name: String,
}

impl AirplaneType {
    pub async fn list<'e, E: PgExecutor<'e>>(db: E) -> Result<Vec<AirplaneType>, sqlx::Error> {
        sqlx::query_as::<_, AirplaneType>("SELECT id, name FROM airplane_types ORDER BY id")
            .fetch_all(db)
            .await
    }

    pub async fn insert<'e, E: PgExecutor<'e>>(db: E, name: &str) -> Result<AirplaneType, sqlx::Error> {
        sqlx::query_as::<_, AirplaneType>(
            "INSERT INTO airplane_types (name) VALUES ($1) RETURNING id, name"
        )
        .bind(name)
        .fetch_one(db)
        .await
    }
}
