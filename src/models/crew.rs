use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Crew {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl Crew {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub async fn list<'e, E: PgExecutor<'e>>(db: E) -> Result<Vec<Crew>, sqlx::Error> {
        sqlx::query_as::<_, Crew>("SELECT id, first_name, last_name FROM crews ORDER BY id")
            .fetch_all(db)
            .await
    }

    pub async fn insert<'e, E: PgExecutor<'e>>(
        db: E,
        first_name: &str,
        last_name: &str,
    ) -> Result<Crew, sqlx::Error> {
        sqlx::query_as::<_, Crew>(
            "INSERT INTO crews (first_name, last_name)
             VALUES ($1, $2)
             RETURNING id, first_name, last_name"
        )
        .bind(first_name)
        .bind(last_name)
        .fetch_one(db)
        .await
    }

    pub async fn for_flight<'e, E: PgExecutor<'e>>(db: E, flight_id: i64) -> Result<Vec<Crew>, sqlx::Error> {
        sqlx::query_as::<_, Crew>(
            "SELECT c.id, c.first_name, c.last_name
             FROM crews c
             JOIN flight_crew fc ON fc.crew_id = c.id
             WHERE fc.flight_id = $1
             ORDER BY c.id"
        )
        .bind(flight_id)
        .fetch_all(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_joins_first_and_last() {
        let crew = Crew { id: 1, first_name: "John".into(), last_name: "Doe".into() };
        assert_eq!(crew.full_name(), "John Doe");
    }
}
