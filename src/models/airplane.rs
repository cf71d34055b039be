use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

/// Сетка мест самолета: сколько рядов и сколько мест в ряду.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatGrid {
    pub rows: i32,
    pub seats_in_row: i32,
}

impl SeatGrid {
    pub fn new(rows: i32, seats_in_row: i32) -> Self {
        Self { rows, seats_in_row }
    }

    pub fn capacity(&self) -> i64 {
        i64::from(self.rows) * i64::from(self.seats_in_row)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
pub struct Airplane {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    #[sqlx(rename = "airplane_type_id")]
    pub airplane_type: i64,
    #[serde(skip)]
    pub image: Option<String>,
}

impl Airplane {
    pub fn grid(&self) -> SeatGrid {
        SeatGrid::new(self.rows, self.seats_in_row)
    }
}

// Проекция для списка: тип по имени, вместимость считается в SQL
#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
pub struct AirplaneListItem {
    pub id: i64,
    pub name: String,
    pub airplane_type: String,
    pub capacity: i64,
    pub image: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
pub struct AirplaneDetail {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    pub airplane_type: String,
    pub capacity: i64,
    pub image: Option<String>,
}

/// Фильтры списка самолетов (`?airplane_type=1&min_capacity=100`).
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AirplaneFilter {
    pub airplane_type: Option<i64>,
    pub min_capacity: Option<i64>,
}

const AIRPLANE_COLUMNS: &str = "id, name, rows, seats_in_row, airplane_type_id, image";

impl Airplane {
    pub async fn find<'e, E: PgExecutor<'e>>(db: E, id: i64) -> Result<Option<Airplane>, sqlx::Error> {
        sqlx::query_as::<_, Airplane>(&format!(
            "SELECT {AIRPLANE_COLUMNS} FROM airplanes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn insert<'e, E: PgExecutor<'e>>(
        db: E,
        name: &str,
        rows: i32,
        seats_in_row: i32,
        airplane_type: i64,
    ) -> Result<Airplane, sqlx::Error> {
        sqlx::query_as::<_, Airplane>(&format!(
            "INSERT INTO airplanes (name, rows, seats_in_row, airplane_type_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {AIRPLANE_COLUMNS}"
        ))
        .bind(name)
        .bind(rows)
        .bind(seats_in_row)
        .bind(airplane_type)
        .fetch_one(db)
        .await
    }

    pub async fn set_image<'e, E: PgExecutor<'e>>(
        db: E,
        id: i64,
        image: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE airplanes SET image = $1 WHERE id = $2")
            .bind(image)
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn list<'e, E: PgExecutor<'e>>(
        db: E,
        filter: &AirplaneFilter,
    ) -> Result<Vec<AirplaneListItem>, sqlx::Error> {
        let mut q = String::from(
            "SELECT a.id, a.name, t.name AS airplane_type,
                    a.rows::bigint * a.seats_in_row AS capacity, a.image
             FROM airplanes a
             JOIN airplane_types t ON t.id = a.airplane_type_id
             WHERE TRUE",
        );
        let mut bind_idx = 1;
        if filter.airplane_type.is_some() {
            q.push_str(&format!(" AND a.airplane_type_id = ${}", bind_idx));
            bind_idx += 1;
        }
        if filter.min_capacity.is_some() {
            q.push_str(&format!(" AND a.rows::bigint * a.seats_in_row >= ${}", bind_idx));
        }
        q.push_str(" ORDER BY a.id");

        let mut dbq = sqlx::query_as::<_, AirplaneListItem>(&q);
        if let Some(t) = filter.airplane_type { dbq = dbq.bind(t); }
        if let Some(c) = filter.min_capacity { dbq = dbq.bind(c); }

        dbq.fetch_all(db).await
    }

    pub async fn find_detail<'e, E: PgExecutor<'e>>(
        db: E,
        id: i64,
    ) -> Result<Option<AirplaneDetail>, sqlx::Error> {
        sqlx::query_as::<_, AirplaneDetail>(
            "SELECT a.id, a.name, a.rows, a.seats_in_row, t.name AS airplane_type,
                    a.rows::bigint * a.seats_in_row AS capacity, a.image
             FROM airplanes a
             JOIN airplane_types t ON t.id = a.airplane_type_id
             WHERE a.id = $1"
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }
}
