use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgExecutor};

use super::Ticket;

#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
pub struct Order {
    pub id: i64,
    #[serde(skip)]
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Заказ вместе с билетами - так он отдается клиенту.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderWithTickets {
    pub id: i64,
    pub tickets: Vec<Ticket>,
    pub created_at: DateTime<Utc>,
}

impl OrderWithTickets {
    pub fn new(order: Order, tickets: Vec<Ticket>) -> Self {
        Self { id: order.id, tickets, created_at: order.created_at }
    }
}

impl Order {
    pub async fn insert<'e, E: PgExecutor<'e>>(db: E, user_id: i64) -> Result<Order, sqlx::Error> {
        sqlx::query_as::<_, Order>(
            "INSERT INTO orders (user_id) VALUES ($1) RETURNING id, user_id, created_at"
        )
        .bind(user_id)
        .fetch_one(db)
        .await
    }

    // Новые заказы первыми
    pub async fn list_for_user<'e, E: PgExecutor<'e>>(db: E, user_id: i64) -> Result<Vec<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>(
            "SELECT id, user_id, created_at FROM orders
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    /// Заказ пользователя; чужой заказ выглядит как несуществующий.
    /// `FOR UPDATE` держит строку заказа до конца транзакции.
    pub async fn find_for_user<'e, E: PgExecutor<'e>>(
        db: E,
        id: i64,
        user_id: i64,
        lock: bool,
    ) -> Result<Option<Order>, sqlx::Error> {
        let mut q = String::from(
            "SELECT id, user_id, created_at FROM orders WHERE id = $1 AND user_id = $2"
        );
        if lock {
            q.push_str(" FOR UPDATE");
        }
        sqlx::query_as::<_, Order>(&q)
            .bind(id)
            .bind(user_id)
            .fetch_optional(db)
            .await
    }
}
