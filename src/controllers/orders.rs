use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::{collections::HashMap, sync::Arc};
use validator::Validate;

use super::ValidJson;
use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{Order, OrderWithTickets, Ticket},
    services::booking::{self, TicketRequest},
    AppState,
};

// Заказы видны и создаются только их владельцем; админских прав не нужно
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/tickets", post(add_ticket))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "an order must contain at least one ticket"))]
    pub tickets: Vec<TicketRequest>,
}

/// Раскладывает билеты по заказам, сохраняя порядок заказов.
pub fn group_tickets(orders: Vec<Order>, tickets: Vec<Ticket>) -> Vec<OrderWithTickets> {
    let mut by_order: HashMap<i64, Vec<Ticket>> = HashMap::with_capacity(orders.len());
    for ticket in tickets {
        by_order.entry(ticket.order).or_default().push(ticket);
    }

    orders
        .into_iter()
        .map(|order| {
            let tickets = by_order.remove(&order.id).unwrap_or_default();
            OrderWithTickets::new(order, tickets)
        })
        .collect()
}

// GET /api/orders
async fn list_orders(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<Vec<OrderWithTickets>>> {
    let pool = &state.db.pool;
    let orders = Order::list_for_user(pool, user.user_id).await?;
    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let tickets = Ticket::for_orders(pool, &ids).await?;

    Ok(Json(group_tickets(orders, tickets)))
}

// GET /api/orders/{id}
async fn get_order(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<OrderWithTickets>> {
    let pool = &state.db.pool;
    let order = Order::find_for_user(pool, id, user.user_id, false)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", id))?;
    let tickets = Ticket::for_orders(pool, &[order.id]).await?;

    Ok(Json(OrderWithTickets::new(order, tickets)))
}

// POST /api/orders
async fn create_order(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidJson(req): ValidJson<CreateOrderRequest>,
) -> ApiResult<(StatusCode, Json<OrderWithTickets>)> {
    let order = booking::create_order(&state.db, user.user_id, &req.tickets).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

// POST /api/orders/{id}/tickets
async fn add_ticket(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    ValidJson(req): ValidJson<TicketRequest>,
) -> ApiResult<(StatusCode, Json<Ticket>)> {
    let ticket = booking::add_ticket(&state.db, user.user_id, id, &req).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn order(id: i64, hour: u32) -> Order {
        Order {
            id,
            user_id: 1,
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap(),
        }
    }

    fn ticket(id: i64, order: i64) -> Ticket {
        Ticket { id, row: 1, seat: id as i32, flight: 1, order }
    }

    #[test]
    fn tickets_are_grouped_under_their_orders() {
        let grouped = group_tickets(
            vec![order(2, 12), order(1, 10)],
            vec![ticket(1, 1), ticket(2, 2), ticket(3, 1)],
        );

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].id, 2);
        assert_eq!(grouped[0].tickets.len(), 1);
        assert_eq!(grouped[1].id, 1);
        assert_eq!(
            grouped[1].tickets.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
    }

    #[test]
    fn order_without_tickets_gets_empty_list() {
        let grouped = group_tickets(vec![order(5, 9)], Vec::new());
        assert!(grouped[0].tickets.is_empty());
    }

    #[test]
    fn empty_ticket_list_fails_validation() {
        let req: CreateOrderRequest = serde_json::from_str(r#"{"tickets": []}"#).unwrap();
        assert!(req.validate().is_err());

        let req: CreateOrderRequest =
            serde_json::from_str(r#"{"tickets": [{"row": 1, "seat": 1, "flight": 1}]}"#).unwrap();
        assert!(req.validate().is_ok());
    }
}
