//! booking.rs
//!
//! Бизнес-логика продажи билетов.
//!
//! 1.  **validate_ticket**: чистая проверка, что ряд и кресло попадают в сетку
//!     мест самолета. Вызывается явно, до любой записи в БД.
//! 2.  **create_order**: один заказ и N билетов в одной транзакции. Любая
//!     ошибка валидации или занятое место откатывает весь заказ.
//! 3.  **add_ticket**: прямая запись одного билета в уже существующий заказ
//!     с той же проверкой.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    database::Database,
    error::ApiError,
    models::{Flight, Order, OrderWithTickets, SeatGrid, Ticket},
};

/// Ряд или кресло вне сетки мест самолета.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TicketValidationError {
    #[error("row number must be in available range: (1, rows): (1, {max})")]
    RowOutOfRange { row: i32, max: i32 },

    #[error("seat number must be in available range: (1, seats_in_row): (1, {max})")]
    SeatOutOfRange { seat: i32, max: i32 },
}

impl TicketValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            TicketValidationError::RowOutOfRange { .. } => "row",
            TicketValidationError::SeatOutOfRange { .. } => "seat",
        }
    }
}

/// Проверяет место против сетки самолета. Ряд проверяется первым.
pub fn validate_ticket(row: i32, seat: i32, airplane: &SeatGrid) -> Result<(), TicketValidationError> {
    if !(1..=airplane.rows).contains(&row) {
        return Err(TicketValidationError::RowOutOfRange { row, max: airplane.rows });
    }
    if !(1..=airplane.seats_in_row).contains(&seat) {
        return Err(TicketValidationError::SeatOutOfRange { seat, max: airplane.seats_in_row });
    }
    Ok(())
}

/// Один билет из запроса на заказ. Диапазоны ряда и кресла проверяет
/// `validate_ticket`, здесь только форма тела.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TicketRequest {
    pub row: i32,
    pub seat: i32,
    pub flight: i64,
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("an order must contain at least one ticket")]
    EmptyOrder,

    #[error("flight {0} does not exist")]
    UnknownFlight(i64),

    #[error(transparent)]
    InvalidSeat(#[from] TicketValidationError),

    #[error("seat ({row}, {seat}) on flight {flight} is already taken")]
    SeatTaken { flight: i64, row: i32, seat: i32 },

    #[error("seat ({row}, {seat}) on flight {flight} is requested more than once")]
    DuplicateSeat { flight: i64, row: i32, seat: i32 },

    #[error("order {0} not found")]
    OrderNotFound(i64),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::EmptyOrder => ApiError::validation("tickets", err.to_string()),
            BookingError::UnknownFlight(_) => ApiError::validation("flight", err.to_string()),
            BookingError::InvalidSeat(e) => e.into(),
            BookingError::SeatTaken { .. } | BookingError::DuplicateSeat { .. } => {
                ApiError::validation("seat", err.to_string())
            }
            BookingError::OrderNotFound(id) => ApiError::not_found("Order", id),
            BookingError::Database(e) => ApiError::Database(e),
        }
    }
}

/// Проверка всего пакета билетов до записи: рейс существует, место в сетке,
/// место не занято и не повторяется внутри пакета.
pub fn check_tickets(
    requests: &[TicketRequest],
    grids: &HashMap<i64, SeatGrid>,
    taken: &HashSet<(i64, i32, i32)>,
) -> Result<(), BookingError> {
    if requests.is_empty() {
        return Err(BookingError::EmptyOrder);
    }

    let mut seen = HashSet::with_capacity(requests.len());
    for r in requests {
        let grid = grids.get(&r.flight).ok_or(BookingError::UnknownFlight(r.flight))?;
        validate_ticket(r.row, r.seat, grid)?;

        let key = (r.flight, r.row, r.seat);
        if taken.contains(&key) {
            return Err(BookingError::SeatTaken { flight: r.flight, row: r.row, seat: r.seat });
        }
        if !seen.insert(key) {
            return Err(BookingError::DuplicateSeat { flight: r.flight, row: r.row, seat: r.seat });
        }
    }
    Ok(())
}

// Гонка на одно место ловится уникальным индексом (flight_id, row, seat)
fn seat_conflict(err: sqlx::Error, r: &TicketRequest) -> BookingError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return BookingError::SeatTaken { flight: r.flight, row: r.row, seat: r.seat };
        }
    }
    BookingError::Database(err)
}

fn distinct_flights(requests: &[TicketRequest]) -> Vec<i64> {
    let mut ids: Vec<i64> = requests.iter().map(|r| r.flight).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Создает заказ пользователя со всеми билетами атомарно.
pub async fn create_order(
    db: &Database,
    user_id: i64,
    requests: &[TicketRequest],
) -> Result<OrderWithTickets, BookingError> {
    if requests.is_empty() {
        return Err(BookingError::EmptyOrder);
    }

    let flight_ids = distinct_flights(requests);

    // Начинаем транзакцию; при любой ошибке ниже она откатывается при drop
    let mut tx = db.pool.begin().await?;

    // 1. Проверяем все билеты до первой записи
    let grids = Flight::seat_grids(&mut *tx, &flight_ids).await?;
    let taken = Ticket::taken_seats(&mut *tx, &flight_ids).await?;
    if let Err(e) = check_tickets(requests, &grids, &taken) {
        warn!(user_id, error = %e, "order rejected");
        return Err(e);
    }

    // 2. Заказ и билеты
    let order = Order::insert(&mut *tx, user_id).await?;
    let mut tickets = Vec::with_capacity(requests.len());
    for r in requests {
        let ticket = Ticket::insert(&mut *tx, order.id, r.flight, r.row, r.seat)
            .await
            .map_err(|e| seat_conflict(e, r))?;
        tickets.push(ticket);
    }

    // 3. Коммитим
    tx.commit().await?;

    info!(order_id = order.id, user_id, tickets = tickets.len(), "order created");
    Ok(OrderWithTickets::new(order, tickets))
}

/// Добавляет один билет в существующий заказ пользователя.
pub async fn add_ticket(
    db: &Database,
    user_id: i64,
    order_id: i64,
    request: &TicketRequest,
) -> Result<Ticket, BookingError> {
    let mut tx = db.pool.begin().await?;

    Order::find_for_user(&mut *tx, order_id, user_id, true)
        .await?
        .ok_or(BookingError::OrderNotFound(order_id))?;

    let flights = [request.flight];
    let grids = Flight::seat_grids(&mut *tx, &flights).await?;
    let taken = Ticket::taken_seats(&mut *tx, &flights).await?;
    check_tickets(std::slice::from_ref(request), &grids, &taken)?;

    let ticket = Ticket::insert(&mut *tx, order_id, request.flight, request.row, request.seat)
        .await
        .map_err(|e| seat_conflict(e, request))?;

    tx.commit().await?;

    info!(order_id, ticket_id = ticket.id, "ticket added to order");
    Ok(ticket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid() -> SeatGrid {
        SeatGrid::new(10, 6)
    }

    fn req(flight: i64, row: i32, seat: i32) -> TicketRequest {
        TicketRequest { row, seat, flight }
    }

    #[test]
    fn corners_of_the_grid_are_valid() {
        let g = grid();
        assert!(validate_ticket(1, 1, &g).is_ok());
        assert!(validate_ticket(10, 6, &g).is_ok());
        assert!(validate_ticket(1, 6, &g).is_ok());
        assert!(validate_ticket(10, 1, &g).is_ok());
    }

    #[test]
    fn row_past_last_names_row_and_range() {
        let err = validate_ticket(11, 1, &grid()).unwrap_err();
        assert_eq!(err.field(), "row");
        assert_eq!(
            err.to_string(),
            "row number must be in available range: (1, rows): (1, 10)"
        );
    }

    #[test]
    fn seat_zero_names_seat() {
        let err = validate_ticket(1, 0, &grid()).unwrap_err();
        assert_eq!(err, TicketValidationError::SeatOutOfRange { seat: 0, max: 6 });
        assert_eq!(err.field(), "seat");
    }

    #[test]
    fn row_is_reported_before_seat() {
        let err = validate_ticket(0, 99, &grid()).unwrap_err();
        assert_eq!(err.field(), "row");
    }

    proptest! {
        #[test]
        fn valid_iff_inside_grid(
            rows in 1i32..60,
            seats in 1i32..12,
            row in -5i32..70,
            seat in -5i32..20,
        ) {
            let g = SeatGrid::new(rows, seats);
            let inside = (1..=rows).contains(&row) && (1..=seats).contains(&seat);
            prop_assert_eq!(validate_ticket(row, seat, &g).is_ok(), inside);
        }
    }

    #[test]
    fn empty_batch_is_rejected() {
        let err = check_tickets(&[], &HashMap::new(), &HashSet::new()).unwrap_err();
        assert!(matches!(err, BookingError::EmptyOrder));
    }

    #[test]
    fn one_bad_ticket_rejects_the_batch() {
        let grids = HashMap::from([(1, grid())]);
        let batch = [req(1, 1, 1), req(1, 2, 3), req(1, 11, 1)];
        let err = check_tickets(&batch, &grids, &HashSet::new()).unwrap_err();
        assert!(matches!(
            err,
            BookingError::InvalidSeat(TicketValidationError::RowOutOfRange { row: 11, max: 10 })
        ));
    }

    #[test]
    fn unknown_flight_is_rejected() {
        let grids = HashMap::from([(1, grid())]);
        let err = check_tickets(&[req(2, 1, 1)], &grids, &HashSet::new()).unwrap_err();
        assert!(matches!(err, BookingError::UnknownFlight(2)));
    }

    #[test]
    fn taken_and_duplicate_seats_are_rejected() {
        let grids = HashMap::from([(1, grid()), (2, grid())]);
        let taken = HashSet::from([(1, 2, 3)]);

        let err = check_tickets(&[req(1, 2, 3)], &grids, &taken).unwrap_err();
        assert!(matches!(err, BookingError::SeatTaken { flight: 1, row: 2, seat: 3 }));

        let err = check_tickets(&[req(2, 1, 1), req(2, 1, 1)], &grids, &taken).unwrap_err();
        assert!(matches!(err, BookingError::DuplicateSeat { flight: 2, .. }));

        // то же место на другом рейсе - свободно
        assert!(check_tickets(&[req(2, 2, 3)], &grids, &taken).is_ok());
    }

    #[test]
    fn booking_errors_map_to_named_fields() {
        let cases = [
            (BookingError::EmptyOrder, "tickets"),
            (BookingError::UnknownFlight(3), "flight"),
            (BookingError::InvalidSeat(TicketValidationError::RowOutOfRange { row: 0, max: 1 }), "row"),
            (BookingError::SeatTaken { flight: 1, row: 1, seat: 1 }, "seat"),
        ];
        for (err, expected) in cases {
            match ApiError::from(err) {
                ApiError::Validation { field, .. } => assert_eq!(field, expected),
                other => panic!("unexpected error: {other:?}"),
            }
        }
        assert!(matches!(
            ApiError::from(BookingError::OrderNotFound(4)),
            ApiError::NotFound(_)
        ));
    }

    #[test]
    fn distinct_flights_are_sorted_and_unique() {
        let batch = [req(3, 1, 1), req(1, 1, 1), req(3, 2, 2)];
        assert_eq!(distinct_flights(&batch), vec![1, 3]);
    }
}
