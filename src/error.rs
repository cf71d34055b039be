//! error.rs
//!
//! Единый тип ошибки для HTTP-обработчиков. Каждый вариант знает свой
//! HTTP-статус; внутренние ошибки логируются, а клиенту уходит только
//! безопасное сообщение.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::services::booking::TicketValidationError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0}")]
    BadRequest(String),

    #[error("authentication credentials were not provided or are invalid")]
    Unauthorized,

    #[error("you do not have permission to perform this action")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl std::fmt::Display, id: i64) -> Self {
        ApiError::NotFound(format!("{resource} with id {id}"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Переводит нарушения ограничений таблицы `table` в ошибки валидации:
    /// внешний ключ называет поле (`routes_source_id_fkey` -> `source`),
    /// уникальность уходит в `non_field_errors`. Остальное остаётся ошибкой БД.
    pub fn from_constraint(err: sqlx::Error, table: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or_default();
            if db_err.is_foreign_key_violation() {
                let field = fk_field(constraint, table).unwrap_or("non_field_errors");
                return ApiError::validation(field, "invalid pk - object does not exist");
            }
            if db_err.is_unique_violation() {
                return ApiError::validation(
                    "non_field_errors",
                    format!("record violating {constraint} already exists"),
                );
            }
        }
        ApiError::Database(err)
    }
}

// Имена FK по умолчанию в Postgres: {table}_{column}_fkey, колонка вида {field}_id
fn fk_field<'a>(constraint: &'a str, table: &str) -> Option<&'a str> {
    constraint
        .strip_prefix(table)?
        .strip_prefix('_')?
        .strip_suffix("_id_fkey")
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, field) = match self {
            ApiError::Validation { field, message } => (message, Some(field)),
            ApiError::Database(ref e) => {
                tracing::error!(error = ?e, "database error");
                ("Internal server error".to_string(), None)
            }
            ApiError::Internal(ref e) => {
                tracing::error!(error = ?e, "internal error");
                ("Internal server error".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        let body = ErrorBody {
            success: false,
            message,
            field,
        };

        (status, Json(body)).into_response()
    }
}

impl From<TicketValidationError> for ApiError {
    fn from(err: TicketValidationError) -> Self {
        ApiError::validation(err.field(), err.to_string())
    }
}

// validator: берём первое поле с ошибкой, чтобы ответ называл конкретное поле
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        match fields.into_iter().next() {
            Some((field, errs)) => {
                let message = errs
                    .iter()
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("invalid value for {field}"));
                ApiError::validation(field.to_string(), message)
            }
            None => ApiError::BadRequest(errors.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Payload {
        #[validate(range(min = 1, message = "rows must be at least 1"))]
        rows: i32,
    }

    #[test]
    fn statuses_match_error_kinds() {
        assert_eq!(ApiError::validation("row", "bad").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("Order", 7).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Database(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message_names_resource() {
        let err = ApiError::not_found("Order", 7);
        assert_eq!(err.to_string(), "Order with id 7 not found");
    }

    #[test]
    fn validator_errors_name_the_field() {
        let errors = Payload { rows: 0 }.validate().unwrap_err();
        match ApiError::from(errors) {
            ApiError::Validation { field, message } => {
                assert_eq!(field, "rows");
                assert_eq!(message, "rows must be at least 1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_database_errors_pass_through_constraint_mapping() {
        let err = ApiError::from_constraint(sqlx::Error::RowNotFound, "flights");
        assert!(matches!(err, ApiError::Database(_)));
    }

    #[test]
    fn foreign_key_names_map_to_fields() {
        assert_eq!(fk_field("routes_source_id_fkey", "routes"), Some("source"));
        assert_eq!(
            fk_field("airplanes_airplane_type_id_fkey", "airplanes"),
            Some("airplane_type")
        );
        assert_eq!(fk_field("flight_crew_crew_id_fkey", "flight_crew"), Some("crew"));
        assert_eq!(fk_field("tickets_flight_row_seat_key", "tickets"), None);
        assert_eq!(fk_field("orders_user_id_fkey", "flights"), None);
    }
}
