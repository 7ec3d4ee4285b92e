//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// The caller did not identify itself.
    Unauthorized(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Checkout service error.
    Checkout(CheckoutError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Checkout(err) => checkout_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    let status = match &err {
        CheckoutError::InvalidOrder(_) | CheckoutError::InvalidStatus => StatusCode::BAD_REQUEST,
        CheckoutError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        CheckoutError::InsufficientInventory { .. } => StatusCode::CONFLICT,
        CheckoutError::PaymentDeclined { .. } => StatusCode::PAYMENT_REQUIRED,
        CheckoutError::PaymentUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        CheckoutError::Store(_) => {
            tracing::error!(error = %err, "internal server error");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            );
        }
    };
    (status, err.to_string())
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

#[cfg(test)]
mod tests {
    use common::{OrderId, ProductId};
    use order_store::StoreError;

    use super::*;

    fn status_of(err: CheckoutError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_checkout_error_status_codes() {
        let order_id = OrderId::new();
        assert_eq!(
            status_of(CheckoutError::InvalidOrder("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(CheckoutError::InvalidStatus), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(CheckoutError::OrderNotFound(order_id)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CheckoutError::InsufficientInventory {
                product_id: ProductId::new(),
                requested: 2,
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(CheckoutError::PaymentDeclined {
                order_id,
                reason: "declined".to_string(),
            }),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            status_of(CheckoutError::PaymentUnavailable {
                order_id,
                reason: "timeout".to_string(),
            }),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(CheckoutError::Store(StoreError::Unavailable(
                "down".to_string()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_client_errors() {
        assert_eq!(
            ApiError::Unauthorized("missing".to_string())
                .into_response()
                .status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::BadRequest("bad id".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }
}
