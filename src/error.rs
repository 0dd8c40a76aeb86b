use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Query layer operation that failed, used to pick the client-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListProducts,
    GetProduct,
    SearchProducts,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::ListProducts => "list_products",
            Operation::GetProduct => "get_product",
            Operation::SearchProducts => "search_products",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Operation::ListProducts => "Failed to retrieve products from database",
            Operation::GetProduct => "Failed to retrieve product from database",
            Operation::SearchProducts => "Failed to search products in database",
        }
    }
}

/// Uniform `{error, message}` body shared by every error response
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: &'static str,
    pub message: String,
}

/// Application-specific errors with HTTP status code mappings
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing search term")]
    MissingSearchTerm,

    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),

    #[error("Product {0} not found")]
    ProductNotFound(i64),

    #[error("Route not found")]
    RouteNotFound,

    #[error("Database error in {}: {source}", .operation.name())]
    Database {
        operation: Operation,
        #[source]
        source: sqlx::Error,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Adapter for `map_err` that tags a sqlx failure with its operation
    pub fn database(operation: Operation) -> impl FnOnce(sqlx::Error) -> AppError {
        move |source| AppError::Database { operation, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingSearchTerm | AppError::InvalidPagination(_) => StatusCode::BAD_REQUEST,
            AppError::ProductNotFound(_) | AppError::RouteNotFound => StatusCode::NOT_FOUND,
            AppError::Database { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        let (error, message) = match self {
            AppError::MissingSearchTerm => (
                "Missing search term",
                r#"Please provide a search term using the "q" parameter"#.to_string(),
            ),
            AppError::InvalidPagination(msg) => ("Invalid pagination", msg.clone()),
            AppError::ProductNotFound(id) => (
                "Product not found",
                format!("Product with ID {} does not exist", id),
            ),
            AppError::RouteNotFound => (
                "Not found",
                "The requested resource was not found".to_string(),
            ),
            AppError::Database { operation, .. } => {
                ("Database error", operation.failure_message().to_string())
            }
            AppError::Internal(_) => (
                "Internal server error",
                "An unexpected error occurred".to_string(),
            ),
        };

        ErrorEnvelope { error, message }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::MissingSearchTerm => tracing::warn!("Search request without a term"),
            AppError::InvalidPagination(msg) => tracing::warn!("Bad pagination: {}", msg),
            AppError::ProductNotFound(id) => tracing::info!(product_id = id, "Product not found"),
            AppError::RouteNotFound => tracing::debug!("No route matched request"),
            AppError::Database { operation, source } => {
                tracing::error!(operation = operation.name(), "Database error: {:?}", source)
            }
            AppError::Internal(err) => tracing::error!("Internal error: {:?}", err),
        }

        (self.status(), Json(self.envelope())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_missing_search_term_is_bad_request() {
        let (status, body) = render(AppError::MissingSearchTerm).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing search term");
        assert_eq!(
            body["message"],
            r#"Please provide a search term using the "q" parameter"#
        );
    }

    #[tokio::test]
    async fn test_product_not_found_names_the_id() {
        let (status, body) = render(AppError::ProductNotFound(42)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Product not found");
        assert_eq!(body["message"], "Product with ID 42 does not exist");
    }

    #[tokio::test]
    async fn test_product_not_found_beyond_column_range() {
        let (status, body) = render(AppError::ProductNotFound(99_999_999_999)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Product not found");
        assert_eq!(body["message"], "Product with ID 99999999999 does not exist");
    }

    #[tokio::test]
    async fn test_database_error_uses_operation_message() {
        let cases = [
            (
                Operation::ListProducts,
                "Failed to retrieve products from database",
            ),
            (
                Operation::GetProduct,
                "Failed to retrieve product from database",
            ),
            (
                Operation::SearchProducts,
                "Failed to search products in database",
            ),
        ];

        for (operation, message) in cases {
            let err = AppError::database(operation)(sqlx::Error::PoolTimedOut);
            let (status, body) = render(err).await;

            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body["error"], "Database error");
            assert_eq!(body["message"], message);
        }
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let err = AppError::Internal(anyhow::anyhow!("secret connection string"));
        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["message"], "An unexpected error occurred");
    }

    #[tokio::test]
    async fn test_envelope_has_exactly_two_fields() {
        let (_, body) = render(AppError::RouteNotFound).await;

        let fields = body.as_object().unwrap();
        assert_eq!(fields.len(), 2);
        assert!(fields.contains_key("error"));
        assert!(fields.contains_key("message"));
    }
}
