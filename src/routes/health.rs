use crate::routes::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::time::SystemTime;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    pub database: &'static str,
    /// Seconds since the process started
    pub uptime: f64,
}

/// Body returned when the report itself could not be put together
#[derive(Debug, Serialize)]
pub struct HealthFailure {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
}

impl HealthReport {
    /// # Errors
    /// Fails if the wall clock reads earlier than `started_at`
    pub fn compose(database_up: bool, started_at: SystemTime) -> anyhow::Result<Self> {
        let uptime = SystemTime::now().duration_since(started_at)?.as_secs_f64();

        Ok(HealthReport {
            status: if database_up { "healthy" } else { "unhealthy" },
            timestamp: utc_timestamp(),
            version: VERSION,
            database: if database_up {
                "connected"
            } else {
                "disconnected"
            },
            uptime,
        })
    }

    pub fn status_code(&self) -> StatusCode {
        if self.database == "connected" {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Health check for monitoring and load balancers
///
/// # Endpoint
/// GET /health
///
/// # Returns
/// - 200 when the database answers the liveness check
/// - 503 with `status: unhealthy` when it does not
/// - 500 with `status: error` if the report cannot be composed
pub async fn health(State(state): State<AppState>) -> Response {
    let database_up = match state.db.ping().await {
        Ok(()) => {
            tracing::debug!("Database connection test successful");
            true
        }
        Err(e) => {
            tracing::error!("Database connection test failed: {:?}", e);
            false
        }
    };

    match HealthReport::compose(database_up, state.started_at) {
        Ok(report) => (report.status_code(), Json(report)).into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthFailure {
                    status: "error",
                    message: "Health check failed",
                    timestamp: utc_timestamp(),
                }),
            )
                .into_response()
        }
    }
}
