//! Health check endpoints.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness: the process is serving requests.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness: the database answers.
///
/// In-memory state is always ready.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    let Some(pool) = state.pool() else {
        return StatusCode::OK;
    };

    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{TestApp, get};

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = TestApp::new();
        assert_eq!(app.send(get("/health", None)).await.status(), StatusCode::OK);
        assert_eq!(app.send(get("/health/ready", None)).await.status(), StatusCode::OK);
    }
}
