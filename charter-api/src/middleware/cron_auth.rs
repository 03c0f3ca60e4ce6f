use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use subtle::ConstantTimeEq;

use crate::error::AppError;
use crate::state::AppState;

pub const CRON_SECRET_HEADER: &str = "x-cron-secret";

#[derive(Debug, Deserialize)]
struct CronQuery {
    secret: Option<String>,
}

/// Presented secret, header first, then `?secret=` for schedulers that can
/// only issue plain GETs.
fn presented_secret(req: &Request) -> Option<String> {
    if let Some(value) = req.headers().get(CRON_SECRET_HEADER).and_then(|h| h.to_str().ok()) {
        return Some(value.to_string());
    }

    Query::<CronQuery>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(q)| q.secret)
}

/// Compares without short-circuiting on the first differing byte.
fn secrets_match(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

// ============================================================================
// Shared-secret guard for scheduler-triggered endpoints
// ============================================================================

pub async fn cron_auth_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let expected = state
        .cron
        .configured_secret()
        .ok_or_else(|| {
            AppError::InternalServerError("cron secret is not configured".to_string())
        })?;

    match presented_secret(&req) {
        Some(secret) if secrets_match(&secret, expected) => Ok(next.run(req).await),
        Some(_) => {
            tracing::warn!(path = %req.uri().path(), "Rejected cron call with wrong secret");
            Err(AppError::AuthenticationError("Invalid cron secret".to_string()))
        }
        None => Err(AppError::AuthenticationError("Missing cron secret".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_secrets_match_exactly() {
        assert!(secrets_match("tide-table", "tide-table"));
        assert!(!secrets_match("tide-tablf", "tide-table"));
        assert!(!secrets_match("tide", "tide-table"));
        assert!(!secrets_match("tide-table-extra", "tide-table"));
        assert!(!secrets_match("", "tide-table"));
        assert!(!secrets_match("TIDE-TABLE", "tide-table"));
    }

    #[test]
    fn test_header_wins_over_query() {
        let req = Request::builder()
            .uri("/api/cron/expire-bookings?secret=from-query")
            .header(CRON_SECRET_HEADER, "from-header")
            .body(Body::empty())
            .unwrap();
        assert_eq!(presented_secret(&req).as_deref(), Some("from-header"));

        let req = Request::builder()
            .uri("/api/cron/expire-bookings?secret=from-query")
            .body(Body::empty())
            .unwrap();
        assert_eq!(presented_secret(&req).as_deref(), Some("from-query"));
    }
}
