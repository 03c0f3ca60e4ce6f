use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use charter_core::SweepReport;

use crate::error::AppError;
use crate::middleware::cron_auth_middleware;
use crate::state::AppState;

/// Thin trigger adapter over the same sweep the background worker runs.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/cron/expire-bookings",
            get(expire_bookings).post(expire_bookings),
        )
        .route_layer(from_fn_with_state(state, cron_auth_middleware))
}

/// GET|POST /api/cron/expire-bookings
async fn expire_bookings(State(state): State<AppState>) -> Result<Json<SweepReport>, AppError> {
    let report = state.sweep.run().await?;
    tracing::info!(expired = report.expired_count, "Cron-triggered expiry sweep finished");
    Ok(Json(report))
}
