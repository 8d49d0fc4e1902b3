//! Service health endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::http::server::AppState;

/// Health report for load balancers and operators.
///
/// The endpoint always answers 200: a missing snapshot degrades quoting
/// but the process itself is up and will recover on the next reload.
#[derive(Serialize)]
pub struct HealthStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub data_loaded: bool,
    pub postal_ranges: usize,
    pub tariff_rows: usize,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let snapshot = state.tables.load_full();

    Json(HealthStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: if snapshot.is_some() { "operational" } else { "degraded" },
        data_loaded: snapshot.is_some(),
        postal_ranges: snapshot.as_ref().map(|t| t.postal_ranges()).unwrap_or(0),
        tariff_rows: snapshot.as_ref().map(|t| t.tariff_rows()).unwrap_or(0),
    })
}
