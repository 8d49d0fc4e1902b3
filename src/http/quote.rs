//! Quote endpoints.
//!
//! Thin adapter between HTTP and the quote engine: parse the query
//! string, run the engine, map `QuoteError` to a status code.

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http::request::X_REQUEST_ID;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::quoting::curve::CurveError;
use crate::quoting::types::{QuoteError, QuoteRequest};
use crate::tables::normalize::parse_decimal;

/// Query parameters shared by the quote endpoints.
///
/// Numbers arrive as strings so callers can write `weight=3,5` the same
/// way the tariff sheets do.
#[derive(Debug, Deserialize)]
pub struct QuoteParams {
    pub cep: String,
    pub weight: String,
    pub value: Option<String>,
    pub service: Option<String>,
}

/// JSON error payload returned by every quote endpoint.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

/// GET /api/quote - price a shipment against one tariff row.
pub async fn single(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<QuoteParams>,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = request_id(&headers);
    tracing::debug!(
        request_id = %request_id,
        cep = %params.cep,
        weight = %params.weight,
        "Quote requested"
    );

    let request = match parse_params(params) {
        Ok(request) => request,
        Err(response) => {
            metrics::record_quote("invalid_input", started);
            return response;
        }
    };

    match state.engine.quote(&request) {
        Ok(quote) => {
            metrics::record_quote("ok", started);
            (StatusCode::OK, Json(quote)).into_response()
        }
        Err(e) => {
            tracing::debug!(request_id = %request_id, error = %e, "Quote rejected");
            metrics::record_quote(e.kind(), started);
            quote_error_response(&e)
        }
    }
}

/// GET /api/quotes - price a shipment against every matching service.
pub async fn all(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<QuoteParams>,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = request_id(&headers);
    tracing::debug!(
        request_id = %request_id,
        cep = %params.cep,
        weight = %params.weight,
        "Multi-service quote requested"
    );

    let request = match parse_params(params) {
        Ok(request) => request,
        Err(response) => {
            metrics::record_quote("invalid_input", started);
            return response;
        }
    };

    match state.engine.quote_all(&request) {
        Ok(set) => {
            metrics::record_quote("ok", started);
            (StatusCode::OK, Json(set)).into_response()
        }
        Err(e) => {
            tracing::debug!(request_id = %request_id, error = %e, "Quote rejected");
            metrics::record_quote(e.kind(), started);
            quote_error_response(&e)
        }
    }
}

/// GET /api/quote/{id} - retrieve a previously issued quote.
pub async fn by_id(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match state.engine.get_quote(id) {
        Some(quote) => {
            metrics::record_quote_lookup("hit");
            (StatusCode::OK, Json(quote)).into_response()
        }
        None => {
            metrics::record_quote_lookup("miss");
            (
                StatusCode::NOT_FOUND,
                Json(ErrorBody {
                    error: "Quote not found or expired".to_string(),
                    kind: "quote_not_found",
                }),
            )
                .into_response()
        }
    }
}

fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

fn parse_params(params: QuoteParams) -> Result<QuoteRequest, Response> {
    let weight = match parse_decimal(&params.weight) {
        Some(weight) => weight,
        None => {
            return Err(bad_request(format!(
                "weight {:?} is not a number",
                params.weight
            )))
        }
    };

    let declared_value = match params.value {
        None => None,
        Some(raw) => match parse_decimal(&raw) {
            Some(value) => Some(value),
            None => return Err(bad_request(format!("value {raw:?} is not a number"))),
        },
    };

    Ok(QuoteRequest {
        postal_code: params.cep,
        weight,
        declared_value,
        service: params.service,
    })
}

fn bad_request(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message,
            kind: "invalid_input",
        }),
    )
        .into_response()
}

fn quote_error_response(error: &QuoteError) -> Response {
    let status = match error {
        QuoteError::InvalidPostalCode(_)
        | QuoteError::InvalidWeight(_)
        | QuoteError::InvalidDeclaredValue(_)
        | QuoteError::Curve(CurveError::InvalidWeight(_)) => StatusCode::BAD_REQUEST,
        QuoteError::PostalCodeNotFound(_) | QuoteError::TariffNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        QuoteError::DataUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        QuoteError::Curve(CurveError::EmptyCurve) => StatusCode::UNPROCESSABLE_ENTITY,
    };

    (
        status,
        Json(ErrorBody {
            error: error.to_string(),
            kind: error.kind(),
        }),
    )
        .into_response()
}
