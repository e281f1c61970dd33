//! JSON API served with `axum`.
//!
//! Routes live under `/api` plus a bare `/health` probe. Every response
//! carries the security headers set in [`router`].

pub mod error;
pub mod extract;
pub mod leads;
pub mod payments;

use crate::application::engine::PaymentEngine;
use crate::application::leads::LeadService;
use axum::Json;
use axum::Router;
use axum::http::{HeaderName, HeaderValue, header};
use axum::routing::{get, post};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PaymentEngine>,
    pub leads: Arc<LeadService>,
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/payment/create", post(payments::create))
        .route("/payment/verify", post(payments::verify))
        .route("/payment/failed", post(payments::failed))
        .route(
            "/payment/status/:merchantTransactionId",
            get(payments::status),
        )
        .route("/leads/subscribe", post(leads::subscribe));

    let security_headers = [
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
        (header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
        (
            HeaderName::from_static("permissions-policy"),
            "camera=(), microphone=(), geolocation=()",
        ),
        (
            header::CONTENT_SECURITY_POLICY,
            "default-src 'none'; frame-ancestors 'self'",
        ),
    ];

    let mut router = Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http());
    for (name, value) in security_headers {
        router = router.layer(SetResponseHeaderLayer::if_not_present(
            name,
            HeaderValue::from_static(value),
        ));
    }
    router.with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
