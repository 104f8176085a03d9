//! # Request Handlers
//!
//! Axum request handlers for the session-creation endpoint.

use crate::state::AppState;
use axum::{
    extract::State,
    http::{header::ORIGIN, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use cart_core::{CartError, CartLineItem, Currency};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

/// Create session response
#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    /// Session ID, handed to the redirect primitive
    pub id: String,
    /// Hosted checkout URL
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// Browser-safe configuration for loading Stripe.js
#[derive(Debug, Serialize)]
pub struct PublicConfigResponse {
    pub publishable_key: String,
    pub currency: Currency,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn cart_error_to_response(err: CartError) -> ApiError {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "drawer-cart",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Publishable key and cart currency for the storefront page
pub async fn public_config(State(state): State<AppState>) -> Json<PublicConfigResponse> {
    Json(PublicConfigResponse {
        publishable_key: state.stripe.config().publishable_key.clone(),
        currency: state.config.currency,
    })
}

/// Create a hosted checkout session from the posted cart items
#[instrument(skip(state, headers, items), fields(items = items.len()))]
pub async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(items): Json<Vec<CartLineItem>>,
) -> Result<Json<CreateSessionResponse>, ApiError> {
    let origin = headers.get(ORIGIN).and_then(|v| v.to_str().ok());
    if let Some(origin) = origin.filter(|o| !state.config.is_trusted_origin(o)) {
        warn!(%origin, "untrusted Origin, redirecting to BASE_URL instead");
    }
    let urls = state.checkout_urls(origin);

    info!(
        "Creating checkout session: {} lines, success_url={}",
        items.len(),
        urls.success_url
    );

    let session = state
        .stripe
        .create_session(
            &items,
            state.config.currency,
            &urls.success_url,
            &urls.cancel_url,
        )
        .await
        .map_err(|e| {
            error!("Failed to create checkout session: {}", e);
            cart_error_to_response(e)
        })?;

    Ok(Json(CreateSessionResponse {
        id: session.id,
        url: session.url,
        expires_at: session.expires_at.map(|t| t.to_rfc3339()),
    }))
}
