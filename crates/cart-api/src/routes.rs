//! # Routes
//!
//! Axum router configuration for the session-creation endpoint.

use crate::handlers;
use crate::state::AppState;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use cart_stripe::{PUBLIC_CONFIG_PATH, SESSION_ENDPOINT_PATH};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

/// Create the main application router
///
/// Routes:
/// - GET  /health - Health check
/// - GET  /api/payments/config - Publishable key and currency for Stripe.js
/// - POST /api/payments/stripe - Create a checkout session from cart items
pub fn create_router(state: AppState) -> Router {
    // Only trusted storefront origins; redirect targets are checked separately
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(cors_origins(&state)))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route(PUBLIC_CONFIG_PATH, get(handlers::public_config))
        .route(SESSION_ENDPOINT_PATH, post(handlers::create_session))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_origins(state: &AppState) -> Vec<HeaderValue> {
    state
        .config
        .trusted_origins()
        .into_iter()
        .filter_map(|origin| match HeaderValue::from_str(&origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "skipping origin that is not a valid header value");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use axum::http::{header::ORIGIN, StatusCode};
    use axum_test::TestServer;
    use cart_core::{CartLineItem, Currency};
    use cart_stripe::{StripeCheckoutClient, StripeConfig};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn server_for(stripe: &MockServer) -> TestServer {
        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            base_url: "http://shop.test".to_string(),
            allowed_origins: vec!["https://preview.shop.test".to_string()],
            environment: "test".to_string(),
            currency: Currency::EUR,
        };
        let client = StripeCheckoutClient::new(
            StripeConfig::new("sk_test_abc", "pk_test_abc").with_api_base_url(stripe.uri()),
        )
        .unwrap();
        TestServer::new(create_router(AppState::with_client(config, client))).unwrap()
    }

    fn items() -> Vec<CartLineItem> {
        vec![CartLineItem::new("prod_a", "Speaker", 1000).unwrap()]
    }

    fn session_ok() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "sess_123",
            "url": "https://checkout.stripe.com/c/pay/sess_123"
        }))
    }

    #[tokio::test]
    async fn test_health() {
        let stripe = MockServer::start().await;
        let response = server_for(&stripe).get("/health").await;

        response.assert_status_ok();
        assert_eq!(response.json::<serde_json::Value>()["status"], "healthy");
    }

    #[tokio::test]
    async fn test_public_config_exposes_publishable_key() {
        let stripe = MockServer::start().await;
        let response = server_for(&stripe).get("/api/payments/config").await;

        response.assert_status_ok();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["publishable_key"], "pk_test_abc");
        assert_eq!(body["currency"], "eur");
        assert!(body.get("secret_key").is_none());
    }

    #[tokio::test]
    async fn test_create_session_returns_id() {
        let stripe = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(body_string_contains("success_url=http%3A%2F%2Fshop.test%2Fsuccess"))
            .and(body_string_contains("currency%5D=eur"))
            .respond_with(session_ok())
            .expect(1)
            .mount(&stripe)
            .await;

        let response = server_for(&stripe)
            .post("/api/payments/stripe")
            .json(&items())
            .await;

        response.assert_status_ok();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["id"], "sess_123");
    }

    #[tokio::test]
    async fn test_trusted_origin_sets_redirect_targets() {
        let stripe = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains(
                "success_url=https%3A%2F%2Fpreview.shop.test%2Fsuccess",
            ))
            .respond_with(session_ok())
            .expect(1)
            .mount(&stripe)
            .await;

        let response = server_for(&stripe)
            .post("/api/payments/stripe")
            .add_header(ORIGIN, HeaderValue::from_static("https://preview.shop.test"))
            .json(&items())
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.headers().get("access-control-allow-origin"),
            Some(&HeaderValue::from_static("https://preview.shop.test"))
        );
    }

    #[tokio::test]
    async fn test_foreign_origin_cannot_steer_redirects() {
        let stripe = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("success_url=http%3A%2F%2Fshop.test%2Fsuccess"))
            .and(body_string_contains("cancel_url=http%3A%2F%2Fshop.test%2Fcanceled"))
            .respond_with(session_ok())
            .expect(1)
            .mount(&stripe)
            .await;

        let response = server_for(&stripe)
            .post("/api/payments/stripe")
            .add_header(ORIGIN, HeaderValue::from_static("https://attacker.example"))
            .json(&items())
            .await;

        response.assert_status_ok();
        assert!(response
            .headers()
            .get("access-control-allow-origin")
            .is_none());
    }

    #[tokio::test]
    async fn test_provider_failure_is_error_status() {
        let stripe = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&stripe)
            .await;

        let response = server_for(&stripe)
            .post("/api/payments/stripe")
            .json(&items())
            .expect_failure()
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
        assert!(response.json::<serde_json::Value>().get("id").is_none());
    }

    #[tokio::test]
    async fn test_empty_cart_is_bad_request() {
        let stripe = MockServer::start().await;
        let empty: Vec<CartLineItem> = Vec::new();

        let response = server_for(&stripe)
            .post("/api/payments/stripe")
            .json(&empty)
            .expect_failure()
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }
}
