//! # Session Endpoint Client
//!
//! Native [`SessionCreator`] that posts the cart snapshot as JSON to the
//! session-creation endpoint and reads back `{ "id": ... }`.

use crate::config::EndpointConfig;
use async_trait::async_trait;
use cart_core::{CartError, CartLineItem, CartResult, CheckoutSession, SessionCreator};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, instrument};

/// Posts cart items to the storefront's session endpoint
#[derive(Debug, Clone)]
pub struct EndpointSessionCreator {
    config: EndpointConfig,
    client: Client,
}

impl EndpointSessionCreator {
    pub fn new(config: EndpointConfig) -> CartResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                CartError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> CartResult<Self> {
        Self::new(EndpointConfig::from_env()?)
    }
}

/// The endpoint only promises an `id`; anything else is ignored
#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(default)]
    id: Option<String>,
}

#[async_trait(?Send)]
impl SessionCreator for EndpointSessionCreator {
    #[instrument(skip(self, items), fields(items = items.len()))]
    async fn create_session(&self, items: &[CartLineItem]) -> CartResult<CheckoutSession> {
        let response = self
            .client
            .post(&self.config.endpoint_url)
            .json(items)
            .send()
            .await
            .map_err(|e| CartError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CartError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Session endpoint error: status={}, body={}", status, body);
            return Err(CartError::ServerError {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: SessionResponse = serde_json::from_str(&body)
            .map_err(|e| CartError::MalformedResponse(format!("invalid JSON: {}", e)))?;

        let id = parsed.id.filter(|id| !id.is_empty()).ok_or_else(|| {
            CartError::MalformedResponse("response has no session id".to_string())
        })?;

        debug!("Session endpoint returned id={}", id);

        Ok(CheckoutSession { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cart_core::{
        CartHandle, CartState, CartStore, CheckoutInitiator, CheckoutOutcome, CheckoutPhase,
        Currency, Notice, Notifier, Redirector,
    };
    use std::cell::RefCell;
    use std::rc::Rc;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn items() -> Vec<CartLineItem> {
        vec![
            CartLineItem::new("a", "A", 1000).unwrap(),
            CartLineItem::new("b", "B", 500).unwrap(),
        ]
    }

    fn cart() -> CartHandle {
        let state = CartState::with_items(Currency::USD, items()).unwrap();
        CartStore::from_state(state).handle()
    }

    fn creator(server: &MockServer) -> EndpointSessionCreator {
        EndpointSessionCreator::new(EndpointConfig::for_origin(&server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_posts_items_and_reads_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/payments/stripe"))
            .and(body_json(serde_json::to_value(items()).unwrap()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "sess_123",
                "url": "https://checkout.stripe.com/c/pay/sess_123"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = creator(&server).create_session(&items()).await.unwrap();

        assert_eq!(session.id, "sess_123");
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = creator(&server).create_session(&items()).await.unwrap_err();

        assert!(matches!(err, CartError::ServerError { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_missing_id_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = creator(&server).create_session(&items()).await.unwrap_err();

        assert!(matches!(err, CartError::MalformedResponse(_)));
    }

    #[derive(Default, Clone)]
    struct Recorder {
        redirects: Rc<RefCell<Vec<String>>>,
        notices: Rc<RefCell<Vec<Notice>>>,
    }

    impl Redirector for Recorder {
        fn redirect_to_checkout(&self, session_id: &str) -> CartResult<()> {
            self.redirects.borrow_mut().push(session_id.to_string());
            Ok(())
        }
    }

    impl Notifier for Recorder {
        fn notify(&self, notice: Notice) {
            self.notices.borrow_mut().push(notice);
        }
    }

    #[tokio::test]
    async fn test_checkout_over_http_redirects_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/payments/stripe"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "sess_123" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let cart = cart();
        let recorder = Recorder::default();
        let initiator =
            CheckoutInitiator::new(creator(&server), recorder.clone(), recorder.clone());

        let outcome = initiator.checkout(&cart).await;

        assert_eq!(outcome.session_id(), Some("sess_123"));
        assert_eq!(*recorder.redirects.borrow(), vec!["sess_123".to_string()]);
    }

    #[tokio::test]
    async fn test_checkout_over_http_server_error_stays_silent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let cart = cart();
        let recorder = Recorder::default();
        let initiator =
            CheckoutInitiator::new(creator(&server), recorder.clone(), recorder.clone());

        let outcome = initiator.checkout(&cart).await;

        assert!(matches!(outcome, CheckoutOutcome::Failure(_)));
        assert!(recorder.redirects.borrow().is_empty());
        assert!(recorder.notices.borrow().is_empty());
        assert_eq!(initiator.phase(), CheckoutPhase::Idle);
    }
}
