//! # Stripe Checkout Sessions
//!
//! Server-side half of the session-creation endpoint: turns the cart
//! items posted by the storefront into a Stripe Checkout Session.

use crate::config::StripeConfig;
use cart_core::{CartError, CartLineItem, CartResult, Currency};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// Session as returned to the storefront
#[derive(Debug, Clone, Serialize)]
pub struct StripeSession {
    /// Session id handed to the redirect primitive
    pub id: String,
    /// Hosted checkout URL
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Client for `POST /v1/checkout/sessions`
#[derive(Debug, Clone)]
pub struct StripeCheckoutClient {
    config: StripeConfig,
    client: Client,
}

impl StripeCheckoutClient {
    pub fn new(config: StripeConfig) -> CartResult<Self> {
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
        Self::new(StripeConfig::from_env()?)
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    /// Build the form body Stripe expects
    fn form_params(
        items: &[CartLineItem],
        currency: Currency,
        success_url: &str,
        cancel_url: &str,
    ) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("submit_type".to_string(), "pay".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("billing_address_collection".to_string(), "auto".to_string()),
            ("success_url".to_string(), success_url.to_string()),
            ("cancel_url".to_string(), cancel_url.to_string()),
        ];

        for (i, item) in items.iter().enumerate() {
            let prefix = format!("line_items[{}]", i);
            params.push((
                format!("{}[price_data][currency]", prefix),
                currency.as_str().to_string(),
            ));
            params.push((
                format!("{}[price_data][unit_amount]", prefix),
                item.unit_price().to_string(),
            ));
            params.push((
                format!("{}[price_data][product_data][name]", prefix),
                item.name.clone(),
            ));
            // Per-product metadata, so the cart id survives any number of lines
            params.push((
                format!("{}[price_data][product_data][metadata][product_id]", prefix),
                item.id.clone(),
            ));
            // Stripe only accepts absolute image URLs
            let image = item
                .image_ref
                .as_deref()
                .filter(|r| r.starts_with("https://"));
            if let Some(image) = image {
                params.push((
                    format!("{}[price_data][product_data][images][0]", prefix),
                    image.to_string(),
                ));
            }
            params.push((
                format!("{}[adjustable_quantity][enabled]", prefix),
                "true".to_string(),
            ));
            params.push((
                format!("{}[adjustable_quantity][minimum]", prefix),
                "1".to_string(),
            ));
            params.push((format!("{}[quantity]", prefix), item.quantity.to_string()));
        }

        params
    }

    /// Create a hosted checkout session for these items
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub async fn create_session(
        &self,
        items: &[CartLineItem],
        currency: Currency,
        success_url: &str,
        cancel_url: &str,
    ) -> CartResult<StripeSession> {
        if items.is_empty() {
            return Err(CartError::EmptyCart);
        }
        for item in items {
            item.validate()?;
        }

        let params = Self::form_params(items, currency, success_url, cancel_url);
        debug!("Creating Stripe checkout session: {} items", items.len());

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", Uuid::new_v4().to_string())
            .form(&params)
            .send()
            .await
            .map_err(|e| CartError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CartError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            let message = serde_json::from_str::<StripeErrorResponse>(&body)
                .map(|r| r.error.message)
                .unwrap_or_else(|_| format!("HTTP {}: {}", status, body));

            return Err(CartError::ProviderError {
                provider: "stripe".to_string(),
                message,
            });
        }

        let session: StripeSessionResponse = serde_json::from_str(&body).map_err(|e| {
            CartError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        info!("Created Stripe checkout session: id={}", session.id);

        Ok(StripeSession {
            id: session.id,
            url: session.url,
            expires_at: session.expires_at.and_then(|ts| DateTime::from_timestamp(ts, 0)),
        })
    }
}

#[derive(Debug, Deserialize)]
struct StripeSessionResponse {
    id: String,
    url: String,
    #[serde(default)]
    expires_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}
