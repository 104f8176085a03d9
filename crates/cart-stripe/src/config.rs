//! # Configuration
//!
//! Stripe credentials for the session-creation backend, and the endpoint
//! location for clients that call it. Values come from environment
//! variables (a `.env` file is honored).

use cart_core::CartError;
use std::env;

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";
const DEFAULT_API_VERSION: &str = "2024-12-18.acacia";

/// Path the storefront posts cart contents to
pub const SESSION_ENDPOINT_PATH: &str = "/api/payments/stripe";

/// Path the storefront reads the publishable key from before loading Stripe.js
pub const PUBLIC_CONFIG_PATH: &str = "/api/payments/config";

/// Stripe API configuration
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_test_... or sk_live_...)
    pub secret_key: String,

    /// Publishable key (pk_test_... or pk_live_...)
    ///
    /// Served at [`PUBLIC_CONFIG_PATH`]; the page passes it to Stripe.js,
    /// whose `redirectToCheckout` performs the hosted-page redirect.
    pub publishable_key: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// API version
    pub api_version: String,
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `STRIPE_SECRET_KEY`
    /// - `STRIPE_PUBLISHABLE_KEY`
    ///
    /// Optional: `STRIPE_API_BASE_URL`
    pub fn from_env() -> Result<Self, CartError> {
        dotenvy::dotenv().ok();

        let secret_key = env::var("STRIPE_SECRET_KEY")
            .map_err(|_| CartError::Configuration("STRIPE_SECRET_KEY not set".to_string()))?;

        let publishable_key = env::var("STRIPE_PUBLISHABLE_KEY")
            .map_err(|_| CartError::Configuration("STRIPE_PUBLISHABLE_KEY not set".to_string()))?;

        let config = Self::new(secret_key, publishable_key);
        config.validate()?;

        Ok(match env::var("STRIPE_API_BASE_URL") {
            Ok(url) => config.with_api_base_url(url),
            Err(_) => config,
        })
    }

    /// Create config with explicit values
    pub fn new(secret_key: impl Into<String>, publishable_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            publishable_key: publishable_key.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Check key prefixes
    pub fn validate(&self) -> Result<(), CartError> {
        if !self.secret_key.starts_with("sk_test_") && !self.secret_key.starts_with("sk_live_") {
            return Err(CartError::Configuration(
                "STRIPE_SECRET_KEY must start with sk_test_ or sk_live_".to_string(),
            ));
        }

        if !self.publishable_key.starts_with("pk_test_")
            && !self.publishable_key.starts_with("pk_live_")
        {
            return Err(CartError::Configuration(
                "STRIPE_PUBLISHABLE_KEY must start with pk_test_ or pk_live_".to_string(),
            ));
        }

        Ok(())
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test_")
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Where clients send cart contents to get a session
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Full URL of the session-creation endpoint
    pub endpoint_url: String,
}

impl EndpointConfig {
    /// Endpoint at the standard path under an origin
    pub fn for_origin(origin: &str) -> Self {
        Self {
            endpoint_url: format!(
                "{}{}",
                origin.trim_end_matches('/'),
                SESSION_ENDPOINT_PATH
            ),
        }
    }

    /// Load `CHECKOUT_ENDPOINT_URL`
    pub fn from_env() -> Result<Self, CartError> {
        dotenvy::dotenv().ok();

        let endpoint_url = env::var("CHECKOUT_ENDPOINT_URL")
            .map_err(|_| CartError::Configuration("CHECKOUT_ENDPOINT_URL not set".to_string()))?;

        if !endpoint_url.starts_with("http://") && !endpoint_url.starts_with("https://") {
            return Err(CartError::Configuration(format!(
                "CHECKOUT_ENDPOINT_URL is not an http(s) URL: {}",
                endpoint_url
            )));
        }

        Ok(Self { endpoint_url })
    }
}
