//! # Application State
//!
//! Shared state for the Axum application: configuration and the Stripe
//! checkout client.

use cart_core::Currency;
use cart_stripe::StripeCheckoutClient;
use std::net::SocketAddr;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Storefront origin, used when a request carries no trusted `Origin` header
    pub base_url: String,
    /// Extra storefront origins allowed to call in (`ALLOWED_ORIGINS`, comma separated)
    pub allowed_origins: Vec<String>,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Currency every cart is priced in (`CART_CURRENCY`)
    pub currency: Currency,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            currency: parse_currency(std::env::var("CART_CURRENCY").ok().as_deref())?,
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| {
                anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e)
            })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Every origin trusted for CORS and redirect targets, `base_url` first
    pub fn trusted_origins(&self) -> Vec<String> {
        std::iter::once(&self.base_url)
            .chain(&self.allowed_origins)
            .map(|o| o.trim_end_matches('/').to_string())
            .collect()
    }

    pub fn is_trusted_origin(&self, origin: &str) -> bool {
        let origin = origin.trim_end_matches('/');
        self.trusted_origins().iter().any(|o| o == origin)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_currency(code: Option<&str>) -> anyhow::Result<Currency> {
    match code {
        None => Ok(Currency::default()),
        Some(code) => Currency::from_code(code)
            .ok_or_else(|| anyhow::anyhow!("Unsupported CART_CURRENCY: {}", code)),
    }
}

/// Where Stripe sends the customer afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutUrls {
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutUrls {
    pub fn for_origin(origin: &str) -> Self {
        let origin = origin.trim_end_matches('/');
        Self {
            success_url: format!("{}/success", origin),
            cancel_url: format!("{}/canceled", origin),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Stripe Checkout Sessions client
    pub stripe: Arc<StripeCheckoutClient>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create state from the environment
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let stripe = StripeCheckoutClient::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        Ok(Self::with_client(config, stripe))
    }

    pub fn with_client(config: AppConfig, stripe: StripeCheckoutClient) -> Self {
        Self {
            stripe: Arc::new(stripe),
            config,
        }
    }

    /// Redirect targets under the caller's origin when it is trusted,
    /// otherwise under `base_url`
    pub fn checkout_urls(&self, origin: Option<&str>) -> CheckoutUrls {
        let origin = origin
            .filter(|o| self.config.is_trusted_origin(o))
            .unwrap_or(&self.config.base_url);
        CheckoutUrls::for_origin(origin)
    }
}
