//! # Cart Error Types
//!
//! Typed error handling for the cart and checkout flow.
//! All fallible operations return `Result<T, CartError>`.

use thiserror::Error;

/// Core error type for cart and checkout operations
#[derive(Debug, Error)]
pub enum CartError {
    /// Configuration errors (missing keys, invalid endpoint)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Price is negative or otherwise unusable
    #[error("Invalid price: {message}")]
    InvalidPrice { message: String },

    /// Checkout was requested with no items in the cart
    #[error("Cart is empty")]
    EmptyCart,

    /// A checkout request is already in flight
    #[error("Checkout already in progress")]
    CheckoutInFlight,

    /// Session-creation endpoint answered with a failure status
    #[error("Session endpoint returned HTTP {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error talking to an endpoint
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Response arrived but did not carry a usable session id
    #[error("Malformed session response: {0}")]
    MalformedResponse(String),

    /// Redirect primitive could not hand off to the hosted page
    #[error("Redirect failed: {0}")]
    RedirectFailed(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CartError {
    /// Returns true if this failure is the transport or server kind that the
    /// checkout flow reports silently unless configured otherwise
    pub fn is_transient(&self) -> bool {
        matches!(self, CartError::NetworkError(_) | CartError::ServerError { .. })
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CartError::Configuration(_) => 500,
            CartError::InvalidRequest(_) => 400,
            CartError::InvalidPrice { .. } => 400,
            CartError::EmptyCart => 400,
            CartError::CheckoutInFlight => 409,
            CartError::ServerError { .. } => 502,
            CartError::ProviderError { .. } => 502,
            CartError::NetworkError(_) => 503,
            CartError::MalformedResponse(_) => 502,
            CartError::RedirectFailed(_) => 500,
            CartError::Serialization(_) => 500,
        }
    }
}

impl From<serde_json::Error> for CartError {
    fn from(err: serde_json::Error) -> Self {
        CartError::Serialization(err.to_string())
    }
}

/// Result type alias for cart operations
pub type CartResult<T> = Result<T, CartError>;
