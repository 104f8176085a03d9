//! # cart-stripe
//!
//! Stripe integration for drawer-cart.
//!
//! This crate provides both ends of the session-creation endpoint:
//!
//! 1. **EndpointSessionCreator** - client side
//!    - Posts the cart snapshot as JSON to `/api/payments/stripe`
//!    - Maps failure statuses and missing ids to typed errors
//!    - Plugs into `cart_core::CheckoutInitiator`
//!
//! 2. **StripeCheckoutClient** - server side
//!    - Creates a Stripe Checkout Session from posted items
//!    - Returns the session id and hosted URL
//!    - `StripeConfig::publishable_key` is what the page hands to Stripe.js
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cart_stripe::EndpointSessionCreator;
//! use cart_core::CheckoutInitiator;
//!
//! let creator = EndpointSessionCreator::from_env()?;
//! let initiator = CheckoutInitiator::new(creator, redirect, toasts);
//! let outcome = initiator.checkout(&cart).await;
//! ```

pub mod checkout;
pub mod config;
pub mod session;

// Re-exports
pub use checkout::{StripeCheckoutClient, StripeSession};
pub use config::{EndpointConfig, StripeConfig, PUBLIC_CONFIG_PATH, SESSION_ENDPOINT_PATH};
pub use session::EndpointSessionCreator;
