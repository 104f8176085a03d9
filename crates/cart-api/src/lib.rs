//! # cart-api
//!
//! Session-creation endpoint for drawer-cart.
//!
//! The storefront posts its cart items here; the handler creates a Stripe
//! Checkout Session and answers with the session id the browser redirects to.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/payments/stripe` | Create checkout session from cart items |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
