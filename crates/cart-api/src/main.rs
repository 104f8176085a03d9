//! # drawer-cart
//!
//! Session-creation endpoint for the cart drawer.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_PUBLISHABLE_KEY=pk_test_...
//! export BASE_URL=https://shop.example.com
//! export ALLOWED_ORIGINS=https://preview.shop.example.com   # optional
//! export CART_CURRENCY=usd                                  # optional
//!
//! # Run the server
//! drawer-cart
//! ```

use cart_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();
    let trusted_origins = state.config.trusted_origins();

    info!("Environment: {}", state.config.environment);
    info!(
        "Stripe mode: {}",
        if state.stripe.config().is_test_mode() { "test" } else { "live" }
    );

    let app = routes::create_router(state);

    info!("drawer-cart listening on http://{}", addr);
    if !is_prod {
        info!("Checkout: POST http://{}/api/payments/stripe", addr);
        info!("Trusted origins: {:?}", trusted_origins);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
