//! # cart-core
//!
//! Core types for the drawer-cart storefront flow.
//!
//! This crate provides:
//! - `CartStore` / `CartHandle`: the single owner of cart contents and derived totals
//! - `CheckoutInitiator`: the Idle → Requesting → Redirecting state machine
//! - `CartDrawer` / `DrawerView`: a renderer-agnostic view-model for the drawer
//! - Collaborator traits (`SessionCreator`, `Redirector`, `Notifier`, `ImageResolver`,
//!   `Navigator`)
//! - `CartError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use cart_core::{CartLineItem, CartStore, CheckoutInitiator, Currency, Direction};
//!
//! let store = CartStore::new(Currency::USD);
//! let cart = store.handle();
//!
//! cart.add_item(CartLineItem::new("prod_1", "Headphones", 9999)?)?;
//! cart.adjust_quantity("prod_1", Direction::Increment)?;
//!
//! let initiator = CheckoutInitiator::new(endpoint, redirect, toasts);
//! let outcome = initiator.checkout(&cart).await;
//! ```

pub mod checkout;
pub mod drawer;
pub mod error;
pub mod item;
pub mod price;
pub mod store;

// Re-exports for convenience
pub use checkout::{
    CheckoutInitiator, CheckoutOutcome, CheckoutPhase, CheckoutPolicy, CheckoutSession, Notice,
    NoticeKind, Notifier, Redirector, SessionCreator, REDIRECT_NOTICE_DURATION,
};
pub use drawer::{
    CartDrawer, DrawerBody, DrawerView, ImageResolver, LineView, Navigator, CATALOG_PATH,
};
pub use error::{CartError, CartResult};
pub use item::{CartLineItem, MAX_LINE_QUANTITY, MAX_UNIT_PRICE};
pub use price::{Currency, Price};
pub use store::{CartCommand, CartHandle, CartState, CartStore, Direction};
