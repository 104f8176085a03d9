//! # cart-wasm
//!
//! WebAssembly bindings for drawer-cart.
//!
//! Exposes the cart store, the drawer view-model and the checkout flow to
//! the storefront page. The page supplies four callbacks: the Stripe.js
//! redirect, a toast function, an image URL resolver, and a client-side
//! router. The publishable key for Stripe.js comes from the backend's
//! `GET /api/payments/config`.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmCart } from 'drawer-cart-wasm';
//!
//! await init();
//!
//! const { publishable_key } = await (await fetch('/api/payments/config')).json();
//! const stripe = await loadStripe(publishable_key);
//!
//! const cart = new WasmCart(
//!   '/api/payments/stripe',
//!   (sessionId) => stripe.redirectToCheckout({ sessionId }),
//!   (kind, message, ms) => toast[kind](message, { duration: ms }),
//!   (ref) => urlFor(ref),
//!   (path) => router.push(path),
//! );
//!
//! cart.add_item({ _id: 'prod_1', name: 'Headphones', price: 9999, quantity: 1 });
//! render(cart.view());
//! await cart.checkout();
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build --target web
//! ```

pub mod browser;

use browser::{log, FetchSessionCreator, JsCheckoutRedirect, JsImageResolver, JsNavigator, JsToast};
use cart_core::{
    CartDrawer, CartError, CartLineItem, CartStore, CheckoutInitiator, CheckoutOutcome, Currency,
    Price,
};
use js_sys::{Function, Promise};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

type BrowserCheckout = CheckoutInitiator<FetchSessionCreator, JsCheckoutRedirect, JsToast>;

/// The storefront's cart, owned by the page
#[wasm_bindgen]
pub struct WasmCart {
    drawer: CartDrawer<JsImageResolver, JsNavigator>,
    checkout: Rc<BrowserCheckout>,
}

#[wasm_bindgen]
impl WasmCart {
    #[wasm_bindgen(constructor)]
    pub fn new(
        endpoint_url: String,
        redirect_to_checkout: Function,
        toast: Function,
        resolve_image: Function,
        navigate: Function,
    ) -> Self {
        let store = CartStore::new(Currency::USD);
        let drawer = CartDrawer::new(
            store.handle(),
            JsImageResolver::new(resolve_image),
            JsNavigator::new(navigate),
        );
        let checkout = CheckoutInitiator::new(
            FetchSessionCreator::new(endpoint_url),
            JsCheckoutRedirect::new(redirect_to_checkout),
            JsToast::new(toast),
        );

        Self {
            drawer,
            checkout: Rc::new(checkout),
        }
    }

    /// Add a line (`{ _id, name, price, quantity, image? }`), merging by id.
    /// `price` is in cents; the line and the merged quantity must stay within
    /// the cart's caps.
    pub fn add_item(&self, item: JsValue) -> Result<(), JsValue> {
        let item: CartLineItem = serde_wasm_bindgen::from_value(item)
            .map_err(|e| JsValue::from_str(&format!("Invalid cart item: {}", e)))?;
        self.drawer.cart().add_item(item).map_err(to_js_error)
    }

    pub fn remove_item(&self, item_id: &str) {
        self.drawer.remove(item_id);
    }

    /// Throws when the line is already at its quantity cap
    pub fn increment(&self, item_id: &str) -> Result<(), JsValue> {
        self.drawer.increment(item_id).map_err(to_js_error)
    }

    pub fn decrement(&self, item_id: &str) -> Result<(), JsValue> {
        self.drawer.decrement(item_id).map_err(to_js_error)
    }

    pub fn clear(&self) {
        self.drawer.cart().clear();
    }

    pub fn set_visible(&self, visible: bool) {
        self.drawer.cart().set_visible(visible);
    }

    pub fn continue_shopping(&self) {
        self.drawer.continue_shopping();
    }

    #[wasm_bindgen(getter)]
    pub fn total_quantity(&self) -> u64 {
        self.drawer.cart().total_quantity()
    }

    #[wasm_bindgen(getter)]
    pub fn total_price_cents(&self) -> i64 {
        self.drawer.cart().total_price().amount
    }

    #[wasm_bindgen(getter)]
    pub fn is_visible(&self) -> bool {
        self.drawer.cart().is_visible()
    }

    /// Drawer view-model as a plain JS object
    pub fn view(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.drawer.view())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Start checkout. Resolves to the session id, or `null` when the
    /// attempt failed (the flow is back at Idle).
    pub fn checkout(&self) -> Promise {
        let checkout = Rc::clone(&self.checkout);
        let cart = self.drawer.cart().clone();

        future_to_promise(async move {
            match checkout.checkout(&cart).await {
                CheckoutOutcome::Success(session_id) => Ok(JsValue::from_str(&session_id)),
                CheckoutOutcome::Failure(err) => {
                    log(&format!("checkout did not start: {}", err));
                    Ok(JsValue::NULL)
                }
            }
        })
    }
}

fn to_js_error(err: CartError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Format a price in cents to display string
#[wasm_bindgen]
pub fn format_price(cents: i64) -> String {
    Price::from_cents(cents, Currency::USD).display()
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
