//! # Cart Drawer
//!
//! Framework-agnostic view-model for the slide-out cart. A renderer turns
//! [`DrawerView`] into markup; user events come back as calls on
//! [`CartDrawer`], which forwards them to the store.

use crate::error::CartResult;
use crate::item::CartLineItem;
use crate::price::Price;
use crate::store::{CartHandle, CartState, Direction};
use serde::Serialize;

/// Path of the main catalog view
pub const CATALOG_PATH: &str = "/";

/// Resolves an image reference to a displayable URL
pub trait ImageResolver {
    fn resolve(&self, image_ref: &str) -> String;
}

/// Client-side navigation
pub trait Navigator {
    fn navigate(&self, path: &str);
}

/// One rendered cart line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub quantity: u32,
    pub image_url: Option<String>,
}

/// What the drawer body shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawerBody {
    /// Empty bag with a single "Continue Shopping" action
    Empty { message: String, action_label: String },
    /// Lines, subtotal and the pay action
    Lines {
        lines: Vec<LineView>,
        subtotal: String,
        pay_label: String,
    },
}

/// Everything needed to render the drawer once
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawerView {
    pub heading: String,
    pub item_count: String,
    pub visible: bool,
    pub body: DrawerBody,
}

impl DrawerView {
    pub fn render(state: &CartState, images: &impl ImageResolver) -> Self {
        let body = if state.is_empty() {
            DrawerBody::Empty {
                message: "Your shopping bag is empty".to_string(),
                action_label: "Continue Shopping".to_string(),
            }
        } else {
            DrawerBody::Lines {
                lines: state
                    .items()
                    .iter()
                    .map(|item| line_view(item, state, images))
                    .collect(),
                subtotal: state.total_price().display(),
                pay_label: "Pay with stripe".to_string(),
            }
        };

        Self {
            heading: "Your Cart".to_string(),
            item_count: format!("({} items)", state.total_quantity()),
            visible: state.is_visible(),
            body,
        }
    }

    /// The pay action is only offered when there is something to pay for
    pub fn can_pay(&self) -> bool {
        matches!(self.body, DrawerBody::Lines { .. })
    }

    pub fn shows_empty_affordance(&self) -> bool {
        matches!(self.body, DrawerBody::Empty { .. })
    }
}

fn line_view(item: &CartLineItem, state: &CartState, images: &impl ImageResolver) -> LineView {
    LineView {
        id: item.id.clone(),
        name: item.name.clone(),
        price: Price::from_cents(item.unit_price(), state.currency()).display(),
        quantity: item.quantity.get(),
        image_url: item.image_ref.as_deref().map(|r| images.resolve(r)),
    }
}

/// Event entry points for the drawer
pub struct CartDrawer<I, V> {
    cart: CartHandle,
    images: I,
    navigator: V,
}

impl<I: ImageResolver, V: Navigator> CartDrawer<I, V> {
    pub fn new(cart: CartHandle, images: I, navigator: V) -> Self {
        Self {
            cart,
            images,
            navigator,
        }
    }

    pub fn view(&self) -> DrawerView {
        DrawerView::render(&self.cart.snapshot(), &self.images)
    }

    pub fn open(&self) {
        self.cart.set_visible(true);
    }

    /// Heading click or a click outside the drawer
    pub fn close(&self) {
        self.cart.set_visible(false);
    }

    /// Fails when the line is already at its quantity cap
    pub fn increment(&self, item_id: &str) -> CartResult<()> {
        self.cart.adjust_quantity(item_id, Direction::Increment)
    }

    pub fn decrement(&self, item_id: &str) -> CartResult<()> {
        self.cart.adjust_quantity(item_id, Direction::Decrement)
    }

    pub fn remove(&self, item_id: &str) {
        self.cart.remove_item(item_id);
    }

    /// Back to the catalog, dismissing the drawer
    pub fn continue_shopping(&self) {
        self.cart.set_visible(false);
        self.navigator.navigate(CATALOG_PATH);
    }

    pub fn cart(&self) -> &CartHandle {
        &self.cart
    }
}
