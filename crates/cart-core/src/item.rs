//! # Line Items
//!
//! One product entry in the cart, with its own quantity.

use crate::error::{CartError, CartResult};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Largest quantity a single line may hold
pub const MAX_LINE_QUANTITY: u32 = 9_999;

/// Largest unit price accepted, in the smallest currency unit
///
/// Stripe caps `unit_amount` at eight digits.
pub const MAX_UNIT_PRICE: i64 = 99_999_999;

/// A line item in the cart
///
/// On the wire a line is `{ _id, name, price, quantity, image? }`. `price` is
/// an integer in the smallest currency unit (cents for USD), and `image` is a
/// single opaque reference that the page's image resolver turns into a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Product ID
    #[serde(rename = "_id")]
    pub id: String,

    /// Product name (denormalized for display)
    pub name: String,

    /// Unit price in the smallest currency unit
    #[serde(rename = "price")]
    unit_price: i64,

    /// Quantity, never zero
    pub quantity: NonZeroU32,

    /// Image reference for the external resolver
    #[serde(rename = "image", default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl CartLineItem {
    /// Create a line item with quantity 1
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        unit_price: i64,
    ) -> CartResult<Self> {
        let id = id.into();
        check_unit_price(&id, unit_price)?;
        Ok(Self {
            id,
            name: name.into(),
            unit_price,
            quantity: NonZeroU32::MIN,
            image_ref: None,
        })
    }

    /// Builder: set the quantity
    pub fn with_quantity(mut self, quantity: NonZeroU32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Builder: set the image reference
    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    /// Unit price in the smallest currency unit
    pub fn unit_price(&self) -> i64 {
        self.unit_price
    }

    /// Unit price times quantity
    ///
    /// Saturates instead of wrapping for lines that were never validated.
    pub fn line_total(&self) -> i64 {
        self.unit_price
            .saturating_mul(i64::from(self.quantity.get()))
    }

    pub(crate) fn increment(&mut self) -> CartResult<()> {
        self.merge_quantity(NonZeroU32::MIN)
    }

    /// Decrement, flooring at 1
    pub(crate) fn decrement(&mut self) {
        if let Some(q) = NonZeroU32::new(self.quantity.get() - 1) {
            self.quantity = q;
        }
    }

    /// Add `extra` to the quantity, leaving it untouched past the line cap
    pub(crate) fn merge_quantity(&mut self, extra: NonZeroU32) -> CartResult<()> {
        self.quantity = self
            .quantity
            .checked_add(extra.get())
            .filter(|q| q.get() <= MAX_LINE_QUANTITY)
            .ok_or_else(|| quantity_limit(&self.id))?;
        Ok(())
    }

    /// Reject items that bypassed `new` (deserialized or built with `with_quantity`)
    pub fn validate(&self) -> CartResult<()> {
        check_unit_price(&self.id, self.unit_price)?;
        if self.id.is_empty() {
            return Err(CartError::InvalidRequest("line item without an id".to_string()));
        }
        if self.quantity.get() > MAX_LINE_QUANTITY {
            return Err(quantity_limit(&self.id));
        }
        Ok(())
    }
}

fn check_unit_price(id: &str, unit_price: i64) -> CartResult<()> {
    if unit_price < 0 {
        return Err(CartError::InvalidPrice {
            message: format!("unit price for {} is negative ({})", id, unit_price),
        });
    }
    if unit_price > MAX_UNIT_PRICE {
        return Err(CartError::InvalidPrice {
            message: format!(
                "unit price for {} exceeds {} ({})",
                id, MAX_UNIT_PRICE, unit_price
            ),
        });
    }
    Ok(())
}

fn quantity_limit(id: &str) -> CartError {
    CartError::InvalidRequest(format!(
        "quantity for {} cannot exceed {}",
        id, MAX_LINE_QUANTITY
    ))
}
