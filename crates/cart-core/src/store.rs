//! # Cart State Store
//!
//! The single owner of cart contents. Views never touch `CartState`
//! mutably; they dispatch a [`CartCommand`] through a [`CartHandle`] and read
//! snapshots back.
//!
//! ```text
//!   view ──CartCommand──▶ CartHandle ──send_if_modified──▶ watch::Sender<CartState>
//!   view ◀──snapshot / watch::Receiver────────────────────────────┘
//! ```
//!
//! The watch channel serializes writers, so the store is safe to share even
//! though the storefront itself runs every mutation on one event loop.

use crate::error::CartResult;
use crate::item::CartLineItem;
use crate::price::{Currency, Price};
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Direction of a quantity adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increment,
    Decrement,
}

/// Every mutation the cart accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartCommand {
    /// Add an item, merging quantity into an existing line with the same id
    Add(CartLineItem),
    /// Remove the line with this id (no-op if absent)
    Remove { item_id: String },
    /// Step the quantity of a line by one (no-op if absent)
    AdjustQuantity { item_id: String, direction: Direction },
    /// Show or hide the drawer
    SetVisible(bool),
    /// Drop every line
    Clear,
}

/// Cart contents plus derived totals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartState {
    items: Vec<CartLineItem>,
    total_quantity: u64,
    total_price: i64,
    is_visible: bool,
    currency: Currency,
}

impl CartState {
    /// Empty, hidden cart
    pub fn new(currency: Currency) -> Self {
        Self {
            items: Vec::new(),
            total_quantity: 0,
            total_price: 0,
            is_visible: false,
            currency,
        }
    }

    /// Build a state from existing lines (duplicates by id are merged)
    pub fn with_items(
        currency: Currency,
        items: impl IntoIterator<Item = CartLineItem>,
    ) -> CartResult<Self> {
        let mut state = Self::new(currency);
        for item in items {
            state.apply(CartCommand::Add(item))?;
        }
        Ok(state)
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn item(&self, item_id: &str) -> Option<&CartLineItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn total_quantity(&self) -> u64 {
        self.total_quantity
    }

    pub fn total_price(&self) -> Price {
        Price::from_cents(self.total_price, self.currency)
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Apply a command. Returns true if anything changed.
    ///
    /// A rejected command (invalid line, quantity past the line cap) leaves
    /// the state untouched.
    pub fn apply(&mut self, command: CartCommand) -> CartResult<bool> {
        let changed = match command {
            CartCommand::Add(item) => {
                item.validate()?;
                match self.items.iter_mut().find(|i| i.id == item.id) {
                    Some(existing) => existing.merge_quantity(item.quantity)?,
                    None => self.items.push(item),
                }
                true
            }
            CartCommand::Remove { item_id } => {
                let before = self.items.len();
                self.items.retain(|i| i.id != item_id);
                self.items.len() != before
            }
            CartCommand::AdjustQuantity { item_id, direction } => {
                match self.items.iter_mut().find(|i| i.id == item_id) {
                    Some(item) => {
                        let before = item.quantity;
                        match direction {
                            Direction::Increment => item.increment()?,
                            Direction::Decrement => item.decrement(),
                        }
                        item.quantity != before
                    }
                    None => false,
                }
            }
            CartCommand::SetVisible(visible) => {
                let changed = self.is_visible != visible;
                self.is_visible = visible;
                changed
            }
            CartCommand::Clear => {
                let changed = !self.items.is_empty();
                self.items.clear();
                changed
            }
        };
        if changed {
            self.recompute();
        }
        Ok(changed)
    }

    fn recompute(&mut self) {
        self.total_quantity = self
            .items
            .iter()
            .map(|i| u64::from(i.quantity.get()))
            .sum();
        self.total_price = self
            .items
            .iter()
            .map(CartLineItem::line_total)
            .fold(0, i64::saturating_add);
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::new(Currency::default())
    }
}

/// Owner of the process-wide cart
///
/// Create one at application start and hand out [`CartHandle`]s.
#[derive(Debug)]
pub struct CartStore {
    handle: CartHandle,
}

impl CartStore {
    /// Create an empty store
    pub fn new(currency: Currency) -> Self {
        Self::from_state(CartState::new(currency))
    }

    /// Create a store seeded with a state
    pub fn from_state(state: CartState) -> Self {
        let (tx, _rx) = watch::channel(state);
        Self {
            handle: CartHandle { tx: Arc::new(tx) },
        }
    }

    /// Handle for dispatching commands and reading snapshots
    pub fn handle(&self) -> CartHandle {
        self.handle.clone()
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new(Currency::default())
    }
}

/// Cloneable access to the cart store
#[derive(Debug, Clone)]
pub struct CartHandle {
    tx: Arc<watch::Sender<CartState>>,
}

impl CartHandle {
    /// Apply a command. Subscribers are only woken when something changed.
    pub fn dispatch(&self, command: CartCommand) -> CartResult<bool> {
        debug!(?command, "cart command");
        let mut outcome = Ok(false);
        self.tx.send_if_modified(|state| {
            outcome = state.apply(command);
            matches!(outcome, Ok(true))
        });
        if let Err(ref err) = outcome {
            warn!(error = %err, "cart command rejected");
        }
        outcome
    }

    pub fn add_item(&self, item: CartLineItem) -> CartResult<()> {
        self.dispatch(CartCommand::Add(item)).map(|_| ())
    }

    /// Returns true if a line was removed
    pub fn remove_item(&self, item_id: &str) -> bool {
        self.dispatch(CartCommand::Remove {
            item_id: item_id.to_string(),
        })
        .unwrap_or(false)
    }

    pub fn adjust_quantity(&self, item_id: &str, direction: Direction) -> CartResult<()> {
        self.dispatch(CartCommand::AdjustQuantity {
            item_id: item_id.to_string(),
            direction,
        })
        .map(|_| ())
    }

    pub fn set_visible(&self, visible: bool) -> bool {
        self.dispatch(CartCommand::SetVisible(visible))
            .unwrap_or(false)
    }

    pub fn clear(&self) -> bool {
        self.dispatch(CartCommand::Clear).unwrap_or(false)
    }

    /// Owned copy of the current state
    pub fn snapshot(&self) -> CartState {
        self.tx.borrow().clone()
    }

    /// Owned copy of the current items, detached from later mutations
    pub fn items(&self) -> Vec<CartLineItem> {
        self.tx.borrow().items().to_vec()
    }

    pub fn total_quantity(&self) -> u64 {
        self.tx.borrow().total_quantity()
    }

    pub fn total_price(&self) -> Price {
        self.tx.borrow().total_price()
    }

    pub fn is_visible(&self) -> bool {
        self.tx.borrow().is_visible()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    /// Quantity of one line, if present
    pub fn quantity_of(&self, item_id: &str) -> Option<NonZeroU32> {
        self.tx.borrow().item(item_id).map(|i| i.quantity)
    }

    /// Receiver that is notified on every effective mutation
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CartError;
    use crate::item::{MAX_LINE_QUANTITY, MAX_UNIT_PRICE};

    fn item(id: &str, cents: i64, qty: u32) -> CartLineItem {
        CartLineItem::new(id, id.to_uppercase(), cents)
            .unwrap()
            .with_quantity(NonZeroU32::new(qty).unwrap())
    }

    fn seeded() -> CartHandle {
        let state =
            CartState::with_items(Currency::USD, [item("a", 1000, 1), item("b", 500, 2)]).unwrap();
        CartStore::from_state(state).handle()
    }

    fn adjust(item_id: &str, direction: Direction) -> CartCommand {
        CartCommand::AdjustQuantity {
            item_id: item_id.into(),
            direction,
        }
    }

    fn assert_totals_consistent(cart: &CartHandle) {
        let state = cart.snapshot();
        let qty: u64 = state
            .items()
            .iter()
            .map(|i| u64::from(i.quantity.get()))
            .sum();
        let price: i64 = state
            .items()
            .iter()
            .map(|i| i.unit_price() * i64::from(i.quantity.get()))
            .sum();
        assert_eq!(state.total_quantity(), qty);
        assert_eq!(state.total_price().amount, price);
    }

    #[test]
    fn test_seeded_totals() {
        let cart = seeded();
        assert_eq!(cart.total_price().amount, 2000);
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn test_increment() {
        let cart = seeded();
        cart.adjust_quantity("a", Direction::Increment).unwrap();

        assert_eq!(cart.quantity_of("a").unwrap().get(), 2);
        assert_eq!(cart.total_price().amount, 3000);
        assert_eq!(cart.total_quantity(), 4);
    }

    #[test]
    fn test_decrement_floors_and_never_removes() {
        let cart = seeded();
        cart.adjust_quantity("b", Direction::Decrement).unwrap();
        cart.adjust_quantity("b", Direction::Decrement).unwrap();

        assert_eq!(cart.quantity_of("b").unwrap().get(), 1);
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.total_price().amount, 1500);
    }

    #[test]
    fn test_many_decrements_never_below_one() {
        let cart = seeded();
        for _ in 0..50 {
            cart.adjust_quantity("a", Direction::Decrement).unwrap();
            cart.adjust_quantity("b", Direction::Decrement).unwrap();
            assert!(cart.quantity_of("a").unwrap().get() >= 1);
            assert!(cart.quantity_of("b").unwrap().get() >= 1);
        }
    }

    #[test]
    fn test_remove_only_item_empties_cart() {
        let state = CartState::with_items(Currency::USD, [item("a", 1000, 1)]).unwrap();
        let cart = CartStore::from_state(state).handle();
        assert!(cart.remove_item("a"));

        assert!(cart.is_empty());
        assert_eq!(cart.total_price().amount, 0);
        assert_eq!(cart.total_quantity(), 0);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let once = seeded();
        once.remove_item("a");

        let twice = seeded();
        assert!(twice.remove_item("a"));
        assert!(!twice.remove_item("a"));

        assert_eq!(once.snapshot(), twice.snapshot());
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let cart = seeded();
        let before = cart.snapshot();

        let removed = cart
            .dispatch(CartCommand::Remove {
                item_id: "zzz".into(),
            })
            .unwrap();
        assert!(!removed);
        assert!(!cart.dispatch(adjust("zzz", Direction::Increment)).unwrap());
        assert_eq!(cart.snapshot(), before);
    }

    #[test]
    fn test_add_merges_by_id() {
        let cart = seeded();
        cart.add_item(item("a", 1000, 2)).unwrap();

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.quantity_of("a").unwrap().get(), 3);
        assert_totals_consistent(&cart);
    }

    #[test]
    fn test_visibility_does_not_touch_totals() {
        let cart = seeded();
        assert!(cart.set_visible(true));

        assert!(cart.is_visible());
        assert_eq!(cart.total_price().amount, 2000);
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn test_clear() {
        let cart = seeded();
        assert!(cart.clear());
        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity(), 0);
    }

    #[test]
    fn test_totals_consistent_across_mixed_sequence() {
        let cart = seeded();
        let steps = [
            adjust("a", Direction::Increment),
            CartCommand::Add(item("c", 250, 4)),
            adjust("c", Direction::Decrement),
            CartCommand::Remove {
                item_id: "b".into(),
            },
            CartCommand::SetVisible(true),
            CartCommand::Remove {
                item_id: "b".into(),
            },
        ];
        for step in steps {
            cart.dispatch(step).unwrap();
            assert_totals_consistent(&cart);
        }
        assert_eq!(cart.total_price().amount, 2000 + 750);
    }

    #[test]
    fn test_lines_at_the_caps_keep_totals_exact() {
        let cart = CartStore::new(Currency::USD).handle();
        for id in ["a", "b", "c"] {
            cart.add_item(item(id, MAX_UNIT_PRICE, MAX_LINE_QUANTITY))
                .unwrap();
        }

        assert_totals_consistent(&cart);
        assert_eq!(cart.total_quantity(), 3 * u64::from(MAX_LINE_QUANTITY));
        assert_eq!(
            cart.total_price().amount,
            3 * MAX_UNIT_PRICE * i64::from(MAX_LINE_QUANTITY)
        );
    }

    #[test]
    fn test_increment_past_line_cap_is_rejected() {
        let cart = CartStore::new(Currency::USD).handle();
        cart.add_item(item("a", 100, MAX_LINE_QUANTITY)).unwrap();
        let before = cart.snapshot();
        let mut rx = cart.subscribe();

        let err = cart.adjust_quantity("a", Direction::Increment).unwrap_err();
        assert!(matches!(err, CartError::InvalidRequest(_)));
        assert!(cart.add_item(item("a", 100, 1)).is_err());

        assert_eq!(cart.snapshot(), before);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_oversized_lines_never_enter_the_cart() {
        let cart = seeded();
        let before = cart.snapshot();

        let huge_qty = item("x", 100, u32::MAX);
        assert!(cart.add_item(huge_qty).is_err());

        let raw = format!(
            r#"{{"_id":"y","name":"Y","price":{},"quantity":2}}"#,
            i64::MAX
        );
        let huge_price: CartLineItem = serde_json::from_str(&raw).unwrap();
        assert!(matches!(
            cart.add_item(huge_price),
            Err(CartError::InvalidPrice { .. })
        ));

        assert_eq!(cart.snapshot(), before);
        assert_totals_consistent(&cart);
    }

    #[test]
    fn test_seeding_with_an_invalid_line_fails() {
        let result = CartState::with_items(Currency::USD, [item("a", 100, u32::MAX)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let cart = seeded();
        let items = cart.items();
        cart.clear();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_subscribers_only_see_effective_changes() {
        let cart = seeded();
        let mut rx = cart.subscribe();
        assert!(!rx.has_changed().unwrap());

        cart.remove_item("missing");
        assert!(!rx.has_changed().unwrap());

        cart.adjust_quantity("a", Direction::Increment).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().total_quantity(), 4);
    }
}
