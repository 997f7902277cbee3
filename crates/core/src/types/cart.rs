//! Cart types, cart codes and quantity drafts.

use std::collections::HashMap;

use core::fmt;

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::CartItemId;
use super::money::{delivery_charge_for, format_inr};
use super::product::Product;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 6;

/// Opaque code identifying a shopping session on the API.
///
/// Generated locally as `cart_<base36 millis>_<6 base36 chars>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartCode(String);

impl CartCode {
    /// Wrap an existing code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Generate a fresh code from the current time and the thread RNG.
    #[must_use]
    pub fn generate() -> Self {
        let millis = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default();
        let mut rng = rand::rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| base36_digit(rng.random_range(0..BASE36.len())))
            .collect();
        Self::from_parts(millis, &suffix)
    }

    /// Build a code from its timestamp and random suffix.
    #[must_use]
    pub fn from_parts(millis: u64, suffix: &str) -> Self {
        Self(format!("cart_{}_{suffix}", to_base36(millis)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CartCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_owned();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(base36_digit(usize::try_from(value % 36).unwrap_or_default()));
        value /= 36;
    }
    digits.iter().rev().collect()
}

fn base36_digit(index: usize) -> char {
    char::from(BASE36.get(index).copied().unwrap_or(b'0'))
}

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub quantity: u32,
    pub product: Product,
    #[serde(default)]
    pub sub_total: Option<Decimal>,
}

impl CartItem {
    /// Line total derived from quantity and unit price.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.product.price
    }
}

/// A cart as returned by the cart endpoints.
///
/// `cart_total` is kept as received; displayed totals are always derived from
/// the items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub cart_code: Option<CartCode>,
    #[serde(default)]
    pub cartitems: Vec<CartItem>,
    #[serde(default)]
    pub cart_total: Option<Decimal>,
}

impl Cart {
    /// An empty cart under the given code.
    #[must_use]
    pub const fn empty(code: CartCode) -> Self {
        Self {
            cart_code: Some(code),
            cartitems: Vec::new(),
            cart_total: None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cartitems.is_empty()
    }

    /// Sum of quantity times unit price over all items.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.cartitems.iter().map(CartItem::line_total).sum()
    }

    /// Total number of units, shown on the navbar badge.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cartitems.iter().map(|item| item.quantity).sum()
    }

    /// Set one item's quantity. Returns whether the item exists.
    pub fn set_quantity(&mut self, item_id: CartItemId, quantity: u32) -> bool {
        let Some(item) = self.cartitems.iter_mut().find(|item| item.id == item_id) else {
            return false;
        };
        item.quantity = quantity;
        self.cart_total = Some(self.subtotal());
        true
    }

    /// Drop one item. Returns whether anything was removed.
    pub fn remove_item(&mut self, item_id: CartItemId) -> bool {
        let before = self.cartitems.len();
        self.cartitems.retain(|item| item.id != item_id);
        let removed = self.cartitems.len() != before;
        if removed {
            self.cart_total = Some(self.subtotal());
        }
        removed
    }

    /// Empty the cart, keeping its code.
    pub fn clear(&mut self) {
        self.cartitems.clear();
        self.cart_total = Some(Decimal::ZERO);
    }

    /// Totals shown on the cart page.
    #[must_use]
    pub fn bill(&self) -> Bill {
        Bill::for_subtotal(self.subtotal())
    }
}

/// Subtotal, delivery charge and grand total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bill {
    pub subtotal: Decimal,
    pub delivery_charge: Decimal,
    pub total: Decimal,
}

impl Bill {
    #[must_use]
    pub fn for_subtotal(subtotal: Decimal) -> Self {
        let delivery_charge = delivery_charge_for(subtotal);
        Self {
            subtotal,
            delivery_charge,
            total: subtotal + delivery_charge,
        }
    }

    #[must_use]
    pub fn subtotal_display(&self) -> String {
        format_inr(self.subtotal)
    }

    #[must_use]
    pub fn delivery_display(&self) -> String {
        format_inr(self.delivery_charge)
    }

    #[must_use]
    pub fn total_display(&self) -> String {
        format_inr(self.total)
    }
}

/// Direction of a quantity stepper press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityStep {
    Increment,
    Decrement,
}

/// Uncommitted quantity inputs, keyed by cart item.
///
/// Drafts are free text until committed; committing clamps them to a valid
/// quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuantityDrafts(HashMap<CartItemId, String>);

impl QuantityDrafts {
    /// Seed drafts from the committed quantities of a cart.
    #[must_use]
    pub fn seed(cart: &Cart) -> Self {
        Self(
            cart.cartitems
                .iter()
                .map(|item| (item.id, item.quantity.to_string()))
                .collect(),
        )
    }

    /// Replace the draft for one item.
    pub fn set(&mut self, item_id: CartItemId, draft: impl Into<String>) {
        self.0.insert(item_id, draft.into());
    }

    /// Current draft text for an item.
    #[must_use]
    pub fn get(&self, item_id: CartItemId) -> &str {
        self.0.get(&item_id).map_or("", String::as_str)
    }

    /// Parse a draft into a quantity of at least one.
    ///
    /// Blank or non-numeric drafts become 1, fractions are truncated and
    /// anything below 1 is clamped to 1.
    #[must_use]
    pub fn commit(draft: &str) -> u32 {
        let parsed = draft.trim().parse::<f64>().unwrap_or(0.0);
        if !parsed.is_finite() || parsed < 1.0 {
            return 1;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let whole = parsed.trunc().min(f64::from(u32::MAX)) as u32;
        whole.max(1)
    }

    /// Quantity after a stepper press, or `None` when the step would go
    /// below 1.
    #[must_use]
    pub fn step(draft: &str, step: QuantityStep) -> Option<u32> {
        let current = Self::commit(draft);
        match step {
            QuantityStep::Increment => current.checked_add(1),
            QuantityStep::Decrement => current.checked_sub(1).filter(|next| *next >= 1),
        }
    }
}
