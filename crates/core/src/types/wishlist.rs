//! Wishlist entries.

use serde::{Deserialize, Serialize};

use super::id::{ProductId, WishlistItemId};
use super::product::Product;

/// One saved product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub product: Product,
}

/// The user's wishlist; membership is keyed by product id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist(Vec<WishlistItem>);

impl Wishlist {
    #[must_use]
    pub const fn new(items: Vec<WishlistItem>) -> Self {
        Self(items)
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the product is saved.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.0.iter().any(|item| item.product.id == product_id)
    }

    /// Append an entry returned by the API.
    pub fn push(&mut self, item: WishlistItem) {
        self.0.push(item);
    }

    /// Drop every entry for the product. Returns whether anything was removed.
    pub fn remove_product(&mut self, product_id: ProductId) -> bool {
        let before = self.0.len();
        self.0.retain(|item| item.product.id != product_id);
        self.0.len() != before
    }
}
