//! Wishlist endpoints.

use madstore_core::{ProductId, Wishlist, WishlistItem};
use serde_json::Value;
use tracing::instrument;

use super::types::WishlistRequest;
use super::{ApiClient, ApiError, decode, decode_list, is_truthy};

impl ApiClient {
    /// The wishlist for an email, or `None` when the answer is not a list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn wishlist(&self, email: &str) -> Result<Option<Wishlist>, ApiError> {
        let path = format!("wishlist_item/?email={}", urlencoding::encode(email));
        let payload = self.get(&path).await?;
        if !payload.is_array() {
            return Ok(None);
        }
        decode_list("wishlist_item/", payload).map(|items| Some(Wishlist::new(items)))
    }

    /// Toggle a product on the wishlist.
    ///
    /// Returns the new entry when the product was added and `None` when it
    /// was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or an added entry is malformed.
    #[instrument(skip(self))]
    pub async fn toggle_wishlist(
        &self,
        email: &str,
        product_id: ProductId,
    ) -> Result<Option<WishlistItem>, ApiError> {
        let request = WishlistRequest { email, product_id };
        let payload = self.post_json("add_to_wishlist/", &request).await?;
        if added_entry(&payload) {
            decode("add_to_wishlist/", payload).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// An added entry is an object with a truthy `id`; removal answers with text.
fn added_entry(payload: &Value) -> bool {
    payload.get("id").is_some_and(is_truthy)
}
