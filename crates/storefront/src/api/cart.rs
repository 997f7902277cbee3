//! Cart endpoints.

use madstore_core::{Cart, CartCode, CartItemId, ProductId};
use serde_json::Value;
use tracing::instrument;

use super::types::{AddToCartRequest, QuantityUpdate, UpdateQuantityRequest};
use super::{ApiClient, ApiError, decode, segment};

impl ApiClient {
    /// The server's view of a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self), fields(cart_code = %code))]
    pub async fn cart(&self, code: &CartCode) -> Result<Cart, ApiError> {
        let path = format!("cart/{}/", segment(code.as_str()));
        let payload = self.get(&path).await?;
        decode(&path, payload)
    }

    /// Add one unit of a product and return the whole cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self), fields(cart_code = %code))]
    pub async fn add_to_cart(&self, code: &CartCode, product_id: ProductId) -> Result<Cart, ApiError> {
        let request = AddToCartRequest {
            cart_code: code,
            product_id,
        };
        let payload = self.post_json("add_to_cart/", &request).await?;
        decode("add_to_cart/", payload)
    }

    /// Set an item's quantity. Returns the updated item, or `None` when the
    /// response carries no item.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<Option<QuantityUpdate>, ApiError> {
        let request = UpdateQuantityRequest { item_id, quantity };
        let payload = self
            .put_json("update_cartitem_quantity/", &request)
            .await?;
        let updated = updated_item(payload);
        decode("update_cartitem_quantity/", updated)
    }

    /// Delete a cart item.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_cart_item(&self, item_id: CartItemId) -> Result<(), ApiError> {
        self.delete(&format!("delete_cart_item/{item_id}/")).await?;
        Ok(())
    }
}

/// The updated item sits under `data`, or under the legacy `"data "` key.
fn updated_item(payload: Value) -> Value {
    let Value::Object(mut map) = payload else {
        return Value::Null;
    };
    map.remove("data")
        .filter(super::is_truthy)
        .or_else(|| map.remove("data "))
        .unwrap_or(Value::Null)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use httpmock::Method::{GET, POST, PUT};
    use httpmock::MockServer;
    use serde_json::json;

    #[test]
    fn test_updated_item_keys() {
        assert_eq!(
            updated_item(json!({"data": {"id": 1, "quantity": 2}})),
            json!({"id": 1, "quantity": 2})
        );
        assert_eq!(
            updated_item(json!({"data ": {"id": 1, "quantity": 3}})),
            json!({"id": 1, "quantity": 3})
        );
        assert_eq!(updated_item(json!({"message": "ok"})), Value::Null);
        assert_eq!(updated_item(Value::Null), Value::Null);
    }

    #[tokio::test]
    async fn test_cart_fetch() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/cart/cart_abc_123456/");
                then.status(200).json_body(json!({
                    "id": 1, "cart_code": "cart_abc_123456", "cart_total": 20.0,
                    "cartitems": [{"id": 5, "quantity": 2, "sub_total": 20.0,
                        "product": {"id": 1, "slug": "tee", "name": "Tee", "price": "10.00"}}]
                }));
            })
            .await;

        let api = ApiClient::new(server.url("/"));
        let cart = api.cart(&CartCode::new("cart_abc_123456")).await.unwrap();
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.cart_code, Some(CartCode::new("cart_abc_123456")));
    }

    #[tokio::test]
    async fn test_add_to_cart_sends_code_and_product() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/add_to_cart/")
                    .json_body(json!({"cart_code": "c1", "product_id": 7}));
                then.status(200)
                    .json_body(json!({"cart_code": "c1", "cartitems": [], "cart_total": 0}));
            })
            .await;

        let api = ApiClient::new(server.url("/"));
        let cart = api
            .add_to_cart(&CartCode::new("c1"), ProductId::new(7))
            .await
            .unwrap();
        assert!(cart.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_quantity_without_payload() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/update_cartitem_quantity/");
                then.status(200).json_body(json!({"message": "Cart updated successfully."}));
            })
            .await;

        let api = ApiClient::new(server.url("/"));
        let updated = api
            .update_quantity(CartItemId::new(1), 3)
            .await
            .unwrap();
        assert_eq!(updated, None);
    }
}
