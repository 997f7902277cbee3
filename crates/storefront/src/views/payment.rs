//! Card payment result screens.

use madstore_core::CartCode;
use tracing::instrument;

use super::ViewScope;
use crate::api::{ApiClient, ApiError};
use crate::store::{Store, StoreAction, StoreError, StorePersistence};

/// Finish a successful card payment.
///
/// The cart restarts under a fresh code, saved before anything else is
/// awaited. With a `session_id` the API is then asked to finalize the order;
/// a failure there is only logged since the payment provider's webhook can
/// still finalize it.
///
/// # Errors
///
/// Returns `StoreError` if the rotated code cannot be saved.
#[instrument(skip(api, store, scope))]
pub async fn success<P: StorePersistence>(
    api: &ApiClient,
    store: &mut Store<P>,
    scope: &ViewScope,
    session_id: Option<&str>,
) -> Result<CartCode, StoreError> {
    let next_code = CartCode::generate();
    store.dispatch(StoreAction::CartCodeRotated {
        next_code: next_code.clone(),
    });
    store.save().await?;

    if let Some(session_id) = session_id.filter(|id| !id.is_empty()) {
        match scope.run(api.finalize_checkout(session_id)).await {
            Ok(()) | Err(ApiError::Cancelled) => {}
            Err(e) => tracing::warn!(error = %e, "Checkout finalize failed, leaving it to the webhook"),
        }
    }
    Ok(next_code)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::{MemoryPersistence, Snapshot};
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use madstore_core::{Cart, CartItem, CartItemId, Product};
    use serde_json::json;
    use std::time::Duration;

    async fn store_with_items() -> Store<MemoryPersistence> {
        Store::open(MemoryPersistence::new(Snapshot {
            cart: Some(Cart {
                cart_code: Some(CartCode::new("c1")),
                cartitems: vec![CartItem {
                    id: CartItemId::new(1),
                    quantity: 1,
                    product: Product::default(),
                    sub_total: None,
                }],
                cart_total: None,
            }),
            cart_code: Some(CartCode::new("c1")),
            ..Snapshot::default()
        }))
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_success_rotates_code_and_finalizes() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/checkout/finalize/")
                    .json_body(json!({"session_id": "cs_1"}));
                then.status(200).json_body(json!({"message": "Order finalized."}));
            })
            .await;

        let api = ApiClient::new(server.url("/"));
        let mut store = store_with_items().await;
        let next = success(&api, &mut store, &ViewScope::new(), Some("cs_1"))
            .await
            .unwrap();
        assert_ne!(next.as_str(), "c1");
        assert!(store.state().cart.is_empty());
        assert_eq!(store.state().cart.cart_code, Some(next));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_finalize_failure_is_swallowed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/checkout/finalize/");
                then.status(400).json_body(json!({"error": "Payment not completed."}));
            })
            .await;

        let api = ApiClient::new(server.url("/"));
        let mut store = store_with_items().await;
        success(&api, &mut store, &ViewScope::new(), Some("cs_1"))
            .await
            .unwrap();
        assert!(store.state().cart.is_empty());
    }

    #[tokio::test]
    async fn test_rotation_is_saved_before_finalize_completes() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/checkout/finalize/");
                then.status(200)
                    .delay(Duration::from_secs(5))
                    .json_body(json!({"message": "Order finalized."}));
            })
            .await;

        let api = ApiClient::new(server.url("/"));
        let persistence = MemoryPersistence::new(Snapshot {
            cart_code: Some(CartCode::new("c1")),
            ..Snapshot::default()
        });
        let mut store = Store::open(persistence.clone()).await.unwrap();

        // The request goes away while finalize is still pending
        let scope = ViewScope::new();
        let handler = success(&api, &mut store, &scope, Some("cs_1"));
        let finished = tokio::time::timeout(Duration::from_millis(200), handler).await;
        assert!(finished.is_err());

        let stored = persistence.snapshot();
        assert_ne!(stored.cart_code, Some(CartCode::new("c1")));
        assert!(stored.cart.unwrap().is_empty());
    }
}
