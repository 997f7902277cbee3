//! Wishlist screen and the wishlist toggle shared by product cards.

use madstore_core::ProductId;
use tracing::instrument;

use super::{Outcome, ViewScope, failure_message};
use crate::api::{ApiClient, ApiError};
use crate::store::{Store, StoreAction, StorePersistence};

/// Notice shown when a guest tries to use the wishlist inline.
pub const SIGN_IN_FOR_WISHLIST: &str = "Please sign in to manage your wishlist.";

/// How a screen treats a guest pressing the wishlist heart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestPolicy {
    /// Send the guest to the login screen.
    Redirect,
    /// Keep the guest on the screen with [`SIGN_IN_FOR_WISHLIST`].
    Notice,
}

impl GuestPolicy {
    fn outcome(self) -> Outcome {
        match self {
            Self::Redirect => Outcome::login(),
            Self::Notice => Outcome::Notice(SIGN_IN_FOR_WISHLIST.to_string()),
        }
    }
}

/// Reload the signed-in user's wishlist into the store.
///
/// Guests are skipped. An answer that is not a list leaves the wishlist as is.
///
/// # Errors
///
/// Returns the API error; callers decide whether to show or swallow it.
pub async fn refresh<P: StorePersistence>(
    api: &ApiClient,
    store: &mut Store<P>,
    scope: &ViewScope,
) -> Result<(), ApiError> {
    if !store.state().is_signed_in() {
        return Ok(());
    }
    let email = store.state().request_email().to_string();
    if let Some(wishlist) = scope.run(api.wishlist(&email)).await? {
        store.dispatch(StoreAction::WishlistReplaced(wishlist));
    }
    Ok(())
}

/// Reload the wishlist, keeping the last-known one on failure.
pub async fn refresh_quietly<P: StorePersistence>(
    api: &ApiClient,
    store: &mut Store<P>,
    scope: &ViewScope,
) {
    match refresh(api, store, scope).await {
        Ok(()) | Err(ApiError::Cancelled) => {}
        Err(e) => tracing::warn!(error = %e, "Wishlist refresh failed, keeping local wishlist"),
    }
}

/// Toggle a product's wishlist membership.
///
/// An entry in the answer is appended; an empty answer removes the product.
#[instrument(skip(api, store, scope))]
pub async fn toggle<P: StorePersistence>(
    api: &ApiClient,
    store: &mut Store<P>,
    scope: &ViewScope,
    product_id: ProductId,
    guest: GuestPolicy,
) -> Outcome {
    if !store.state().is_signed_in() {
        return guest.outcome();
    }

    let email = store.state().request_email().to_string();
    match scope.run(api.toggle_wishlist(&email, product_id)).await {
        Ok(Some(entry)) => {
            store.dispatch(StoreAction::WishlistEntryAdded(entry));
            Outcome::Done
        }
        Ok(None) => {
            store.dispatch(StoreAction::WishlistProductRemoved(product_id));
            Outcome::Done
        }
        Err(ApiError::Cancelled) => Outcome::Done,
        Err(e) => Outcome::failed(&e, "Failed to update wishlist"),
    }
}

/// Remove a product from the wishlist screen.
///
/// The entry is dropped locally once the API accepts the toggle, whatever it
/// answers. Guests are turned away before any request.
#[instrument(skip(api, store, scope))]
pub async fn remove<P: StorePersistence>(
    api: &ApiClient,
    store: &mut Store<P>,
    scope: &ViewScope,
    product_id: ProductId,
    guest: GuestPolicy,
) -> Outcome {
    if !store.state().is_signed_in() {
        return guest.outcome();
    }

    let email = store.state().request_email().to_string();
    match scope.run(api.toggle_wishlist(&email, product_id)).await {
        Ok(_) => {
            store.dispatch(StoreAction::WishlistProductRemoved(product_id));
            Outcome::Done
        }
        Err(ApiError::Cancelled) => Outcome::Done,
        Err(e) => Outcome::failed(&e, "Failed to remove item from wishlist"),
    }
}

/// The wishlist screen's model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WishlistPage {
    pub signed_in: bool,
    pub error: Option<String>,
}

/// Load the wishlist screen. Guests see a sign-in panel and nothing is
/// fetched.
pub async fn page<P: StorePersistence>(
    api: &ApiClient,
    store: &mut Store<P>,
    scope: &ViewScope,
) -> WishlistPage {
    if !store.state().is_signed_in() {
        return WishlistPage::default();
    }
    let error = match refresh(api, store, scope).await {
        Ok(()) | Err(ApiError::Cancelled) => None,
        Err(e) => Some(failure_message(
            &e,
            "Wishlist endpoint did not accept query params. Showing local data.",
        )),
    };
    WishlistPage {
        signed_in: true,
        error,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::{MemoryPersistence, Snapshot};
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;
    use madstore_core::{CartCode, Email, User};
    use serde_json::json;

    async fn signed_in_store() -> Store<MemoryPersistence> {
        let persistence = MemoryPersistence::new(Snapshot {
            cart_code: Some(CartCode::new("c1")),
            user: Some(User {
                id: None,
                email: Email::parse("jane@example.com").unwrap(),
                first_name: None,
                last_name: None,
                profile_picture_url: None,
            }),
            ..Snapshot::default()
        });
        Store::open(persistence).await.unwrap()
    }

    async fn guest_store() -> Store<MemoryPersistence> {
        Store::open(MemoryPersistence::default()).await.unwrap()
    }

    #[tokio::test]
    async fn test_guest_toggle_policies() {
        let api = ApiClient::new("http://127.0.0.1:9/");
        let mut store = guest_store().await;
        let scope = ViewScope::new();

        let redirect = toggle(&api, &mut store, &scope, ProductId::new(1), GuestPolicy::Redirect).await;
        assert_eq!(redirect, Outcome::login());

        let notice = toggle(&api, &mut store, &scope, ProductId::new(1), GuestPolicy::Notice).await;
        assert_eq!(notice, Outcome::Notice(SIGN_IN_FOR_WISHLIST.into()));
    }

    #[tokio::test]
    async fn test_guest_remove_sends_nothing() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/add_to_wishlist/");
                then.status(200).json_body(json!("Removed from wishlist"));
            })
            .await;

        let api = ApiClient::new(server.url("/"));
        let mut store = guest_store().await;
        let outcome = remove(
            &api,
            &mut store,
            &ViewScope::new(),
            ProductId::new(4),
            GuestPolicy::Redirect,
        )
        .await;
        assert_eq!(outcome, Outcome::login());
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_membership() {
        let server = MockServer::start_async().await;
        let mut add = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/add_to_wishlist/")
                    .json_body(json!({"email": "jane@example.com", "product_id": 4}));
                then.status(200).json_body(json!({
                    "id": 9,
                    "product": {"id": 4, "slug": "tee", "name": "Tee", "price": "10"}
                }));
            })
            .await;

        let api = ApiClient::new(server.url("/"));
        let mut store = signed_in_store().await;
        let scope = ViewScope::new();
        let before = store.state().wishlist.clone();

        let first = toggle(&api, &mut store, &scope, ProductId::new(4), GuestPolicy::Notice).await;
        assert_eq!(first, Outcome::Done);
        assert!(store.state().wishlist.contains(ProductId::new(4)));

        add.delete_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/add_to_wishlist/");
                then.status(200).json_body(json!("Removed from wishlist"));
            })
            .await;

        toggle(&api, &mut store, &scope, ProductId::new(4), GuestPolicy::Notice).await;
        assert_eq!(store.state().wishlist, before);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_wishlist_quietly() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/wishlist_item/");
                then.status(500).json_body(json!({"error": "down"}));
            })
            .await;

        let api = ApiClient::new(server.url("/"));
        let mut store = signed_in_store().await;
        let scope = ViewScope::new();
        refresh_quietly(&api, &mut store, &scope).await;
        assert!(store.state().wishlist.is_empty());

        let page = page(&api, &mut store, &scope).await;
        assert!(page.signed_in);
        assert_eq!(page.error.as_deref(), Some("down"));
    }

    #[tokio::test]
    async fn test_guest_page_fetches_nothing() {
        let api = ApiClient::new("http://127.0.0.1:9/");
        let mut store = guest_store().await;
        let page = page(&api, &mut store, &ViewScope::new()).await;
        assert_eq!(page, WishlistPage::default());
    }
}
