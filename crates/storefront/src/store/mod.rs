//! Client store: cart, wishlist, user, active email and cart code.
//!
//! # Architecture
//!
//! - [`StoreState`] is a plain state container changed only through
//!   [`StoreState::reduce`]
//! - [`Store`] pairs the state with a [`StorePersistence`] adapter and tracks
//!   which persisted keys changed
//! - [`Store::save`] is the explicit save point of a request; it writes only
//!   the keys that changed, so concurrent requests of one browser do not undo
//!   each other
//!
//! # Example
//!
//! ```rust,ignore
//! let mut store = Store::open(SessionPersistence::new(session)).await?;
//! store.reconcile_cart(state.api(), &scope).await;
//! store.dispatch(StoreAction::CartEmptied);
//! store.save().await?;
//! ```

pub mod persistence;

use madstore_core::{
    Cart, CartCode, CartItemId, Email, ProductId, User, Wishlist, WishlistItem,
};
use thiserror::Error;

pub use persistence::{
    DirtyKeys, MemoryPersistence, SessionPersistence, Snapshot, StorePersistence,
};

use crate::api::{ApiClient, ApiError};
use crate::views::ViewScope;

/// Errors that can occur when loading or saving the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The session backend failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Everything a view can change about the client store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreAction {
    /// Adopt a cart returned by the API.
    CartReplaced(Cart),
    /// Set one item's committed quantity.
    CartItemQuantitySet { item_id: CartItemId, quantity: u32 },
    /// Drop one item.
    CartItemRemoved(CartItemId),
    /// Empty the cart, keeping the code.
    CartEmptied,
    /// Switch to a fresh cart code with an empty cart.
    CartCodeRotated { next_code: CartCode },
    /// Adopt a wishlist returned by the API.
    WishlistReplaced(Wishlist),
    /// Append an entry returned by the API.
    WishlistEntryAdded(WishlistItem),
    /// Drop the entries for a product.
    WishlistProductRemoved(ProductId),
    /// A user signed in.
    SignedIn(User),
    /// The user signed out; the cart restarts under `next_code`.
    SignedOut { next_code: CartCode },
}

/// The store's current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreState {
    pub cart_code: CartCode,
    pub cart: Cart,
    pub wishlist: Wishlist,
    pub user: Option<User>,
    pub active_email: Email,
}

impl StoreState {
    /// Build the state from a persisted snapshot.
    ///
    /// Returns the state and whether anything had to be created (a missing
    /// cart code), which means it should be persisted.
    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot) -> (Self, bool) {
        let (cart_code, created) = snapshot
            .cart_code
            .map_or_else(|| (CartCode::generate(), true), |code| (code, false));
        let cart = snapshot
            .cart
            .unwrap_or_else(|| Cart::empty(cart_code.clone()));
        let active_email = snapshot
            .user
            .as_ref()
            .map_or_else(Email::guest, |user| user.email.clone());

        (
            Self {
                cart_code,
                cart,
                wishlist: snapshot.wishlist.unwrap_or_default(),
                user: snapshot.user,
                active_email,
            },
            created,
        )
    }

    /// The persisted part of the state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cart: Some(self.cart.clone()),
            wishlist: Some(self.wishlist.clone()),
            user: self.user.clone(),
            cart_code: Some(self.cart_code.clone()),
        }
    }

    /// Whether someone is signed in.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Email used in API request bodies.
    #[must_use]
    pub fn request_email(&self) -> &str {
        crate::api::request_email(self.user.as_ref(), &self.active_email)
    }

    /// Apply an action. Returns whether the persisted snapshot changed.
    pub fn reduce(&mut self, action: StoreAction) -> bool {
        self.apply(action).any()
    }

    /// Apply an action and report the persisted keys it changed.
    fn apply(&mut self, action: StoreAction) -> DirtyKeys {
        let before = self.snapshot();
        match action {
            StoreAction::CartReplaced(cart) => self.cart = cart,
            StoreAction::CartItemQuantitySet { item_id, quantity } => {
                self.cart.set_quantity(item_id, quantity);
            }
            StoreAction::CartItemRemoved(item_id) => {
                self.cart.remove_item(item_id);
            }
            StoreAction::CartEmptied => self.cart.clear(),
            StoreAction::CartCodeRotated { next_code } => {
                self.cart = Cart::empty(next_code.clone());
                self.cart_code = next_code;
            }
            StoreAction::WishlistReplaced(wishlist) => self.wishlist = wishlist,
            StoreAction::WishlistEntryAdded(item) => self.wishlist.push(item),
            StoreAction::WishlistProductRemoved(product_id) => {
                self.wishlist.remove_product(product_id);
            }
            StoreAction::SignedIn(user) => {
                self.active_email = user.email.clone();
                self.user = Some(user);
            }
            StoreAction::SignedOut { next_code } => {
                self.user = None;
                self.active_email = Email::guest();
                self.wishlist = Wishlist::default();
                self.cart = Cart::empty(next_code.clone());
                self.cart_code = next_code;
            }
        }
        DirtyKeys::between(&before, &self.snapshot())
    }
}

/// The client store bound to its persistence adapter.
#[derive(Debug)]
pub struct Store<P> {
    persistence: P,
    state: StoreState,
    dirty: DirtyKeys,
}

impl<P: StorePersistence> Store<P> {
    /// Load the store from persistence, generating a cart code if needed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the persistence backend fails.
    pub async fn open(persistence: P) -> Result<Self, StoreError> {
        let loaded = persistence.load().await?;
        let (state, created) = StoreState::from_snapshot(loaded.clone());
        // Only a generated code and the empty cart under it need writing
        let dirty = if created {
            DirtyKeys::between(&loaded, &state.snapshot())
        } else {
            DirtyKeys::default()
        };
        Ok(Self {
            persistence,
            state,
            dirty,
        })
    }

    #[must_use]
    pub const fn state(&self) -> &StoreState {
        &self.state
    }

    /// Whether there are unsaved changes.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty.any()
    }

    /// The persisted keys the next save writes.
    #[must_use]
    pub const fn dirty_keys(&self) -> DirtyKeys {
        self.dirty
    }

    /// Apply an action. Returns whether anything changed.
    pub fn dispatch(&mut self, action: StoreAction) -> bool {
        let changed = self.state.apply(action);
        self.dirty |= changed;
        changed.any()
    }

    /// Refresh the cart from the API.
    ///
    /// A response carrying a cart code replaces the cart; any failure falls
    /// back to an empty cart under the current code. A cancelled scope leaves
    /// the store untouched.
    pub async fn reconcile_cart(&mut self, api: &ApiClient, scope: &ViewScope) {
        let code = self.state.cart_code.clone();
        match scope.run(api.cart(&code)).await {
            Ok(cart) if cart.cart_code.is_some() => {
                self.dispatch(StoreAction::CartReplaced(cart));
            }
            Ok(_) | Err(ApiError::Cancelled) => {}
            Err(e) => {
                tracing::debug!(cart_code = %code, error = %e, "Cart reconcile failed, using empty cart");
                self.dispatch(StoreAction::CartReplaced(Cart::empty(code)));
            }
        }
    }

    /// Persist the keys that changed since the store was opened or last saved.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the persistence backend fails.
    pub async fn save(&mut self) -> Result<(), StoreError> {
        if !self.dirty.any() {
            return Ok(());
        }
        self.persistence
            .save(&self.state.snapshot(), self.dirty)
            .await?;
        self.dirty = DirtyKeys::default();
        Ok(())
    }
}
