//! Persistence adapters for the client store.
//!
//! The store persists four keys: the cart object, the wishlist array, the
//! signed-in user and the cart code. A [`Snapshot`] carries exactly those;
//! [`DirtyKeys`] names the ones a save writes.

use std::future::Future;
use std::ops::BitOrAssign;
use std::sync::{Arc, Mutex, PoisonError};

use madstore_core::{Cart, CartCode, User, Wishlist};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tower_sessions::Session;

use super::StoreError;
use crate::models::keys;

/// The persisted part of the store. `None` means the key is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub cart: Option<Cart>,
    pub wishlist: Option<Wishlist>,
    pub user: Option<User>,
    pub cart_code: Option<CartCode>,
}

/// The persisted keys a save writes. Keys left out keep whatever value
/// another request stored in the meantime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyKeys {
    pub cart: bool,
    pub wishlist: bool,
    pub user: bool,
    pub cart_code: bool,
}

impl DirtyKeys {
    pub const ALL: Self = Self {
        cart: true,
        wishlist: true,
        user: true,
        cart_code: true,
    };

    /// The keys whose values differ between two snapshots.
    #[must_use]
    pub fn between(before: &Snapshot, after: &Snapshot) -> Self {
        Self {
            cart: before.cart != after.cart,
            wishlist: before.wishlist != after.wishlist,
            user: before.user != after.user,
            cart_code: before.cart_code != after.cart_code,
        }
    }

    #[must_use]
    pub const fn any(self) -> bool {
        self.cart || self.wishlist || self.user || self.cart_code
    }
}

impl BitOrAssign for DirtyKeys {
    fn bitor_assign(&mut self, rhs: Self) {
        self.cart |= rhs.cart;
        self.wishlist |= rhs.wishlist;
        self.user |= rhs.user;
        self.cart_code |= rhs.cart_code;
    }
}

/// Where a store snapshot is loaded from and saved to.
pub trait StorePersistence: Send + Sync {
    /// Read the persisted snapshot.
    fn load(&self) -> impl Future<Output = Result<Snapshot, StoreError>> + Send;

    /// Write the `dirty` keys of the snapshot and leave the others alone.
    fn save(
        &self,
        snapshot: &Snapshot,
        dirty: DirtyKeys,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

// =============================================================================
// Session-backed persistence
// =============================================================================

/// Persists the store in the browser's tower-sessions session.
///
/// The session layer writes the whole record back, so a save first reloads
/// the record from the session store, then writes the dirty keys and commits
/// right away. A request that only refreshed the cart cannot bring back a
/// user that a concurrent logout removed.
#[derive(Debug, Clone)]
pub struct SessionPersistence {
    session: Session,
}

impl SessionPersistence {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Read one key; a value that no longer decodes is treated as absent.
    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.session.get::<T>(key).await {
            Ok(value) => Ok(value),
            Err(tower_sessions::session::Error::SerdeJson(e)) => {
                tracing::warn!(key, error = %e, "Ignoring malformed session value");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: Option<&T>,
    ) -> Result<(), StoreError> {
        match value {
            Some(value) => self.session.insert(key, value).await?,
            None => {
                self.session.remove_value(key).await?;
            }
        }
        Ok(())
    }
}

impl StorePersistence for SessionPersistence {
    async fn load(&self) -> Result<Snapshot, StoreError> {
        Ok(Snapshot {
            cart: self.read(keys::CART).await?,
            wishlist: self.read(keys::WISHLIST).await?,
            user: self.read(keys::USER).await?,
            cart_code: self.read(keys::CART_CODE).await?,
        })
    }

    async fn save(&self, snapshot: &Snapshot, dirty: DirtyKeys) -> Result<(), StoreError> {
        // A new session has nothing stored yet
        if self.session.id().is_some() {
            self.session.load().await?;
        }
        if dirty.cart {
            self.write(keys::CART, snapshot.cart.as_ref()).await?;
        }
        if dirty.wishlist {
            self.write(keys::WISHLIST, snapshot.wishlist.as_ref()).await?;
        }
        if dirty.user {
            self.write(keys::USER, snapshot.user.as_ref()).await?;
        }
        if dirty.cart_code {
            self.write(keys::CART_CODE, snapshot.cart_code.as_ref())
                .await?;
        }
        self.session.save().await?;
        Ok(())
    }
}

// =============================================================================
// In-memory persistence
// =============================================================================

/// Keeps the snapshot in memory. Clones share the same snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    snapshot: Arc<Mutex<Snapshot>>,
}

impl MemoryPersistence {
    #[must_use]
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(snapshot)),
        }
    }

    /// The snapshot as last saved.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StorePersistence for MemoryPersistence {
    async fn load(&self) -> Result<Snapshot, StoreError> {
        Ok(self.snapshot())
    }

    async fn save(&self, snapshot: &Snapshot, dirty: DirtyKeys) -> Result<(), StoreError> {
        let mut stored = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
        if dirty.cart {
            stored.cart.clone_from(&snapshot.cart);
        }
        if dirty.wishlist {
            stored.wishlist.clone_from(&snapshot.wishlist);
        }
        if dirty.user {
            stored.user.clone_from(&snapshot.user);
        }
        if dirty.cart_code {
            stored.cart_code.clone_from(&snapshot.cart_code);
        }
        Ok(())
    }
}
