//! Session-related types.
//!
//! The session stands in for the browser's durable storage: it holds the
//! client store snapshot and one-shot flash notices.

use serde::{Deserialize, Serialize};

/// A notice carried across a redirect and shown once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub message: String,
    /// What the notice belongs to, such as an order id; `None` for the page.
    #[serde(default)]
    pub target: Option<String>,
    /// Whether the action it reports succeeded.
    #[serde(default)]
    pub ok: bool,
}

impl Flash {
    /// A page-level notice.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            target: None,
            ok: false,
        }
    }

    /// A page-level notice reporting success.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            ..Self::new(message)
        }
    }

    /// A notice shown next to one item on the page.
    #[must_use]
    pub fn targeted(target: impl Into<String>, message: impl Into<String>, ok: bool) -> Self {
        Self {
            message: message.into(),
            target: Some(target.into()),
            ok,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for the cart object.
    pub const CART: &str = "madstore_cart";

    /// Key for the wishlist array.
    pub const WISHLIST: &str = "madstore_wishlist";

    /// Key for the signed-in user.
    pub const USER: &str = "madstore_user";

    /// Key for the cart code string.
    pub const CART_CODE: &str = "madstore_cart_code";

    /// Key for the pending flash notice.
    pub const FLASH: &str = "madstore_flash";
}
