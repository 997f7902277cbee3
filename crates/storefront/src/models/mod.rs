//! Storefront-local models.
//!
//! Domain types shared with other crates live in `madstore-core`.

pub mod session;

pub use session::{Flash, keys};
