//! Core types for Madstore.
//!
//! This module provides type-safe wrappers and the JSON shapes returned by the
//! Madstore REST API.

pub mod cart;
pub mod email;
pub mod id;
pub mod money;
pub mod order;
pub mod product;
pub mod status;
pub mod user;
pub mod wishlist;

pub use cart::{Bill, Cart, CartCode, CartItem, QuantityDrafts, QuantityStep};
pub use email::{Email, EmailError, GUEST_EMAIL};
pub use id::*;
pub use money::{DELIVERY_CHARGE, delivery_charge_for, format_inr};
pub use order::{DELIVERY_DAYS, Order, OrderId, OrderItem};
pub use product::{CarouselItem, Category, Gallery, Product, Review, resolve_image_url};
pub use status::*;
pub use user::{DEFAULT_AVATAR, DEFAULT_DISPLAY_NAME, User};
pub use wishlist::{Wishlist, WishlistItem};
