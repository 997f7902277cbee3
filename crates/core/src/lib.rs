//! Madstore Core - Shared domain types.
//!
//! This crate provides the types and pure helpers used by the Madstore
//! storefront:
//! - catalog types (products, categories, carousel slides, reviews)
//! - cart types, cart codes and quantity drafts
//! - wishlist, user and order types
//! - money formatting and delivery estimates
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O and no HTTP
//! clients. Everything here can be unit tested without a running API.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, money, and the storefront domain model

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
