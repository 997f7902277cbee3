//! Madstore Storefront library.
//!
//! The server-rendered customer storefront for the Madstore REST API. It is a
//! library so the full router can be served by the integration tests.
//!
//! # Modules
//!
//! - [`api`] - Madstore REST API client
//! - [`store`] - Per-browser client store persisted in the session
//! - [`views`] - One controller per screen
//! - [`routes`] - axum handlers rendering askama templates

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod views;
