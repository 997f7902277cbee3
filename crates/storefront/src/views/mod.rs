//! View controllers, one per storefront screen.
//!
//! A controller issues the screen's API calls inside a [`ViewScope`], folds
//! the answers into either its own page model or the client [`Store`], and
//! leaves saving and rendering to the route that called it.
//!
//! [`Store`]: crate::store::Store

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod payment;
pub mod product;
pub mod scope;
pub mod wishlist;

pub use scope::{ScopeCanceller, ViewScope};

use crate::api::ApiError;

/// Where guests are sent when an action needs a signed-in user.
pub const LOGIN_PATH: &str = "/login";

/// What a form action asks the browser to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Done; go back to the screen.
    Done,
    /// Go back to the screen and show a notice.
    Notice(String),
    /// Go somewhere else.
    Redirect(String),
}

impl Outcome {
    /// Send a guest to the login screen.
    #[must_use]
    pub fn login() -> Self {
        Self::Redirect(LOGIN_PATH.to_string())
    }

    /// A notice built from a failed call.
    #[must_use]
    pub fn failed(err: &ApiError, fallback: &str) -> Self {
        Self::Notice(failure_message(err, fallback))
    }
}

/// Message for a failed call, falling back when the error carries no text.
#[must_use]
pub fn failure_message(err: &ApiError, fallback: &str) -> String {
    let message = err.message();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
