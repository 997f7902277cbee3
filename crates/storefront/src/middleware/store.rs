//! Client store extractor.
//!
//! Opens the browser's [`Store`] from its session so handlers can dispatch
//! actions and save at their own save point.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::store::{SessionPersistence, Store};

/// The browser's client store, loaded from its session.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(ClientStore(mut store): ClientStore) -> Result<Redirect> {
///     store.dispatch(StoreAction::CartEmptied);
///     store.save().await?;
///     Ok(Redirect::to("/cart"))
/// }
/// ```
pub struct ClientStore(pub Store<SessionPersistence>);

impl<S> FromRequestParts<S> for ClientStore
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("Session layer is not installed".to_string()))?;

        let store = Store::open(SessionPersistence::new(session)).await?;
        Ok(Self(store))
    }
}
