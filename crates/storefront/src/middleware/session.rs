//! Session middleware configuration and flash notices.
//!
//! In production sessions are stored in `PostgreSQL` through
//! `tower-sessions-sqlx-store`; tests plug in `MemoryStore`.

use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};

use crate::config::StorefrontConfig;
use crate::models::{Flash, keys};
use crate::store::StoreError;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "madstore_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer over any session store.
///
/// # Arguments
///
/// * `store` - Session backend (`PostgresStore` in production)
/// * `config` - Storefront configuration (for the cookie's `Secure` flag)
#[must_use]
pub fn create_session_layer<S: SessionStore + Clone>(
    store: S,
    config: &StorefrontConfig,
) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Leave a notice for the next page render.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_flash(session: &Session, flash: &Flash) -> Result<(), StoreError> {
    session.insert(keys::FLASH, flash).await?;
    Ok(())
}

/// Take the pending notice, if any. It is shown once.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    match session.remove::<Flash>(keys::FLASH).await {
        Ok(flash) => flash,
        Err(e) => {
            tracing::warn!(error = %e, "Dropping unreadable flash notice");
            None
        }
    }
}
