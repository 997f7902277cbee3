//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Catalog (?q= search, ?category= filter)
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check
//!
//! # Catalog
//! GET  /category_detail/{slug}    - Category products
//! GET  /product/{slug}            - Product detail (?image= gallery position)
//! POST /product/{slug}/reviews    - Submit review
//!
//! # Cart
//! GET  /cart                      - Cart and checkout form
//! POST /cart/add                  - Add to cart
//! POST /cart/quantity             - Commit draft quantity
//! POST /cart/step                 - Stepper +/- 1
//! POST /cart/remove               - Remove item
//! POST /checkout                  - COD order or card checkout redirect
//!
//! # Wishlist
//! GET  /wishlist                  - Wishlist
//! POST /wishlist/toggle           - Toggle membership
//! POST /wishlist/remove           - Remove entry
//!
//! # Orders
//! GET  /orders                    - Orders (?filter=, ?expanded=)
//! GET  /orders/{order_id}         - Order detail
//! POST /orders/{order_id}/otp     - Request delivery OTP
//! POST /orders/{order_id}/received - Mark received
//!
//! # Auth
//! GET  /login                     - Login / register (?mode=register)
//! POST /login                     - Password sign-in
//! POST /register                  - Create account
//! POST /auth/google               - Google ID token callback
//! POST /logout                    - Logout
//! GET  /account                   - Account
//!
//! # Payment
//! GET  /payment/success           - Card payment success (?session_id=)
//! GET  /payment/failed            - Card payment failed
//! ```

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod common;
pub mod orders;
pub mod payment;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Directory static assets are served from, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/storefront/static";

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(catalog::add_to_cart))
        .route("/quantity", post(cart::commit_quantity))
        .route("/step", post(cart::step_quantity))
        .route("/remove", post(cart::remove))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/toggle", post(catalog::toggle_wishlist))
        .route("/remove", post(wishlist::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{order_id}", get(orders::show))
        .route("/{order_id}/otp", post(orders::request_otp))
        .route("/{order_id}/received", post(orders::mark_received))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", post(auth::register))
        .route("/auth/google", post(auth::google_callback))
        .route("/logout", post(auth::logout))
        .route("/account", get(auth::account))
}

/// Create all page routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::home))
        .route("/category_detail/{slug}", get(catalog::category))
        .route("/product/{slug}", get(products::show))
        .route("/product/{slug}/reviews", post(products::submit_review))
        .nest("/cart", cart_routes())
        .route("/checkout", post(cart::checkout))
        .nest("/wishlist", wishlist_routes())
        .nest("/orders", order_routes())
        .route("/payment/success", get(payment::success))
        .route("/payment/failed", get(payment::failed))
        .merge(auth_routes())
}

/// Build the full application: pages, health checks, static files, sessions,
/// request IDs and request tracing.
///
/// Sentry layers are added by the binary, outside this router.
pub fn app<S: SessionStore + Clone>(state: AppState, sessions: SessionManagerLayer<S>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(sessions)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies session database connectivity when there is one.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let Some(pool) = state.pool() else {
        return StatusCode::OK;
    };
    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
