//! Wishlist route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State, response::Response};
use madstore_core::ProductId;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::common::{NavView, ProductCardView, reply};
use crate::error::Result;
use crate::middleware::{ClientStore, take_flash};
use crate::state::AppState;
use crate::views::wishlist::GuestPolicy;
use crate::views::{self, ViewScope};

const WISHLIST_PATH: &str = "/wishlist";

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist.html")]
pub struct WishlistTemplate {
    pub nav: NavView,
    pub signed_in: bool,
    pub items: Vec<ProductCardView>,
    pub error: Option<String>,
}

/// Display the signed-in user's wishlist.
#[instrument(skip(state, session, store))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    ClientStore(mut store): ClientStore,
) -> Result<WishlistTemplate> {
    let scope = ViewScope::new();
    store.reconcile_cart(state.api(), &scope).await;
    let page = views::wishlist::page(state.api(), &mut store, &scope).await;
    store.save().await?;

    let wishlist = &store.state().wishlist;
    let items = wishlist
        .items()
        .iter()
        .map(|entry| ProductCardView::new(&entry.product, wishlist, state.api().base_url()))
        .collect();

    Ok(WishlistTemplate {
        nav: NavView::new(&store, take_flash(&session).await),
        signed_in: page.signed_in,
        items,
        error: page.error,
    })
}

/// Remove form data.
#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    pub product_id: ProductId,
}

/// Remove a product from the wishlist.
#[instrument(skip(state, session, store))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    ClientStore(mut store): ClientStore,
    Form(form): Form<RemoveForm>,
) -> Result<Response> {
    let scope = ViewScope::new();
    let outcome = views::wishlist::remove(
        state.api(),
        &mut store,
        &scope,
        form.product_id,
        GuestPolicy::Redirect,
    )
    .await;
    store.save().await?;
    reply(&session, outcome, WISHLIST_PATH).await
}
