//! Home, search and category route handlers, plus the add-to-cart and
//! wishlist buttons found on every product card.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use madstore_core::{CarouselItem, Category, ProductId, resolve_image_url};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::common::{NavView, ProductCardView, back_to, reply};
use crate::error::{Result, add_breadcrumb};
use crate::middleware::{ClientStore, take_flash};
use crate::state::AppState;
use crate::views::wishlist::GuestPolicy;
use crate::views::{self, ViewScope};

/// Category chip display data.
#[derive(Clone)]
pub struct CategoryView {
    pub slug: String,
    pub name: String,
    pub image: String,
}

impl CategoryView {
    fn new(category: &Category, api_base: &str) -> Self {
        Self {
            slug: category.slug.clone(),
            name: category.name.clone(),
            image: resolve_image_url(category.image.as_deref(), api_base),
        }
    }
}

/// Carousel slide display data.
#[derive(Clone)]
pub struct SlideView {
    pub title: String,
    pub image: String,
}

impl SlideView {
    fn new(item: &CarouselItem, api_base: &str) -> Self {
        Self {
            title: item.title.clone(),
            image: resolve_image_url(item.image.as_deref(), api_base),
        }
    }
}

/// Home page query parameters.
#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    /// Search text.
    pub q: Option<String>,
    /// Category picked from the filter select.
    pub category: Option<String>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nav: NavView,
    pub products: Vec<ProductCardView>,
    pub categories: Vec<CategoryView>,
    pub carousel: Vec<SlideView>,
    pub query: Option<String>,
    /// This page's location, for returning after sign-in.
    pub path: String,
    pub error: Option<String>,
}

/// Category page template.
#[derive(Template, WebTemplate)]
#[template(path = "category.html")]
pub struct CategoryTemplate {
    pub nav: NavView,
    pub title: String,
    /// This page's path, where card buttons return to.
    pub path: String,
    pub products: Vec<ProductCardView>,
    pub error: Option<String>,
}

/// Display the home page: catalog, or search results for `?q=`.
#[instrument(skip(state, session, store))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    ClientStore(mut store): ClientStore,
    Query(query): Query<HomeQuery>,
) -> Result<Response> {
    if let Some(slug) = &query.category {
        return Ok(Redirect::to(&views::catalog::category_location(slug)).into_response());
    }

    let scope = ViewScope::new();
    store.reconcile_cart(state.api(), &scope).await;
    let page = views::catalog::catalog(state.api(), &mut store, &scope, query.q.as_deref()).await;
    store.save().await?;

    let api_base = state.api().base_url();
    let wishlist = &store.state().wishlist;
    let nav = NavView::new(&store, take_flash(&session).await).with_query(page.query.as_deref());

    Ok(HomeTemplate {
        products: ProductCardView::list(&page.products, wishlist, api_base),
        categories: page
            .categories
            .iter()
            .map(|c| CategoryView::new(c, api_base))
            .collect(),
        carousel: page
            .carousel
            .iter()
            .map(|s| SlideView::new(s, api_base))
            .collect(),
        path: views::catalog::home_location(page.query.as_deref()),
        query: page.query,
        error: page.error,
        nav,
    }
    .into_response())
}

/// Display a category and its products.
#[instrument(skip(state, session, store))]
pub async fn category(
    State(state): State<AppState>,
    session: Session,
    ClientStore(mut store): ClientStore,
    Path(slug): Path<String>,
) -> Result<CategoryTemplate> {
    let scope = ViewScope::new();
    store.reconcile_cart(state.api(), &scope).await;
    let page = views::catalog::category(state.api(), &mut store, &scope, &slug).await;
    store.save().await?;

    Ok(CategoryTemplate {
        nav: NavView::new(&store, take_flash(&session).await),
        title: page.title().to_string(),
        products: ProductCardView::list(
            page.products(),
            &store.state().wishlist,
            state.api().base_url(),
        ),
        path: views::catalog::category_location(&slug),
        error: page.error,
    })
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    /// Page to return to.
    pub next: Option<String>,
}

/// Add one unit of a product to the cart.
#[instrument(skip(state, session, store))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    session: Session,
    ClientStore(mut store): ClientStore,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product_id = form.product_id.to_string();
    add_breadcrumb("cart", "Add to cart", Some(&[("product_id", product_id.as_str())]));

    let scope = ViewScope::new();
    let outcome = views::catalog::add_to_cart(state.api(), &mut store, &scope, form.product_id).await;
    store.save().await?;
    reply(&session, outcome, &back_to(form.next.as_deref(), "/")).await
}

/// The screen a product card's wishlist button sits on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardOrigin {
    #[default]
    Catalog,
    Category,
    Product,
}

impl CardOrigin {
    /// The catalog sends guests to log in; other screens keep them in place
    /// with a notice.
    #[must_use]
    pub const fn guest_policy(self) -> GuestPolicy {
        match self {
            Self::Catalog => GuestPolicy::Redirect,
            Self::Category | Self::Product => GuestPolicy::Notice,
        }
    }
}

/// Wishlist toggle form data.
#[derive(Debug, Deserialize)]
pub struct WishlistToggleForm {
    pub product_id: ProductId,
    #[serde(default)]
    pub origin: CardOrigin,
    pub next: Option<String>,
}

/// Toggle a product's wishlist membership.
#[instrument(skip(state, session, store))]
pub async fn toggle_wishlist(
    State(state): State<AppState>,
    session: Session,
    ClientStore(mut store): ClientStore,
    Form(form): Form<WishlistToggleForm>,
) -> Result<Response> {
    let scope = ViewScope::new();
    let outcome = views::wishlist::toggle(
        state.api(),
        &mut store,
        &scope,
        form.product_id,
        form.origin.guest_policy(),
    )
    .await;
    store.save().await?;
    reply(&session, outcome, &back_to(form.next.as_deref(), "/")).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_policy_per_screen() {
        assert_eq!(CardOrigin::Catalog.guest_policy(), GuestPolicy::Redirect);
        assert_eq!(CardOrigin::Category.guest_policy(), GuestPolicy::Notice);
        assert_eq!(CardOrigin::Product.guest_policy(), GuestPolicy::Notice);
    }
}
