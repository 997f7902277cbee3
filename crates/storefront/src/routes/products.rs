//! Product detail route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use madstore_core::{Product, Review, resolve_image_url};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::common::{NavView, reply};
use crate::error::Result;
use crate::middleware::{ClientStore, take_flash};
use crate::state::AppState;
use crate::store::{Store, StorePersistence};
use crate::views::product::{DEFAULT_RATING, ProductPage, ReviewDraft, ReviewOutcome};
use crate::views::{self, Outcome, ViewScope};

fn product_path(slug: &str) -> String {
    format!("/product/{}", urlencoding::encode(slug))
}

/// Gallery thumbnail display data.
#[derive(Clone)]
pub struct ThumbView {
    pub index: usize,
    pub url: String,
    pub selected: bool,
}

/// Review display data.
#[derive(Clone)]
pub struct ReviewView {
    pub author: String,
    pub filled_stars: String,
    pub empty_stars: String,
    pub review: String,
    pub created: String,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        let (filled, empty) = review.stars();
        Self {
            author: review.author(),
            filled_stars: "★".repeat(filled),
            empty_stars: "☆".repeat(empty),
            review: review.review.clone(),
            created: review.created.clone().unwrap_or_default(),
        }
    }
}

/// Product display data.
#[derive(Clone)]
pub struct ProductView {
    pub id: i64,
    /// This page's path.
    pub path: String,
    pub name: String,
    pub price: String,
    pub description: String,
    pub image: String,
    pub prev_index: usize,
    pub next_index: usize,
    pub thumbs: Vec<ThumbView>,
    pub wishlisted: bool,
}

impl ProductView {
    fn new<P: StorePersistence>(
        product: &Product,
        page: &ProductPage,
        store: &Store<P>,
        api_base: &str,
    ) -> Self {
        let gallery = &page.gallery;
        Self {
            id: product.id.as_i64(),
            path: product_path(&product.slug),
            name: product.name.clone(),
            price: product.price_display(),
            description: product.description.clone().unwrap_or_default(),
            image: resolve_image_url(gallery.current(), api_base),
            prev_index: gallery.prev_index(),
            next_index: gallery.next_index(),
            thumbs: gallery
                .images()
                .iter()
                .enumerate()
                .map(|(index, url)| ThumbView {
                    index,
                    url: resolve_image_url(Some(url), api_base),
                    selected: index == gallery.index(),
                })
                .collect(),
            wishlisted: store.state().wishlist.contains(product.id),
        }
    }
}

/// Product page template.
#[derive(Template, WebTemplate)]
#[template(path = "product.html")]
pub struct ProductTemplate {
    pub nav: NavView,
    pub product: Option<ProductView>,
    pub reviews: Vec<ReviewView>,
    pub error: Option<String>,
    /// Notice from the review form, shown above it.
    pub review_notice: Option<String>,
    pub rating: u8,
    /// Review text kept after a failed submission.
    pub review_text: String,
}

impl ProductTemplate {
    fn new<P: StorePersistence>(
        page: &ProductPage,
        store: &Store<P>,
        nav: NavView,
        api_base: &str,
    ) -> Self {
        Self {
            nav,
            product: page
                .product
                .as_ref()
                .map(|product| ProductView::new(product, page, store, api_base)),
            reviews: page.reviews.iter().map(ReviewView::from).collect(),
            error: page.error.clone(),
            review_notice: None,
            rating: DEFAULT_RATING,
            review_text: String::new(),
        }
    }
}

/// Product page query parameters.
#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    /// Gallery position.
    #[serde(default)]
    pub image: usize,
}

/// Display a product with its gallery and reviews.
#[instrument(skip(state, session, store))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    ClientStore(mut store): ClientStore,
    Path(slug): Path<String>,
    Query(query): Query<ProductQuery>,
) -> Result<ProductTemplate> {
    let scope = ViewScope::new();
    store.reconcile_cart(state.api(), &scope).await;
    let page = views::product::detail(state.api(), &mut store, &scope, &slug, query.image).await;
    store.save().await?;

    let nav = NavView::new(&store, take_flash(&session).await);
    Ok(ProductTemplate::new(
        &page,
        &store,
        nav,
        state.api().base_url(),
    ))
}

/// Review form data.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub rating: Option<String>,
    #[serde(default)]
    pub review: String,
}

/// Submit a review and show the product with the new review first.
#[instrument(skip(state, session, store))]
pub async fn submit_review(
    State(state): State<AppState>,
    session: Session,
    ClientStore(mut store): ClientStore,
    Path(slug): Path<String>,
    Form(form): Form<ReviewForm>,
) -> Result<Response> {
    let scope = ViewScope::new();
    let mut page = views::product::detail(state.api(), &mut store, &scope, &slug, 0).await;
    let draft = ReviewDraft::new(form.rating.as_deref(), form.review);

    let mut review_notice = None;
    if let Some(product) = &page.product {
        match views::product::submit_review(state.api(), &store, &scope, product, &draft).await {
            ReviewOutcome::Created(review) => {
                views::product::prepend_review(&mut page.reviews, review);
            }
            ReviewOutcome::Ignored => {}
            ReviewOutcome::Rejected(Outcome::Notice(message)) => review_notice = Some(message),
            ReviewOutcome::Rejected(outcome) => {
                store.save().await?;
                return reply(&session, outcome, &product_path(&slug)).await;
            }
        }
    }
    store.save().await?;

    let nav = NavView::new(&store, take_flash(&session).await);
    let mut template = ProductTemplate::new(&page, &store, nav, state.api().base_url());
    if review_notice.is_some() {
        template.rating = draft.rating;
        template.review_text = draft.review;
    }
    template.review_notice = review_notice;
    Ok(template.into_response())
}
