//! Home (catalog and search) and category screens, plus add-to-cart.

use madstore_core::{CarouselItem, Category, Product, ProductId};
use tracing::instrument;

use super::{Outcome, ViewScope, failure_message, wishlist};
use crate::api::{ApiClient, ApiError};
use crate::store::{Store, StoreAction, StorePersistence};

/// The home screen's model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPage {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub carousel: Vec<CarouselItem>,
    /// The search query, when the screen shows search results.
    pub query: Option<String>,
    pub error: Option<String>,
}

/// Load the home screen.
///
/// A non-blank `query` runs a product search instead of the catalog load.
/// Products, categories and carousel are fetched together and the screen
/// only fills in once all three have answered.
#[instrument(skip(api, store, scope))]
pub async fn catalog<P: StorePersistence>(
    api: &ApiClient,
    store: &mut Store<P>,
    scope: &ViewScope,
    query: Option<&str>,
) -> CatalogPage {
    let query = query.map(str::trim).filter(|q| !q.is_empty());

    let mut page = match query {
        Some(query) => match scope.run(api.search(query)).await {
            Ok(products) => CatalogPage {
                products,
                ..CatalogPage::default()
            },
            Err(e) => CatalogPage {
                error: Some(failure_message(&e, "Failed to search products")),
                ..CatalogPage::default()
            },
        },
        None => {
            let loaded = tokio::try_join!(
                scope.run(api.products()),
                scope.run(api.categories()),
                scope.run(api.carousel()),
            );
            match loaded {
                Ok((products, categories, carousel)) => CatalogPage {
                    products,
                    categories,
                    carousel,
                    ..CatalogPage::default()
                },
                Err(e) => CatalogPage {
                    error: Some(failure_message(&e, "Failed to load store data")),
                    ..CatalogPage::default()
                },
            }
        }
    };
    page.query = query.map(str::to_string);

    wishlist::refresh_quietly(api, store, scope).await;
    page
}

/// The category screen's model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPage {
    pub category: Option<Category>,
    pub error: Option<String>,
}

impl CategoryPage {
    /// Heading for the screen.
    #[must_use]
    pub fn title(&self) -> &str {
        self.category
            .as_ref()
            .map(|c| c.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("Category")
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        self.category.as_ref().map_or(&[], |c| c.products.as_slice())
    }
}

/// Load a category and its products.
#[instrument(skip(api, store, scope))]
pub async fn category<P: StorePersistence>(
    api: &ApiClient,
    store: &mut Store<P>,
    scope: &ViewScope,
    slug: &str,
) -> CategoryPage {
    let page = match scope.run(api.category_detail(slug)).await {
        Ok(category) => CategoryPage {
            category,
            error: None,
        },
        Err(e) => CategoryPage {
            category: None,
            error: Some(failure_message(&e, "Failed to load category")),
        },
    };

    wishlist::refresh_quietly(api, store, scope).await;
    page
}

/// The home screen's own location, keeping an active search.
#[must_use]
pub fn home_location(query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("/?q={}", urlencoding::encode(q)),
        _ => "/".to_string(),
    }
}

/// Where choosing a category on the home screen leads.
#[must_use]
pub fn category_location(slug: &str) -> String {
    let slug = slug.trim();
    if slug.is_empty() {
        "/".to_string()
    } else {
        format!("/category_detail/{}", urlencoding::encode(slug))
    }
}

/// Add one unit of a product to the cart.
///
/// Guests are sent to the login screen; the returned cart replaces the
/// store's cart.
#[instrument(skip(api, store, scope))]
pub async fn add_to_cart<P: StorePersistence>(
    api: &ApiClient,
    store: &mut Store<P>,
    scope: &ViewScope,
    product_id: ProductId,
) -> Outcome {
    if !store.state().is_signed_in() {
        return Outcome::login();
    }

    let code = store.state().cart_code.clone();
    match scope.run(api.add_to_cart(&code, product_id)).await {
        Ok(cart) => {
            store.dispatch(StoreAction::CartReplaced(cart));
            Outcome::Done
        }
        Err(ApiError::Cancelled) => Outcome::Done,
        Err(e) => Outcome::failed(&e, "Failed to add to cart"),
    }
}
