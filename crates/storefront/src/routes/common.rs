//! Display pieces shared by every screen: navbar, product cards and the
//! redirect that ends a form action.

use axum::response::{IntoResponse, Redirect, Response};
use madstore_core::{DEFAULT_AVATAR, Product, User, Wishlist, resolve_image_url};
use tower_sessions::Session;

use crate::error::Result;
use crate::middleware::set_flash;
use crate::models::Flash;
use crate::store::{Store, StorePersistence};
use crate::views::Outcome;

/// A one-off notice at the top of the page.
#[derive(Clone)]
pub struct NoticeView {
    pub message: String,
    pub ok: bool,
}

impl From<Flash> for NoticeView {
    fn from(flash: Flash) -> Self {
        Self {
            message: flash.message,
            ok: flash.ok,
        }
    }
}

/// Navbar display data, derived from the client store.
#[derive(Clone)]
pub struct NavView {
    /// Total quantity across cart items.
    pub cart_count: u32,
    pub wishlist_count: usize,
    pub signed_in: bool,
    pub user_name: String,
    pub avatar_url: String,
    /// Search box contents.
    pub query: String,
    pub notice: Option<NoticeView>,
}

impl NavView {
    #[must_use]
    pub fn new<P: StorePersistence>(store: &Store<P>, flash: Option<Flash>) -> Self {
        let state = store.state();
        let user = state.user.as_ref();
        Self {
            cart_count: state.cart.item_count(),
            wishlist_count: state.wishlist.len(),
            signed_in: user.is_some(),
            user_name: user.map(User::display_name).unwrap_or_default(),
            avatar_url: user.map_or(DEFAULT_AVATAR, User::avatar_url).to_string(),
            query: String::new(),
            notice: flash.map(NoticeView::from),
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: Option<&str>) -> Self {
        self.query = query.unwrap_or_default().to_string();
        self
    }
}

/// Product card display data.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub price: String,
    pub image: String,
    pub wishlisted: bool,
}

impl ProductCardView {
    #[must_use]
    pub fn new(product: &Product, wishlist: &Wishlist, api_base: &str) -> Self {
        Self {
            id: product.id.as_i64(),
            slug: product.slug.clone(),
            name: product.name.clone(),
            price: product.price_display(),
            image: resolve_image_url(product.card_image(), api_base),
            wishlisted: wishlist.contains(product.id),
        }
    }

    #[must_use]
    pub fn list(products: &[Product], wishlist: &Wishlist, api_base: &str) -> Vec<Self> {
        products
            .iter()
            .map(|product| Self::new(product, wishlist, api_base))
            .collect()
    }
}

/// Where a form sends the browser back to. Only same-site paths are kept.
#[must_use]
pub fn back_to(next: Option<&str>, fallback: &str) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => fallback.to_string(),
    }
}

/// Finish a form action: redirect, carrying any notice as a flash.
///
/// # Errors
///
/// Returns an error if the notice cannot be stored in the session.
pub async fn reply(session: &Session, outcome: Outcome, back: &str) -> Result<Response> {
    let location = match outcome {
        Outcome::Done => back.to_string(),
        Outcome::Notice(message) => {
            set_flash(session, &Flash::new(message)).await?;
            back.to_string()
        }
        Outcome::Redirect(location) => location,
    };
    Ok(Redirect::to(&location).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::{MemoryPersistence, Snapshot};
    use madstore_core::{Cart, CartCode, CartItem, CartItemId, ProductId, WishlistItem, WishlistItemId};

    #[test]
    fn test_back_to_keeps_local_paths_only() {
        assert_eq!(back_to(Some("/category_detail/shoes"), "/"), "/category_detail/shoes");
        assert_eq!(back_to(Some("//evil.example"), "/"), "/");
        assert_eq!(back_to(Some("https://evil.example"), "/cart"), "/cart");
        assert_eq!(back_to(None, "/cart"), "/cart");
    }

    #[tokio::test]
    async fn test_nav_counts_quantities_and_guest_defaults() {
        let item = |id: i64, quantity: u32| CartItem {
            id: CartItemId::new(id),
            quantity,
            product: Product::default(),
            sub_total: None,
        };
        let store = Store::open(MemoryPersistence::new(Snapshot {
            cart: Some(Cart {
                cart_code: Some(CartCode::new("c1")),
                cartitems: vec![item(1, 2), item(2, 3)],
                cart_total: None,
            }),
            wishlist: Some(Wishlist::new(vec![WishlistItem {
                id: WishlistItemId::new(1),
                product: Product {
                    id: ProductId::new(9),
                    ..Product::default()
                },
            }])),
            cart_code: Some(CartCode::new("c1")),
            user: None,
        }))
        .await
        .unwrap();

        let nav = NavView::new(&store, Some(Flash::new("Saved"))).with_query(Some("tea"));
        assert_eq!(nav.cart_count, 5);
        assert_eq!(nav.wishlist_count, 1);
        assert!(!nav.signed_in);
        assert_eq!(nav.avatar_url, DEFAULT_AVATAR);
        assert_eq!(nav.query, "tea");
        assert_eq!(nav.notice.map(|n| n.message).as_deref(), Some("Saved"));
    }

    #[test]
    fn test_card_resolves_image_and_membership() {
        let product = Product {
            id: ProductId::new(9),
            image: Some("/media/tea.png".into()),
            ..Product::default()
        };
        let wishlist = Wishlist::new(vec![WishlistItem {
            id: WishlistItemId::new(1),
            product: product.clone(),
        }]);
        let card = ProductCardView::new(&product, &wishlist, "http://api.test/");
        assert_eq!(card.image, "http://api.test/media/tea.png");
        assert!(card.wishlisted);
    }
}
