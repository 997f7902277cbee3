//! Catalog types: products, categories, carousel slides and reviews.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CarouselItemId, CategoryId, ProductId, ReviewId};
use super::money::format_inr;
use super::user::User;

/// A product as returned by the list and detail endpoints.
///
/// List responses omit `description` and `all_images`, so every field has a
/// default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub display_image: Option<String>,
    pub all_images: Vec<String>,
    pub description: Option<String>,
}

impl Product {
    /// Price formatted for display.
    #[must_use]
    pub fn price_display(&self) -> String {
        format_inr(self.price)
    }

    /// Image shown on product cards: the display image, else the main image.
    #[must_use]
    pub fn card_image(&self) -> Option<&str> {
        non_empty(self.display_image.as_deref()).or_else(|| non_empty(self.image.as_deref()))
    }

    /// Images shown in the detail gallery.
    ///
    /// Prefers `all_images`, then `display_image`, then `image`.
    #[must_use]
    pub fn gallery_images(&self) -> Vec<String> {
        if !self.all_images.is_empty() {
            return self.all_images.clone();
        }
        self.card_image().map(str::to_owned).into_iter().collect()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// A product category with its embedded products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    pub id: CategoryId,
    pub slug: String,
    pub name: String,
    pub image: Option<String>,
    #[serde(rename = "Product")]
    pub products: Vec<Product>,
}

/// A home page carousel slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselItem {
    pub id: CarouselItemId,
    pub title: String,
    pub image: Option<String>,
}

/// A product review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    pub id: ReviewId,
    pub user: Option<User>,
    pub rating: u8,
    pub review: String,
    pub created: Option<String>,
}

impl Review {
    /// Filled and empty stars out of five.
    #[must_use]
    pub fn stars(&self) -> (usize, usize) {
        let filled = usize::from(self.rating.min(5));
        (filled, 5 - filled)
    }

    /// Name shown next to the review.
    #[must_use]
    pub fn author(&self) -> String {
        self.user
            .as_ref()
            .map_or_else(|| "Anonymous".to_owned(), User::display_name)
    }
}

/// Resolve an image path from the API against the API base URL.
///
/// Absolute `http(s)` URLs pass through, a leading `/` is dropped before
/// joining, and a missing path yields an empty string.
#[must_use]
pub fn resolve_image_url(url: Option<&str>, base_url: &str) -> String {
    match url {
        None | Some("") => String::new(),
        Some(url) if url.starts_with("http") => url.to_owned(),
        Some(url) => format!("{base_url}{}", url.strip_prefix('/').unwrap_or(url)),
    }
}

/// Cursor over a product's gallery images with wrap-around navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gallery {
    images: Vec<String>,
    index: usize,
}

impl Gallery {
    /// Build a gallery for a product, starting at `index` (clamped).
    #[must_use]
    pub fn new(images: Vec<String>, index: usize) -> Self {
        let index = if images.is_empty() {
            0
        } else {
            index.min(images.len() - 1)
        };
        Self { images, index }
    }

    /// Currently selected image.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.images.get(self.index).map(String::as_str)
    }

    /// Index of the currently selected image.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// All images.
    #[must_use]
    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// Index of the previous image, wrapping to the last one.
    #[must_use]
    pub fn prev_index(&self) -> usize {
        if self.images.is_empty() {
            return 0;
        }
        (self.index + self.images.len() - 1) % self.images.len()
    }

    /// Index of the next image, wrapping to the first one.
    #[must_use]
    pub fn next_index(&self) -> usize {
        if self.images.is_empty() {
            return 0;
        }
        (self.index + 1) % self.images.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "http://127.0.0.1:8000/";

    #[test]
    fn test_product_accepts_string_and_number_prices() {
        let a: Product = serde_json::from_value(json!({"id": 1, "price": "1499.00"})).unwrap();
        let b: Product = serde_json::from_value(json!({"id": 2, "price": 1499})).unwrap();
        assert_eq!(a.price, b.price);
        assert_eq!(a.price_display(), "₹1,499.00");
    }

    #[test]
    fn test_product_tolerates_nulls() {
        let product: Product = serde_json::from_value(json!({
            "id": 1, "name": "Tee", "slug": "tee", "price": "10",
            "image": null, "display_image": null
        }))
        .unwrap();
        assert_eq!(product.card_image(), None);
        assert!(product.gallery_images().is_empty());
    }

    #[test]
    fn test_gallery_preference() {
        let mut product = Product {
            image: Some("img/main.jpg".into()),
            ..Product::default()
        };
        assert_eq!(product.gallery_images(), vec!["img/main.jpg"]);

        product.display_image = Some("img/display.jpg".into());
        assert_eq!(product.gallery_images(), vec!["img/display.jpg"]);

        product.all_images = vec!["a.jpg".into(), "b.jpg".into()];
        assert_eq!(product.gallery_images(), vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_category_embeds_products() {
        let category: Category = serde_json::from_value(json!({
            "id": 3, "name": "Shirts", "slug": "shirts", "image": null,
            "Product": [{"id": 1, "name": "Tee", "slug": "tee", "price": "10.00"}]
        }))
        .unwrap();
        assert_eq!(category.products.len(), 1);
        assert_eq!(category.products[0].slug, "tee");
    }

    #[test]
    fn test_resolve_image_url() {
        assert_eq!(resolve_image_url(None, BASE), "");
        assert_eq!(resolve_image_url(Some(""), BASE), "");
        assert_eq!(
            resolve_image_url(Some("https://cdn.example.com/a.jpg"), BASE),
            "https://cdn.example.com/a.jpg"
        );
        assert_eq!(
            resolve_image_url(Some("/media/a.jpg"), BASE),
            "http://127.0.0.1:8000/media/a.jpg"
        );
        assert_eq!(
            resolve_image_url(Some("media/a.jpg"), BASE),
            "http://127.0.0.1:8000/media/a.jpg"
        );
    }

    #[test]
    fn test_gallery_wraps_around() {
        let gallery = Gallery::new(vec!["a".into(), "b".into(), "c".into()], 0);
        assert_eq!(gallery.prev_index(), 2);
        assert_eq!(gallery.next_index(), 1);

        let last = Gallery::new(vec!["a".into(), "b".into(), "c".into()], 2);
        assert_eq!(last.next_index(), 0);
        assert_eq!(last.current(), Some("c"));
    }

    #[test]
    fn test_gallery_clamps_and_handles_empty() {
        let gallery = Gallery::new(vec!["a".into()], 9);
        assert_eq!(gallery.index(), 0);

        let empty = Gallery::new(Vec::new(), 4);
        assert_eq!(empty.current(), None);
        assert_eq!(empty.next_index(), 0);
        assert_eq!(empty.prev_index(), 0);
    }

    #[test]
    fn test_review_stars() {
        let review = Review {
            rating: 4,
            ..Review::default()
        };
        assert_eq!(review.stars(), (4, 1));
        assert_eq!(review.author(), "Anonymous");
    }
}
