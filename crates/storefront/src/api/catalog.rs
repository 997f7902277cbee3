//! Catalog endpoints: products, categories, carousel, search and reviews.

use madstore_core::{CarouselItem, Category, Product, ProductId, Review};
use tracing::instrument;

use super::types::ReviewRequest;
use super::{ApiClient, ApiError, decode, decode_list, first_or_self, segment};

impl ApiClient {
    /// All products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        let payload = self.get("product/").await?;
        decode_list("product/", payload)
    }

    /// All categories (without embedded products).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let payload = self.get("categories/").await?;
        decode_list("categories/", payload)
    }

    /// Home page carousel slides.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn carousel(&self) -> Result<Vec<CarouselItem>, ApiError> {
        let payload = self.get("carousel/").await?;
        decode_list("carousel/", payload)
    }

    /// One category with its products, or `None` when the API returns nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn category_detail(&self, slug: &str) -> Result<Option<Category>, ApiError> {
        let path = format!("category_detail/{}", segment(slug));
        let payload = first_or_self(self.get(&path).await?);
        decode(&path, payload)
    }

    /// One product with its gallery, or `None` when the API returns nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn product_detail(&self, slug: &str) -> Result<Option<Product>, ApiError> {
        let path = format!("product_details/{}", segment(slug));
        let payload = first_or_self(self.get(&path).await?);
        decode(&path, payload)
    }

    /// Products matching a free-text query.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let path = format!("search?query={}", urlencoding::encode(query));
        let payload = self.get(&path).await?;
        decode_list("search", payload)
    }

    /// Reviews for a product, newest first as returned by the API.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn reviews(&self, product_id: ProductId) -> Result<Vec<Review>, ApiError> {
        let path = format!("reviews/{product_id}/");
        let payload = self.get(&path).await?;
        decode_list(&path, payload)
    }

    /// Submit a review and return the created review.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self, request), fields(product_id = %request.product_id))]
    pub async fn add_review(&self, request: &ReviewRequest<'_>) -> Result<Review, ApiError> {
        let payload = self.post_json("add_review/", request).await?;
        decode("add_review/", payload)
    }
}
