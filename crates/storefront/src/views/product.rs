//! Product detail screen: gallery, reviews and review submission.

use madstore_core::{Gallery, Product, Review};
use tracing::instrument;

use super::{Outcome, ViewScope, failure_message, wishlist};
use crate::api::{ApiClient, ApiError, ReviewRequest};
use crate::store::{Store, StorePersistence};

/// Notice shown when a guest tries to review.
pub const SIGN_IN_FOR_REVIEW: &str = "Please sign in to submit a review.";

/// Rating preselected on the review form.
pub const DEFAULT_RATING: u8 = 5;

/// The product screen's model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPage {
    pub product: Option<Product>,
    pub reviews: Vec<Review>,
    pub gallery: Gallery,
    pub error: Option<String>,
}

/// Load a product, then its reviews.
///
/// `image` selects the gallery position; it is clamped to the gallery.
#[instrument(skip(api, store, scope))]
pub async fn detail<P: StorePersistence>(
    api: &ApiClient,
    store: &mut Store<P>,
    scope: &ViewScope,
    slug: &str,
    image: usize,
) -> ProductPage {
    let mut page = ProductPage {
        product: None,
        reviews: Vec::new(),
        gallery: Gallery::new(Vec::new(), 0),
        error: None,
    };

    match scope.run(api.product_detail(slug)).await {
        Ok(product) => page.product = product,
        Err(e) => page.error = Some(failure_message(&e, "Failed to load product")),
    }

    if let Some(product) = &page.product {
        page.gallery = Gallery::new(product.gallery_images(), image);
        match scope.run(api.reviews(product.id)).await {
            Ok(reviews) => page.reviews = reviews,
            Err(e) => page.error = Some(failure_message(&e, "Failed to load reviews")),
        }
    }

    wishlist::refresh_quietly(api, store, scope).await;
    page
}

/// A submitted review form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    pub rating: u8,
    pub review: String,
}

impl ReviewDraft {
    /// Parse the form's rating, falling back to [`DEFAULT_RATING`] outside
    /// one to five.
    #[must_use]
    pub fn new(rating: Option<&str>, review: impl Into<String>) -> Self {
        let rating = rating
            .and_then(|r| r.trim().parse::<u8>().ok())
            .filter(|r| (1..=5).contains(r))
            .unwrap_or(DEFAULT_RATING);
        Self {
            rating,
            review: review.into(),
        }
    }
}

/// What became of a review submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The created review, to be shown first.
    Created(Review),
    /// Nothing to submit.
    Ignored,
    /// Guest or API failure.
    Rejected(Outcome),
}

/// Submit a review for a product.
///
/// Guests get [`SIGN_IN_FOR_REVIEW`]; blank text is ignored.
#[instrument(skip(api, store, scope, draft))]
pub async fn submit_review<P: StorePersistence>(
    api: &ApiClient,
    store: &Store<P>,
    scope: &ViewScope,
    product: &Product,
    draft: &ReviewDraft,
) -> ReviewOutcome {
    if !store.state().is_signed_in() {
        return ReviewOutcome::Rejected(Outcome::Notice(SIGN_IN_FOR_REVIEW.to_string()));
    }
    if draft.review.trim().is_empty() {
        return ReviewOutcome::Ignored;
    }

    let request = ReviewRequest {
        product_id: product.id,
        email: store.state().request_email(),
        rating: draft.rating,
        review: &draft.review,
    };
    match scope.run(api.add_review(&request)).await {
        Ok(review) => ReviewOutcome::Created(review),
        Err(ApiError::Cancelled) => ReviewOutcome::Ignored,
        Err(e) => ReviewOutcome::Rejected(Outcome::failed(&e, "Failed to submit review")),
    }
}

/// Put a new review at the top of the list.
pub fn prepend_review(reviews: &mut Vec<Review>, review: Review) {
    reviews.insert(0, review);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::{MemoryPersistence, Snapshot};
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;
    use madstore_core::{Email, ProductId, ReviewId, User};
    use serde_json::json;

    async fn store(signed_in: bool) -> Store<MemoryPersistence> {
        let user = signed_in.then(|| User {
            id: None,
            email: Email::parse("jane@example.com").unwrap(),
            first_name: None,
            last_name: None,
            profile_picture_url: None,
        });
        Store::open(MemoryPersistence::new(Snapshot {
            user,
            ..Snapshot::default()
        }))
        .await
        .unwrap()
    }

    fn tee() -> Product {
        Product {
            id: ProductId::new(4),
            slug: "tee".into(),
            name: "Tee".into(),
            ..Product::default()
        }
    }

    #[tokio::test]
    async fn test_detail_loads_product_then_reviews() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/product_details/tee");
                then.status(200).json_body(json!([{
                    "id": 4, "slug": "tee", "name": "Tee", "price": "499",
                    "all_images": ["/media/a.jpg", "/media/b.jpg"]
                }]));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/reviews/4/");
                then.status(200)
                    .json_body(json!([{"id": 1, "rating": 4, "review": "Nice"}]));
            })
            .await;

        let api = ApiClient::new(server.url("/"));
        let mut store = store(false).await;
        let page = detail(&api, &mut store, &ViewScope::new(), "tee", 7).await;
        assert_eq!(page.product.unwrap().id, ProductId::new(4));
        assert_eq!(page.reviews.len(), 1);
        assert_eq!(page.gallery.index(), 1);
        assert_eq!(page.gallery.next_index(), 0);
        assert_eq!(page.error, None);
    }

    #[tokio::test]
    async fn test_guest_review_is_rejected() {
        let api = ApiClient::new("http://127.0.0.1:9/");
        let store = store(false).await;
        let outcome = submit_review(
            &api,
            &store,
            &ViewScope::new(),
            &tee(),
            &ReviewDraft::new(Some("5"), "Great"),
        )
        .await;
        assert_eq!(
            outcome,
            ReviewOutcome::Rejected(Outcome::Notice(SIGN_IN_FOR_REVIEW.into()))
        );
    }

    #[tokio::test]
    async fn test_blank_review_is_ignored() {
        let api = ApiClient::new("http://127.0.0.1:9/");
        let store = store(true).await;
        let outcome = submit_review(
            &api,
            &store,
            &ViewScope::new(),
            &tee(),
            &ReviewDraft::new(None, "   "),
        )
        .await;
        assert_eq!(outcome, ReviewOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_review_is_created_and_prepended() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/add_review/").json_body(json!({
                    "product_id": 4, "email": "jane@example.com",
                    "rating": 3, "review": "Decent"
                }));
                then.status(201)
                    .json_body(json!({"id": 8, "rating": 3, "review": "Decent"}));
            })
            .await;

        let api = ApiClient::new(server.url("/"));
        let store = store(true).await;
        let outcome = submit_review(
            &api,
            &store,
            &ViewScope::new(),
            &tee(),
            &ReviewDraft::new(Some("3"), "Decent"),
        )
        .await;
        let ReviewOutcome::Created(review) = outcome else {
            panic!("expected a created review");
        };

        let mut reviews = vec![Review {
            id: ReviewId::new(1),
            ..Review::default()
        }];
        prepend_review(&mut reviews, review);
        assert_eq!(reviews[0].id, ReviewId::new(8));
        mock.assert_async().await;
    }

    #[test]
    fn test_review_draft_rating() {
        assert_eq!(ReviewDraft::new(Some("2"), "").rating, 2);
        assert_eq!(ReviewDraft::new(Some("9"), "").rating, DEFAULT_RATING);
        assert_eq!(ReviewDraft::new(Some("x"), "").rating, DEFAULT_RATING);
    }
}
