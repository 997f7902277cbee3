//! End-to-end storefront flows against a mocked Madstore API.
//!
//! Run with: cargo test -p madstore-integration-tests

#![allow(clippy::unwrap_used)]

use httpmock::Method::{GET, POST};
use httpmock::{Mock, MockServer};
use madstore_integration_tests::{TestContext, location};
use reqwest::StatusCode;
use serde_json::json;

async fn mock_cart(api: &MockServer, items: serde_json::Value) -> Mock<'_> {
    api.mock_async(|when, then| {
        when.method(GET).path_contains("/cart/");
        then.status(200).json_body(json!({
            "cart_code": "server_side",
            "cartitems": items,
            "cart_total": "200.00"
        }));
    })
    .await
}

fn tee_line() -> serde_json::Value {
    json!([{
        "id": 1,
        "quantity": 2,
        "product": {"id": 7, "slug": "tee", "name": "Red Tee", "price": "100.00"}
    }])
}

async fn mock_login(api: &MockServer) -> Mock<'_> {
    api.mock_async(|when, then| {
        when.method(POST).path("/auth/login/");
        then.status(200).json_body(json!({
            "user": {"id": 1, "email": "jane@example.com", "first_name": "Jane",
                     "last_name": "Doe", "profile_picture_url": null},
            "message": "Login successful."
        }));
    })
    .await
}

async fn sign_in(ctx: &TestContext) {
    let response = ctx
        .post_form("/login", &[("email", "jane@example.com"), ("password", "pw")])
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

const BUYER: [(&str, &str); 4] = [
    ("buyer_name", "Jane Doe"),
    ("address_line", "123 St"),
    ("city", "Kochi"),
    ("country", "India"),
];

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await;
    let response = ctx.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");

    // No database behind the test app
    assert_eq!(ctx.get("/health/ready").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_guest_add_to_cart_goes_to_login_then_works_after_sign_in() {
    let ctx = TestContext::new().await;
    let add = ctx
        .api
        .mock_async(|when, then| {
            when.method(POST)
                .path("/add_to_cart/")
                .json_body_partial(r#"{"product_id": 7}"#);
            then.status(200).json_body(json!({"cart_code": "c1", "cartitems": []}));
        })
        .await;
    mock_login(&ctx.api).await;

    let response = ctx.post_form("/cart/add", &[("product_id", "7")]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert_eq!(add.hits_async().await, 0);

    sign_in(&ctx).await;

    let response = ctx
        .post_form("/cart/add", &[("product_id", "7"), ("next", "/product/tee")])
        .await;
    assert_eq!(location(&response), "/product/tee");
    add.assert_async().await;
}

#[tokio::test]
async fn test_add_to_cart_ignores_offsite_next() {
    let ctx = TestContext::new().await;
    ctx.api
        .mock_async(|when, then| {
            when.method(POST).path("/add_to_cart/");
            then.status(200).json_body(json!({"cart_code": "c1", "cartitems": []}));
        })
        .await;
    mock_login(&ctx.api).await;
    sign_in(&ctx).await;

    let response = ctx
        .post_form("/cart/add", &[("product_id", "7"), ("next", "//evil.example")])
        .await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_cod_checkout_places_order_and_clears_cart() {
    let ctx = TestContext::new().await;
    let mut cart = mock_cart(&ctx.api, tee_line()).await;
    let place = ctx
        .api
        .mock_async(|when, then| {
            when.method(POST)
                .path("/place_order/")
                .json_body_partial(r#"{"payment_method": "COD", "email": "guest@madstore.local"}"#);
            then.status(201).json_body(json!({
                "message": "Order placed",
                "order": {"order_id": "ORD1"}
            }));
        })
        .await;

    let page = ctx.get("/cart").await.text().await.unwrap();
    assert!(page.contains("Red Tee"));

    let mut form = BUYER.to_vec();
    form.push(("payment_method", "COD"));
    let response = ctx.post_form("/checkout", &form).await;
    assert_eq!(location(&response), "/cart");
    place.assert_async().await;

    // The server cart is empty once the order exists
    cart.delete_async().await;
    mock_cart(&ctx.api, json!([])).await;

    let page = ctx.get("/cart").await.text().await.unwrap();
    assert!(page.contains("Order placed. Order ID: ORD1"));
    assert!(page.contains("Your cart is empty."));

    // The notice is shown once
    let page = ctx.get("/cart").await.text().await.unwrap();
    assert!(!page.contains("Order placed."));
}

#[tokio::test]
async fn test_checkout_with_missing_address_keeps_form() {
    let ctx = TestContext::new().await;
    mock_cart(&ctx.api, tee_line()).await;
    let place = ctx
        .api
        .mock_async(|when, then| {
            when.method(POST).path("/place_order/");
            then.status(201).json_body(json!({"order": {"order_id": "ORD1"}}));
        })
        .await;

    ctx.get("/cart").await;
    let response = ctx
        .post_form(
            "/checkout",
            &[("buyer_name", "Jane Doe"), ("city", "Kochi"), ("payment_method", "COD")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = response.text().await.unwrap();
    assert!(page.contains("Please fill buyer name and full delivery address."));
    assert!(page.contains("Jane Doe"));
    assert_eq!(place.hits_async().await, 0);
}

#[tokio::test]
async fn test_card_checkout_without_url_stays_on_cart() {
    let ctx = TestContext::new().await;
    mock_cart(&ctx.api, tee_line()).await;
    let checkout = ctx
        .api
        .mock_async(|when, then| {
            when.method(POST).path("/checkout/");
            then.status(200).json_body(json!({"data": {}}));
        })
        .await;

    ctx.get("/cart").await;
    let mut form = BUYER.to_vec();
    form.push(("payment_method", "CARD"));
    let response = ctx.post_form("/checkout", &form).await;

    assert_eq!(response.status(), StatusCode::OK);
    let page = response.text().await.unwrap();
    assert!(page.contains("Stripe checkout URL not returned by the backend."));
    checkout.assert_async().await;
}

#[tokio::test]
async fn test_card_checkout_redirects_to_hosted_page() {
    let ctx = TestContext::new().await;
    mock_cart(&ctx.api, tee_line()).await;
    ctx.api
        .mock_async(|when, then| {
            when.method(POST).path("/checkout/");
            then.status(200)
                .json_body(json!({"data": {"url": "https://checkout.stripe.com/pay/cs_1"}}));
        })
        .await;

    ctx.get("/cart").await;
    let mut form = BUYER.to_vec();
    form.push(("payment_method", "CARD"));
    let response = ctx.post_form("/checkout", &form).await;
    assert_eq!(location(&response), "https://checkout.stripe.com/pay/cs_1");
}

#[tokio::test]
async fn test_logout_starts_a_fresh_guest_session() {
    let ctx = TestContext::new().await;
    mock_login(&ctx.api).await;
    sign_in(&ctx).await;

    let page = ctx.get("/account").await.text().await.unwrap();
    assert!(page.contains("jane@example.com"));

    let response = ctx.post_form("/logout", &[]).await;
    assert_eq!(location(&response), "/");

    let response = ctx.get("/account").await;
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_failed_login_shows_message_without_password() {
    let ctx = TestContext::new().await;
    ctx.api
        .mock_async(|when, then| {
            when.method(POST).path("/auth/login/");
            then.status(401).json_body(json!({"error": "Invalid credentials."}));
        })
        .await;

    let response = ctx
        .post_form(
            "/login",
            &[("email", "jane@example.com"), ("password", "secret-pw")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = response.text().await.unwrap();
    assert!(page.contains("Invalid credentials."));
    assert!(page.contains("jane@example.com"));
    assert!(!page.contains("secret-pw"));
}
