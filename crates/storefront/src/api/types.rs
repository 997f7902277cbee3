//! Request and response bodies for the Madstore API.
//!
//! Domain types (products, carts, orders) live in `madstore-core`; this module
//! only holds the envelopes around them.

use madstore_core::{
    CartCode, CartItemId, Email, Order, OrderId, PaymentMethod, ProductId, User,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct AddToCartRequest<'a> {
    pub cart_code: &'a CartCode,
    pub product_id: ProductId,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateQuantityRequest {
    pub item_id: CartItemId,
    pub quantity: u32,
}

/// The item echoed back after a quantity update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct QuantityUpdate {
    pub id: CartItemId,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct WishlistRequest<'a> {
    pub email: &'a str,
    pub product_id: ProductId,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewRequest<'a> {
    pub product_id: ProductId,
    pub email: &'a str,
    pub rating: u8,
    pub review: &'a str,
}

/// Buyer details plus cart reference, shared by COD and card checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutRequest {
    pub cart_code: CartCode,
    pub email: String,
    pub buyer_name: String,
    pub phone: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlaceOrderResponse {
    pub message: Option<String>,
    pub order: Option<Order>,
    pub mail_warning: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutSession {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutSessionResponse {
    pub data: Option<CheckoutSession>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinalizeRequest<'a> {
    pub session_id: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OtpResponse {
    pub message: Option<String>,
    pub order_id: Option<OrderId>,
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderEnvelope {
    pub message: Option<String>,
    pub order: Option<Order>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoogleLoginRequest<'a> {
    pub id_token: &'a str,
}

/// Response of the password and Google sign-in endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthResponse {
    pub user: Option<User>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GoogleConfigResponse {
    pub client_id: Option<String>,
}

/// Email used in request bodies: the signed-in user's, else the active one.
#[must_use]
pub fn request_email<'a>(user: Option<&'a User>, active: &'a Email) -> &'a str {
    user.map_or_else(|| active.as_str(), |u| u.email.as_str())
}
