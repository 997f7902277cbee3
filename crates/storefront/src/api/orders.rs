//! Checkout and order endpoints.

use madstore_core::{Order, OrderId};
use tracing::instrument;

use super::types::{
    CheckoutRequest, CheckoutSessionResponse, FinalizeRequest, OrderEnvelope, EmailRequest,
    OtpResponse, PlaceOrderResponse,
};
use super::{ApiClient, ApiError, decode, decode_list, segment};

impl ApiClient {
    /// Place a cash-on-delivery order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self, request), fields(cart_code = %request.cart_code))]
    pub async fn place_order(
        &self,
        request: &CheckoutRequest,
    ) -> Result<PlaceOrderResponse, ApiError> {
        let payload = self.post_json("place_order/", request).await?;
        decode("place_order/", payload)
    }

    /// Start a hosted card checkout and return its URL, if the API sent one.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self, request), fields(cart_code = %request.cart_code))]
    pub async fn start_checkout(&self, request: &CheckoutRequest) -> Result<Option<String>, ApiError> {
        let payload = self.post_json("checkout/", request).await?;
        let response: CheckoutSessionResponse = decode("checkout/", payload)?;
        Ok(response
            .data
            .and_then(|session| session.url)
            .filter(|url| !url.is_empty()))
    }

    /// Ask the API to finalize a paid checkout session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn finalize_checkout(&self, session_id: &str) -> Result<(), ApiError> {
        self.post_json("checkout/finalize/", &FinalizeRequest { session_id })
            .await?;
        Ok(())
    }

    /// Orders for a (lower-cased) email.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn orders(&self, email: &str) -> Result<Vec<Order>, ApiError> {
        let path = format!("orders/?email={}", urlencoding::encode(email));
        let payload = self.get(&path).await?;
        decode_list("orders/", payload)
    }

    /// One order by its reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn track_order(&self, order_id: &OrderId) -> Result<Order, ApiError> {
        let path = format!("orders/track/{}/", segment(order_id.as_str()));
        let payload = self.get(&path).await?;
        decode(&path, payload)
    }

    /// Request a delivery OTP for an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn send_order_otp(
        &self,
        order_id: &OrderId,
        email: &str,
    ) -> Result<OtpResponse, ApiError> {
        let path = format!("orders/{}/send-otp/", segment(order_id.as_str()));
        let payload = self.post_json(&path, &EmailRequest { email }).await?;
        decode(&path, payload)
    }

    /// Mark an order as received and return the updated order, if sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn mark_received(
        &self,
        order_id: &OrderId,
        email: &str,
    ) -> Result<Option<Order>, ApiError> {
        let path = format!("orders/{}/received/", segment(order_id.as_str()));
        let payload = self.post_json(&path, &EmailRequest { email }).await?;
        let envelope: OrderEnvelope = decode(&path, payload)?;
        Ok(envelope.order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;
    use madstore_core::{CartCode, PaymentMethod};
    use serde_json::json;

    fn checkout(method: PaymentMethod) -> CheckoutRequest {
        CheckoutRequest {
            cart_code: CartCode::new("c1"),
            email: "jane@example.com".into(),
            buyer_name: "A".into(),
            phone: String::new(),
            address_line: "123 St".into(),
            city: "X".into(),
            state: String::new(),
            postal_code: String::new(),
            country: "Y".into(),
            payment_method: method,
        }
    }

    #[tokio::test]
    async fn test_place_order_minimal_response() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/place_order/").json_body(json!({
                    "cart_code": "c1", "email": "jane@example.com", "buyer_name": "A",
                    "phone": "", "address_line": "123 St", "city": "X", "state": "",
                    "postal_code": "", "country": "Y", "payment_method": "COD"
                }));
                then.status(201).json_body(json!({"order": {"order_id": "ORD1"}}));
            })
            .await;

        let api = ApiClient::new(server.url("/"));
        let response = api.place_order(&checkout(PaymentMethod::Cod)).await.unwrap();
        assert_eq!(response.order.unwrap().order_id.as_str(), "ORD1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_start_checkout_without_url() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/checkout/");
                then.status(200).json_body(json!({"data": {"id": "cs_1"}}));
            })
            .await;

        let api = ApiClient::new(server.url("/"));
        let url = api.start_checkout(&checkout(PaymentMethod::Card)).await.unwrap();
        assert_eq!(url, None);
    }

    #[tokio::test]
    async fn test_start_checkout_with_url() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/checkout/");
                then.status(200)
                    .json_body(json!({"data": {"url": "https://checkout.stripe.com/c/pay/cs_1"}}));
            })
            .await;

        let api = ApiClient::new(server.url("/"));
        let url = api.start_checkout(&checkout(PaymentMethod::Card)).await.unwrap();
        assert_eq!(url.as_deref(), Some("https://checkout.stripe.com/c/pay/cs_1"));
    }

    #[tokio::test]
    async fn test_orders_non_array_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/orders/").query_param("email", "jane@example.com");
                then.status(200).json_body(json!({"unexpected": true}));
            })
            .await;

        let api = ApiClient::new(server.url("/"));
        assert!(api.orders("jane@example.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_otp_posts_email() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/orders/ORD1/send-otp/")
                    .json_body(json!({"email": "jane@example.com"}));
                then.status(200).json_body(json!({
                    "message": "OTP sent to customer email.",
                    "order_id": "ORD1",
                    "expires_at": "2025-01-01T00:10:00Z"
                }));
            })
            .await;

        let api = ApiClient::new(server.url("/"));
        let response = api
            .send_order_otp(&OrderId::new("ORD1"), "jane@example.com")
            .await
            .unwrap();
        assert_eq!(response.message.as_deref(), Some("OTP sent to customer email."));
        mock.assert_async().await;
    }
}
