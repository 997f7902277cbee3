//! Orders list, order detail and delivery OTP.

use std::collections::HashMap;

use madstore_core::{DeliveryFilter, Order, OrderId};
use tracing::instrument;

use super::{Outcome, ViewScope, failure_message};
use crate::api::{ApiClient, ApiError};
use crate::store::{Store, StorePersistence};

/// Notice after an OTP request when the API sends no message.
pub const OTP_SENT: &str = "OTP sent successfully.";

/// Label of the OTP button.
#[must_use]
pub const fn otp_label(requested: bool) -> &'static str {
    if requested { "RESEND OTP" } else { "GET OTP" }
}

/// Which orders already had an OTP sent, by reference.
#[must_use]
pub fn otp_requested_map(orders: &[Order]) -> HashMap<OrderId, bool> {
    orders
        .iter()
        .map(|order| (order.order_id.clone(), order.otp_requested()))
        .collect()
}

/// A per-order notice left by the last OTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpNotice {
    pub order_id: OrderId,
    pub message: String,
    /// Whether the request went through.
    pub sent: bool,
}

/// The orders screen's model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrdersPage {
    pub signed_in: bool,
    pub orders: Vec<Order>,
    pub filter: DeliveryFilter,
    pub expanded: Option<OrderId>,
    pub otp_requested: HashMap<OrderId, bool>,
    pub otp_notice: Option<OtpNotice>,
    pub error: Option<String>,
}

impl OrdersPage {
    /// Orders passing the delivery filter.
    #[must_use]
    pub fn visible(&self) -> Vec<&Order> {
        self.filter.apply(&self.orders)
    }

    #[must_use]
    pub fn is_expanded(&self, order_id: &OrderId) -> bool {
        self.expanded.as_ref() == Some(order_id)
    }

    #[must_use]
    pub fn is_otp_requested(&self, order_id: &OrderId) -> bool {
        self.otp_requested.get(order_id).copied().unwrap_or(false)
    }

    /// Show the result of an OTP request against its order.
    pub fn apply_otp_notice(&mut self, notice: OtpNotice) {
        if notice.sent {
            self.otp_requested.insert(notice.order_id.clone(), true);
        }
        self.otp_notice = Some(notice);
    }

    /// The OTP notice for an order, if the last request was for it.
    #[must_use]
    pub fn otp_notice_for(&self, order_id: &OrderId) -> Option<&str> {
        self.otp_notice
            .as_ref()
            .filter(|notice| &notice.order_id == order_id)
            .map(|notice| notice.message.as_str())
    }
}

/// Load the signed-in user's orders. Guests get a sign-in panel.
#[instrument(skip(api, store, scope))]
pub async fn list<P: StorePersistence>(
    api: &ApiClient,
    store: &Store<P>,
    scope: &ViewScope,
    filter: DeliveryFilter,
    expanded: Option<OrderId>,
) -> OrdersPage {
    let mut page = OrdersPage {
        filter,
        expanded,
        ..OrdersPage::default()
    };
    let Some(user) = &store.state().user else {
        return page;
    };
    page.signed_in = true;

    match scope.run(api.orders(&user.email.lookup_key())).await {
        Ok(orders) => {
            page.otp_requested = otp_requested_map(&orders);
            page.orders = orders;
        }
        Err(e) => page.error = Some(failure_message(&e, "Failed to load orders.")),
    }
    page
}

/// Ask the API to email a delivery OTP for an order.
///
/// Success and failure both produce a notice for the order.
#[instrument(skip(api, store, scope), fields(order_id = %order_id))]
pub async fn request_otp<P: StorePersistence>(
    api: &ApiClient,
    store: &Store<P>,
    scope: &ViewScope,
    order_id: &OrderId,
) -> Result<OtpNotice, Outcome> {
    let Some(user) = &store.state().user else {
        return Err(Outcome::login());
    };

    match scope
        .run(api.send_order_otp(order_id, &user.email.lookup_key()))
        .await
    {
        Ok(response) => Ok(OtpNotice {
            order_id: order_id.clone(),
            message: response
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| OTP_SENT.to_string()),
            sent: true,
        }),
        Err(ApiError::Cancelled) => Err(Outcome::Done),
        Err(e) => Ok(OtpNotice {
            order_id: order_id.clone(),
            message: failure_message(&e, "Failed to send OTP."),
            sent: false,
        }),
    }
}

/// The order detail screen's model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDetailPage {
    pub signed_in: bool,
    pub order: Option<Order>,
    pub otp_requested: bool,
    pub otp_notice: Option<OtpNotice>,
    pub error: Option<String>,
}

impl OrderDetailPage {
    /// Show the result of an OTP request.
    pub fn apply_otp_notice(&mut self, notice: OtpNotice) {
        self.otp_requested |= notice.sent;
        self.otp_notice = Some(notice);
    }
}

/// Load one order. Guests get a sign-in panel.
#[instrument(skip(api, store, scope), fields(order_id = %order_id))]
pub async fn detail<P: StorePersistence>(
    api: &ApiClient,
    store: &Store<P>,
    scope: &ViewScope,
    order_id: &OrderId,
) -> OrderDetailPage {
    if !store.state().is_signed_in() {
        return OrderDetailPage::default();
    }
    let mut page = OrderDetailPage {
        signed_in: true,
        ..OrderDetailPage::default()
    };
    if order_id.as_str().trim().is_empty() {
        page.error = Some("Order id is missing.".to_string());
        return page;
    }

    match scope.run(api.track_order(order_id)).await {
        Ok(order) => {
            page.otp_requested = order.otp_requested();
            page.order = Some(order);
        }
        Err(e) => page.error = Some(failure_message(&e, "Failed to load order details.")),
    }
    page
}

/// What became of a mark-as-received request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceivedOutcome {
    /// The API returned the updated order.
    Updated(Box<Order>),
    /// Accepted without an order in the answer.
    Unchanged,
    /// Guest, failure or cancellation.
    Rejected(Outcome),
}

/// Confirm that an order arrived.
#[instrument(skip(api, store, scope), fields(order_id = %order_id))]
pub async fn mark_received<P: StorePersistence>(
    api: &ApiClient,
    store: &Store<P>,
    scope: &ViewScope,
    order_id: &OrderId,
) -> ReceivedOutcome {
    let Some(user) = &store.state().user else {
        return ReceivedOutcome::Rejected(Outcome::login());
    };

    match scope
        .run(api.mark_received(order_id, &user.email.lookup_key()))
        .await
    {
        Ok(Some(order)) => ReceivedOutcome::Updated(Box::new(order)),
        Ok(None) => ReceivedOutcome::Unchanged,
        Err(ApiError::Cancelled) => ReceivedOutcome::Rejected(Outcome::Done),
        Err(e) => ReceivedOutcome::Rejected(Outcome::failed(&e, "Failed to update order.")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::{MemoryPersistence, Snapshot};
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;
    use madstore_core::{Email, User};
    use serde_json::json;

    async fn store(signed_in: bool) -> Store<MemoryPersistence> {
        let user = signed_in.then(|| User {
            id: None,
            email: Email::parse("Jane@Example.com").unwrap(),
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

    fn orders_json() -> serde_json::Value {
        json!([
            {"order_id": "ORD1", "delivery_status": "Delivered", "created_at": "2025-01-10T09:00:00Z"},
            {"order_id": "ORD2", "delivery_status": "Pending", "otp_sent_at": "2025-01-11T09:00:00Z"},
            {"order_id": "ORD3", "delivery_status": "Shipped"}
        ])
    }

    #[tokio::test]
    async fn test_guest_sees_sign_in_panel() {
        let api = ApiClient::new("http://127.0.0.1:9/");
        let store = store(false).await;
        let page = list(&api, &store, &ViewScope::new(), DeliveryFilter::All, None).await;
        assert!(!page.signed_in);
        assert!(page.orders.is_empty());
    }

    #[tokio::test]
    async fn test_list_uses_lowercased_email_and_partitions() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/orders/")
                    .query_param("email", "jane@example.com");
                then.status(200).json_body(orders_json());
            })
            .await;

        let api = ApiClient::new(server.url("/"));
        let store = store(true).await;
        let scope = ViewScope::new();
        let all = list(&api, &store, &scope, DeliveryFilter::All, None).await;
        let delivered = list(&api, &store, &scope, DeliveryFilter::Delivered, None).await;
        let pending = list(&api, &store, &scope, DeliveryFilter::NotDelivered, None).await;

        assert_eq!(all.visible().len(), 3);
        assert_eq!(
            delivered.visible().len() + pending.visible().len(),
            all.visible().len()
        );
        assert!(all.is_otp_requested(&OrderId::new("ORD2")));
        assert!(!all.is_otp_requested(&OrderId::new("ORD3")));
        mock.assert_hits_async(3).await;
    }

    #[tokio::test]
    async fn test_otp_success_marks_requested() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/orders/ORD3/send-otp/")
                    .json_body(json!({"email": "jane@example.com"}));
                then.status(200).json_body(json!({"order_id": "ORD3"}));
            })
            .await;

        let api = ApiClient::new(server.url("/"));
        let store = store(true).await;
        let notice = request_otp(&api, &store, &ViewScope::new(), &OrderId::new("ORD3"))
            .await
            .unwrap();
        assert_eq!(notice.message, OTP_SENT);
        assert!(notice.sent);

        let mut page = OrdersPage::default();
        page.apply_otp_notice(notice);
        let id = OrderId::new("ORD3");
        assert_eq!(otp_label(page.is_otp_requested(&id)), "RESEND OTP");
        assert_eq!(page.otp_notice_for(&id), Some(OTP_SENT));
        assert_eq!(page.otp_notice_for(&OrderId::new("ORD1")), None);
    }

    #[tokio::test]
    async fn test_otp_failure_is_surfaced() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/orders/ORD2/send-otp/");
                then.status(429)
                    .json_body(json!({"error": "Please wait before requesting another OTP."}));
            })
            .await;

        let api = ApiClient::new(server.url("/"));
        let store = store(true).await;
        let notice = request_otp(&api, &store, &ViewScope::new(), &OrderId::new("ORD2"))
            .await
            .unwrap();
        assert!(!notice.sent);
        assert_eq!(notice.message, "Please wait before requesting another OTP.");

        let mut page = OrderDetailPage::default();
        page.apply_otp_notice(notice);
        assert!(!page.otp_requested);
        assert!(page.otp_notice.is_some());
    }

    #[tokio::test]
    async fn test_detail_and_mark_received() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/orders/track/ORD2/");
                then.status(200).json_body(json!({
                    "order_id": "ORD2", "delivery_status": "Pending",
                    "otp_sent_at": "2025-01-11T09:00:00Z"
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/orders/ORD2/received/");
                then.status(200).json_body(json!({
                    "message": "Order marked as received.",
                    "order": {"order_id": "ORD2", "delivery_status": "Delivered", "is_received": true}
                }));
            })
            .await;

        let api = ApiClient::new(server.url("/"));
        let store = store(true).await;
        let scope = ViewScope::new();
        let id = OrderId::new("ORD2");

        let page = detail(&api, &store, &scope, &id).await;
        assert!(page.otp_requested);
        assert!(!page.order.unwrap().is_delivered());

        let ReceivedOutcome::Updated(order) = mark_received(&api, &store, &scope, &id).await else {
            panic!("expected the updated order");
        };
        assert!(order.is_delivered());
        assert!(order.is_received);
    }
}
