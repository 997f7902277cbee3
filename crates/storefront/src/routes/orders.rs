//! Orders list, order detail and delivery OTP route handlers.
//!
//! OTP results travel to the next render as a flash targeted at the order, so
//! the notice shows on that order's row.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use madstore_core::{DeliveryFilter, Order, OrderId, OrderItem, resolve_image_url};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::common::{NavView, NoticeView, reply};
use crate::error::Result;
use crate::middleware::{ClientStore, set_flash, take_flash};
use crate::models::Flash;
use crate::state::AppState;
use crate::views::orders::{OrderDetailPage, OtpNotice, ReceivedOutcome, otp_label};
use crate::views::{self, ViewScope};

/// Path of an order's detail page.
fn detail_path(order_id: &OrderId) -> String {
    format!("/orders/{}", urlencoding::encode(order_id.as_str()))
}

/// Split a flash into a page notice and an OTP notice for one order.
fn split_flash(flash: Option<Flash>) -> (Option<Flash>, Option<OtpNotice>) {
    match flash {
        Some(Flash {
            message,
            target: Some(target),
            ok,
        }) => (
            None,
            Some(OtpNotice {
                order_id: OrderId::new(target),
                message,
                sent: ok,
            }),
        ),
        other => (other, None),
    }
}

/// Order line display data.
#[derive(Clone)]
pub struct OrderItemView {
    pub name: String,
    pub slug: String,
    pub image: String,
    pub quantity: u32,
    pub unit_price: String,
}

impl OrderItemView {
    fn new(item: &OrderItem, api_base: &str) -> Self {
        Self {
            name: item.product.name.clone(),
            slug: item.product.slug.clone(),
            image: resolve_image_url(item.product.card_image(), api_base),
            quantity: item.quantity,
            unit_price: item.unit_price_display(),
        }
    }
}

/// Order display data.
#[derive(Clone)]
pub struct OrderView {
    pub id: String,
    pub href: String,
    pub status: String,
    pub delivery_status: String,
    pub delivered: bool,
    pub is_received: bool,
    pub amount: String,
    pub subtotal: String,
    pub delivery_charge: String,
    pub created: String,
    pub estimated_delivery: String,
    pub buyer_name: String,
    pub phone: String,
    pub address: String,
    pub payment_method: String,
    pub items: Vec<OrderItemView>,
    pub otp_label: &'static str,
    pub otp_notice: Option<NoticeView>,
    pub expanded: bool,
    /// Link that expands or collapses the row.
    pub toggle_href: String,
}

impl OrderView {
    fn new(order: &Order, otp_requested: bool, api_base: &str) -> Self {
        let address = [
            Some(order.address_line.as_str()),
            Some(order.city.as_str()),
            order.state.as_deref(),
            order.postal_code.as_deref(),
            Some(order.country.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

        Self {
            id: order.order_id.to_string(),
            href: detail_path(&order.order_id),
            status: order.status.clone(),
            delivery_status: order.delivery_status.clone(),
            delivered: order.is_delivered(),
            is_received: order.is_received,
            amount: order.amount_display(),
            subtotal: order.subtotal_display(),
            delivery_charge: order.delivery_charge_display(),
            created: order.created_display(),
            estimated_delivery: order.estimated_delivery_display(),
            buyer_name: order.buyer_name.clone(),
            phone: order.phone.clone().unwrap_or_default(),
            address,
            payment_method: order.payment_method.clone(),
            items: order
                .items
                .iter()
                .map(|item| OrderItemView::new(item, api_base))
                .collect(),
            otp_label: otp_label(otp_requested),
            otp_notice: None,
            expanded: false,
            toggle_href: String::new(),
        }
    }
}

/// Delivery filter tab display data.
#[derive(Clone)]
pub struct FilterTab {
    pub value: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// Orders page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub nav: NavView,
    pub signed_in: bool,
    pub filters: Vec<FilterTab>,
    pub filter: &'static str,
    pub orders: Vec<OrderView>,
    pub error: Option<String>,
}

/// Orders page query parameters.
#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub filter: Option<String>,
    pub expanded: Option<String>,
}

/// Display the signed-in user's orders.
#[instrument(skip(state, session, store))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    ClientStore(mut store): ClientStore,
    Query(query): Query<OrdersQuery>,
) -> Result<OrdersTemplate> {
    let filter = query
        .filter
        .as_deref()
        .and_then(|f| f.parse::<DeliveryFilter>().ok())
        .unwrap_or_default();
    let expanded = query
        .expanded
        .filter(|id| !id.is_empty())
        .map(OrderId::new);

    let scope = ViewScope::new();
    store.reconcile_cart(state.api(), &scope).await;
    let mut page = views::orders::list(state.api(), &store, &scope, filter, expanded).await;
    store.save().await?;

    let (flash, otp_notice) = split_flash(take_flash(&session).await);
    if let Some(notice) = otp_notice {
        page.apply_otp_notice(notice);
    }

    let api_base = state.api().base_url();
    let orders = page
        .visible()
        .into_iter()
        .map(|order| {
            let id = &order.order_id;
            let mut view = OrderView::new(order, page.is_otp_requested(id), api_base);
            view.otp_notice = page.otp_notice_for(id).map(|message| NoticeView {
                message: message.to_string(),
                ok: page.otp_notice.as_ref().is_some_and(|n| n.sent),
            });
            view.expanded = page.is_expanded(id);
            view.toggle_href = if view.expanded {
                format!("/orders?filter={}", filter.as_str())
            } else {
                format!(
                    "/orders?filter={}&expanded={}",
                    filter.as_str(),
                    urlencoding::encode(id.as_str())
                )
            };
            view
        })
        .collect();

    Ok(OrdersTemplate {
        nav: NavView::new(&store, flash),
        signed_in: page.signed_in,
        filters: DeliveryFilter::ALL
            .iter()
            .map(|f| FilterTab {
                value: f.as_str(),
                label: f.label(),
                active: *f == filter,
            })
            .collect(),
        filter: filter.as_str(),
        orders,
        error: page.error,
    })
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderDetailTemplate {
    pub nav: NavView,
    pub signed_in: bool,
    pub order: Option<OrderView>,
    pub error: Option<String>,
}

impl OrderDetailTemplate {
    fn new(page: OrderDetailPage, nav: NavView, api_base: &str) -> Self {
        let order = page.order.as_ref().map(|order| {
            let mut view = OrderView::new(order, page.otp_requested, api_base);
            view.otp_notice = page.otp_notice.as_ref().map(|notice| NoticeView {
                message: notice.message.clone(),
                ok: notice.sent,
            });
            view.expanded = true;
            view
        });
        Self {
            nav,
            signed_in: page.signed_in,
            order,
            error: page.error,
        }
    }
}

/// Display one order.
#[instrument(skip(state, session, store))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    ClientStore(mut store): ClientStore,
    Path(order_id): Path<String>,
) -> Result<OrderDetailTemplate> {
    let order_id = OrderId::new(order_id);

    let scope = ViewScope::new();
    store.reconcile_cart(state.api(), &scope).await;
    let mut page = views::orders::detail(state.api(), &store, &scope, &order_id).await;
    store.save().await?;

    let (flash, otp_notice) = split_flash(take_flash(&session).await);
    if let Some(notice) = otp_notice.filter(|n| n.order_id == order_id) {
        page.apply_otp_notice(notice);
    }

    Ok(OrderDetailTemplate::new(
        page,
        NavView::new(&store, flash),
        state.api().base_url(),
    ))
}

/// The screen an order action was taken from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderScreen {
    #[default]
    List,
    Detail,
}

/// OTP request form data.
#[derive(Debug, Deserialize)]
pub struct OtpForm {
    #[serde(default)]
    pub from: OrderScreen,
    /// Delivery filter of the list the request came from.
    pub filter: Option<String>,
}

impl OtpForm {
    /// Where the request returns to, keeping the list's filter.
    fn back_path(&self, order_id: &OrderId) -> String {
        match self.from {
            OrderScreen::List => {
                let filter = self
                    .filter
                    .as_deref()
                    .and_then(|f| f.parse::<DeliveryFilter>().ok())
                    .unwrap_or_default();
                format!(
                    "/orders?filter={}&expanded={}",
                    filter.as_str(),
                    urlencoding::encode(order_id.as_str())
                )
            }
            OrderScreen::Detail => detail_path(order_id),
        }
    }
}

/// Email a delivery OTP for an order.
#[instrument(skip(state, session, store))]
pub async fn request_otp(
    State(state): State<AppState>,
    session: Session,
    ClientStore(store): ClientStore,
    Path(order_id): Path<String>,
    Form(form): Form<OtpForm>,
) -> Result<Response> {
    let order_id = OrderId::new(order_id);
    let back = form.back_path(&order_id);

    let scope = ViewScope::new();
    match views::orders::request_otp(state.api(), &store, &scope, &order_id).await {
        Ok(notice) => {
            let flash = Flash::targeted(notice.order_id.as_str(), notice.message, notice.sent);
            set_flash(&session, &flash).await?;
            Ok(Redirect::to(&back).into_response())
        }
        Err(outcome) => reply(&session, outcome, &back).await,
    }
}

/// Confirm that an order arrived and show the updated order.
#[instrument(skip(state, session, store))]
pub async fn mark_received(
    State(state): State<AppState>,
    session: Session,
    ClientStore(store): ClientStore,
    Path(order_id): Path<String>,
) -> Result<Response> {
    let order_id = OrderId::new(order_id);

    let scope = ViewScope::new();
    match views::orders::mark_received(state.api(), &store, &scope, &order_id).await {
        ReceivedOutcome::Updated(order) => {
            let page = OrderDetailPage {
                signed_in: true,
                otp_requested: order.otp_requested(),
                order: Some(*order),
                otp_notice: None,
                error: None,
            };
            let nav = NavView::new(&store, take_flash(&session).await);
            Ok(OrderDetailTemplate::new(page, nav, state.api().base_url()).into_response())
        }
        ReceivedOutcome::Unchanged => Ok(Redirect::to(&detail_path(&order_id)).into_response()),
        ReceivedOutcome::Rejected(outcome) => {
            reply(&session, outcome, &detail_path(&order_id)).await
        }
    }
}
