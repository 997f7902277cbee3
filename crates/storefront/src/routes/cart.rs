//! Cart and checkout route handlers.
//!
//! Quantity inputs post their draft text; the server commits it. Checkout
//! failures re-render the cart with the buyer form as typed.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use madstore_core::{CartItem, CartItemId, PaymentMethod, QuantityStep, resolve_image_url};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::common::{NavView, reply};
use crate::error::{Result, add_breadcrumb};
use crate::middleware::{ClientStore, set_flash, take_flash};
use crate::models::Flash;
use crate::state::AppState;
use crate::store::{Store, StorePersistence};
use crate::views::cart::{BuyerForm, CartPage, CheckoutOutcome};
use crate::views::{self, ViewScope};

const CART_PATH: &str = "/cart";

/// Cart line display data.
#[derive(Clone)]
pub struct CartItemView {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub image: String,
    pub price: String,
    /// Quantity input contents.
    pub draft: String,
    pub line_total: String,
}

impl CartItemView {
    fn new(item: &CartItem, page: &CartPage, api_base: &str) -> Self {
        Self {
            id: item.id.as_i64(),
            slug: item.product.slug.clone(),
            name: item.product.name.clone(),
            image: resolve_image_url(item.product.card_image(), api_base),
            price: item.product.price_display(),
            draft: page.drafts.get(item.id).to_string(),
            line_total: madstore_core::format_inr(item.line_total()),
        }
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub nav: NavView,
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub delivery: String,
    pub total: String,
    pub form: BuyerForm,
    pub card_selected: bool,
    pub submit_label: &'static str,
    /// Blocking checkout message.
    pub error: Option<String>,
}

impl CartTemplate {
    fn new<P: StorePersistence>(
        store: &Store<P>,
        nav: NavView,
        form: BuyerForm,
        error: Option<String>,
        api_base: &str,
    ) -> Self {
        let page = views::cart::page(store);
        Self {
            nav,
            items: store
                .state()
                .cart
                .cartitems
                .iter()
                .map(|item| CartItemView::new(item, &page, api_base))
                .collect(),
            subtotal: page.bill.subtotal_display(),
            delivery: page.bill.delivery_display(),
            total: page.bill.total_display(),
            card_selected: form.payment_method == PaymentMethod::Card,
            submit_label: form.submit_label(),
            form,
            error,
        }
    }
}

/// Display the cart and the checkout form.
#[instrument(skip(state, session, store))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    ClientStore(mut store): ClientStore,
) -> Result<CartTemplate> {
    let scope = ViewScope::new();
    store.reconcile_cart(state.api(), &scope).await;
    store.save().await?;

    let nav = NavView::new(&store, take_flash(&session).await);
    Ok(CartTemplate::new(
        &store,
        nav,
        BuyerForm::default(),
        None,
        state.api().base_url(),
    ))
}

/// Quantity commit form data.
#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    pub item_id: CartItemId,
    /// Draft text from the quantity input.
    #[serde(default)]
    pub quantity: String,
}

/// Commit a typed quantity (blur or Enter).
#[instrument(skip(state, session, store))]
pub async fn commit_quantity(
    State(state): State<AppState>,
    session: Session,
    ClientStore(mut store): ClientStore,
    Form(form): Form<QuantityForm>,
) -> Result<Response> {
    let scope = ViewScope::new();
    let outcome = views::cart::commit_quantity(
        state.api(),
        &mut store,
        &scope,
        form.item_id,
        &form.quantity,
    )
    .await;
    store.save().await?;
    reply(&session, outcome, CART_PATH).await
}

/// Stepper form data.
#[derive(Debug, Deserialize)]
pub struct StepForm {
    pub item_id: CartItemId,
    #[serde(default)]
    pub quantity: String,
    pub step: QuantityStep,
}

/// Apply a +/- stepper press to the current draft.
#[instrument(skip(state, session, store))]
pub async fn step_quantity(
    State(state): State<AppState>,
    session: Session,
    ClientStore(mut store): ClientStore,
    Form(form): Form<StepForm>,
) -> Result<Response> {
    let scope = ViewScope::new();
    let outcome = views::cart::step_quantity(
        state.api(),
        &mut store,
        &scope,
        form.item_id,
        &form.quantity,
        form.step,
    )
    .await;
    store.save().await?;
    reply(&session, outcome, CART_PATH).await
}

/// Remove item form data.
#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    pub item_id: CartItemId,
}

/// Remove an item from the cart.
#[instrument(skip(state, session, store))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    ClientStore(mut store): ClientStore,
    Form(form): Form<RemoveForm>,
) -> Result<Response> {
    let scope = ViewScope::new();
    let outcome = views::cart::remove_item(state.api(), &mut store, &scope, form.item_id).await;
    store.save().await?;
    reply(&session, outcome, CART_PATH).await
}

/// Place a cash-on-delivery order or go to the card payment page.
#[instrument(skip(state, session, store, form))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    ClientStore(mut store): ClientStore,
    Form(form): Form<BuyerForm>,
) -> Result<Response> {
    add_breadcrumb(
        "checkout",
        "Checkout submitted",
        Some(&[("payment_method", form.payment_method.as_str())]),
    );

    let scope = ViewScope::new();
    let outcome = views::cart::checkout(state.api(), &mut store, &scope, form.clone()).await;
    store.save().await?;

    match outcome {
        CheckoutOutcome::Placed { order_id, notice } => {
            tracing::info!(%order_id, "Order placed");
            set_flash(&session, &Flash::success(notice)).await?;
            Ok(Redirect::to(CART_PATH).into_response())
        }
        CheckoutOutcome::PaymentRedirect(url) => Ok(Redirect::to(&url).into_response()),
        CheckoutOutcome::Rejected(message) => {
            let nav = NavView::new(&store, None);
            Ok(
                CartTemplate::new(&store, nav, form, Some(message), state.api().base_url())
                    .into_response(),
            )
        }
        CheckoutOutcome::Pending => Ok(Redirect::to(CART_PATH).into_response()),
    }
}
