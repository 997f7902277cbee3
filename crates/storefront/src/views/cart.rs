//! Cart and checkout screen.
//!
//! Quantity inputs are drafts until committed. A commit clamps the draft to a
//! quantity of at least one and sends it to the API; only the item the API
//! echoes back changes in the store. Totals are always derived from items.

use madstore_core::{Bill, CartItemId, OrderId, PaymentMethod, QuantityDrafts, QuantityStep};
use serde::Deserialize;
use tracing::instrument;

use super::{Outcome, ViewScope, failure_message};
use crate::api::{ApiClient, ApiError, CheckoutRequest};
use crate::store::{Store, StoreAction, StorePersistence};

pub const EMPTY_CART: &str = "Your cart is empty.";
pub const MISSING_ADDRESS: &str = "Please fill buyer name and full delivery address.";
pub const MISSING_CHECKOUT_URL: &str = "Stripe checkout URL not returned by the backend.";

/// The cart screen's model. The cart itself is read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartPage {
    pub drafts: QuantityDrafts,
    pub bill: Bill,
}

/// Build the cart screen from the store's cart.
#[must_use]
pub fn page<P: StorePersistence>(store: &Store<P>) -> CartPage {
    let cart = &store.state().cart;
    CartPage {
        drafts: QuantityDrafts::seed(cart),
        bill: cart.bill(),
    }
}

/// Commit a typed quantity.
#[instrument(skip(api, store, scope))]
pub async fn commit_quantity<P: StorePersistence>(
    api: &ApiClient,
    store: &mut Store<P>,
    scope: &ViewScope,
    item_id: CartItemId,
    draft: &str,
) -> Outcome {
    update_quantity(api, store, scope, item_id, QuantityDrafts::commit(draft)).await
}

/// Apply a stepper press to the current draft. A step below one is ignored.
#[instrument(skip(api, store, scope))]
pub async fn step_quantity<P: StorePersistence>(
    api: &ApiClient,
    store: &mut Store<P>,
    scope: &ViewScope,
    item_id: CartItemId,
    draft: &str,
    step: QuantityStep,
) -> Outcome {
    match QuantityDrafts::step(draft, step) {
        Some(next) => update_quantity(api, store, scope, item_id, next).await,
        None => Outcome::Done,
    }
}

async fn update_quantity<P: StorePersistence>(
    api: &ApiClient,
    store: &mut Store<P>,
    scope: &ViewScope,
    item_id: CartItemId,
    quantity: u32,
) -> Outcome {
    match scope.run(api.update_quantity(item_id, quantity)).await {
        Ok(Some(updated)) => {
            store.dispatch(StoreAction::CartItemQuantitySet {
                item_id: updated.id,
                quantity: updated.quantity,
            });
            Outcome::Done
        }
        Ok(None) | Err(ApiError::Cancelled) => Outcome::Done,
        Err(e) => Outcome::failed(&e, "Failed to update cart"),
    }
}

/// Delete an item, then drop it locally.
#[instrument(skip(api, store, scope))]
pub async fn remove_item<P: StorePersistence>(
    api: &ApiClient,
    store: &mut Store<P>,
    scope: &ViewScope,
    item_id: CartItemId,
) -> Outcome {
    match scope.run(api.delete_cart_item(item_id)).await {
        Ok(()) => {
            store.dispatch(StoreAction::CartItemRemoved(item_id));
            Outcome::Done
        }
        Err(ApiError::Cancelled) => Outcome::Done,
        Err(e) => Outcome::failed(&e, "Failed to remove item"),
    }
}

/// Buyer details from the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuyerForm {
    pub buyer_name: String,
    pub phone: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub payment_method: PaymentMethod,
}

impl BuyerForm {
    /// Check that name and the required address fields are filled in.
    ///
    /// # Errors
    ///
    /// Returns [`MISSING_ADDRESS`] when any of them is empty.
    pub fn validate(&self) -> Result<(), &'static str> {
        let required = [
            &self.buyer_name,
            &self.address_line,
            &self.city,
            &self.country,
        ];
        if required.iter().any(|field| field.is_empty()) {
            return Err(MISSING_ADDRESS);
        }
        Ok(())
    }

    /// Label of the submit button for the chosen payment method.
    #[must_use]
    pub const fn submit_label(&self) -> &'static str {
        match self.payment_method {
            PaymentMethod::Cod => "Place COD Order",
            PaymentMethod::Card => "Continue to Card Payment",
        }
    }

    fn into_request<P: StorePersistence>(self, store: &Store<P>) -> CheckoutRequest {
        let state = store.state();
        CheckoutRequest {
            cart_code: state.cart_code.clone(),
            email: state.request_email().to_string(),
            buyer_name: self.buyer_name,
            phone: self.phone,
            address_line: self.address_line,
            city: self.city,
            state: self.state,
            postal_code: self.postal_code,
            country: self.country,
            payment_method: self.payment_method,
        }
    }
}

/// What became of a checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// A cash-on-delivery order was placed and the cart emptied.
    Placed { order_id: OrderId, notice: String },
    /// Card payment continues on the provider's hosted page.
    PaymentRedirect(String),
    /// Nothing was placed; the form stays as typed.
    Rejected(String),
    /// No order came back, or the view went away first.
    Pending,
}

/// Notice shown after a cash-on-delivery order.
#[must_use]
pub fn placed_notice(order_id: &OrderId) -> String {
    format!("Order placed. Order ID: {order_id}")
}

/// Place a cash-on-delivery order or start a card checkout.
#[instrument(skip(api, store, scope, form), fields(payment_method = %form.payment_method))]
pub async fn checkout<P: StorePersistence>(
    api: &ApiClient,
    store: &mut Store<P>,
    scope: &ViewScope,
    form: BuyerForm,
) -> CheckoutOutcome {
    if store.state().cart.is_empty() {
        return CheckoutOutcome::Rejected(EMPTY_CART.to_string());
    }
    if let Err(message) = form.validate() {
        return CheckoutOutcome::Rejected(message.to_string());
    }

    let request = form.into_request(store);
    match request.payment_method {
        PaymentMethod::Card => match scope.run(api.start_checkout(&request)).await {
            Ok(Some(url)) => CheckoutOutcome::PaymentRedirect(url),
            Ok(None) => CheckoutOutcome::Rejected(MISSING_CHECKOUT_URL.to_string()),
            Err(ApiError::Cancelled) => CheckoutOutcome::Pending,
            Err(e) => CheckoutOutcome::Rejected(failure_message(&e, "Failed to place order")),
        },
        PaymentMethod::Cod => match scope.run(api.place_order(&request)).await {
            Ok(response) => match response.order {
                Some(order) => {
                    if let Some(warning) = &response.mail_warning {
                        tracing::warn!(order_id = %order.order_id, warning, "Order confirmation mail not sent");
                    }
                    store.dispatch(StoreAction::CartEmptied);
                    CheckoutOutcome::Placed {
                        notice: placed_notice(&order.order_id),
                        order_id: order.order_id,
                    }
                }
                None => CheckoutOutcome::Pending,
            },
            Err(ApiError::Cancelled) => CheckoutOutcome::Pending,
            Err(e) => CheckoutOutcome::Rejected(failure_message(&e, "Failed to place order")),
        },
    }
}
