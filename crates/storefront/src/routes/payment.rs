//! Card payment result pages, where the hosted checkout sends the buyer back.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::common::NavView;
use crate::error::Result;
use crate::middleware::{ClientStore, take_flash};
use crate::state::AppState;
use crate::views::{self, ViewScope};

/// Payment success page template.
#[derive(Template, WebTemplate)]
#[template(path = "payment/success.html")]
pub struct PaymentSuccessTemplate {
    pub nav: NavView,
}

/// Payment failed page template.
#[derive(Template, WebTemplate)]
#[template(path = "payment/failed.html")]
pub struct PaymentFailedTemplate {
    pub nav: NavView,
}

/// Payment success query parameters.
#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    pub session_id: Option<String>,
}

/// Reset the cart under a new code and finalize the paid order.
#[instrument(skip(state, session, store))]
pub async fn success(
    State(state): State<AppState>,
    session: Session,
    ClientStore(mut store): ClientStore,
    Query(query): Query<SuccessQuery>,
) -> Result<PaymentSuccessTemplate> {
    let scope = ViewScope::new();
    let next_code =
        views::payment::success(state.api(), &mut store, &scope, query.session_id.as_deref())
            .await?;
    tracing::info!(cart_code = %next_code, "Card payment completed, cart restarted");

    Ok(PaymentSuccessTemplate {
        nav: NavView::new(&store, take_flash(&session).await),
    })
}

/// The buyer cancelled or the payment was declined.
#[instrument(skip(session, store))]
pub async fn failed(session: Session, ClientStore(store): ClientStore) -> PaymentFailedTemplate {
    PaymentFailedTemplate {
        nav: NavView::new(&store, take_flash(&session).await),
    }
}
