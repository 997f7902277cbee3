//! Authentication and account route handlers.
//!
//! Password sign-in and registration share one screen with two tabs. The
//! Google Identity Services button hands its ID token to a page callback,
//! which posts it same-origin to `/auth/google` as the `credential` field.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::common::{NavView, reply};
use crate::error::Result;
use crate::middleware::{ClientStore, take_flash};
use crate::state::AppState;
use crate::store::{SessionPersistence, Store, StoreError};
use crate::views::auth::{AuthMode, CredentialsForm, GoogleSignIn, HOME_PATH};
use crate::views::{self, LOGIN_PATH, Outcome, ViewScope};

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub nav: NavView,
    pub register: bool,
    pub submit_label: &'static str,
    /// The form as typed, without passwords.
    pub form: CredentialsForm,
    pub error: Option<String>,
    pub google_client_id: Option<String>,
    pub google_hint: String,
}

/// Login page query parameters.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub mode: AuthMode,
}

async fn login_template(
    state: &AppState,
    nav: NavView,
    mode: AuthMode,
    form: CredentialsForm,
    error: Option<String>,
) -> LoginTemplate {
    let config = state.config();
    let scope = ViewScope::new();
    let google: GoogleSignIn = views::auth::google_sign_in_availability(
        state.api(),
        &scope,
        &config.google,
        &config.base_url,
    )
    .await;

    LoginTemplate {
        nav,
        register: mode.is_register(),
        submit_label: mode.submit_label(),
        form: form.without_passwords(),
        error,
        google_hint: google.hint_text().to_string(),
        google_client_id: google.client_id,
    }
}

/// Display the login or register tab.
#[instrument(skip(state, session, store))]
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    ClientStore(store): ClientStore,
    Query(query): Query<LoginQuery>,
) -> LoginTemplate {
    let nav = NavView::new(&store, take_flash(&session).await);
    login_template(&state, nav, query.mode, CredentialsForm::default(), None).await
}

async fn authenticate(
    state: &AppState,
    session: &Session,
    mut store: Store<SessionPersistence>,
    mode: AuthMode,
    form: CredentialsForm,
) -> Result<Response> {
    let scope = ViewScope::new();
    let outcome = views::auth::submit(state.api(), &mut store, &scope, mode, &form).await;
    store.save().await?;

    match outcome {
        Outcome::Notice(message) => {
            let nav = NavView::new(&store, None);
            Ok(login_template(state, nav, mode, form, Some(message))
                .await
                .into_response())
        }
        Outcome::Done => {
            let back = if mode.is_register() {
                "/login?mode=register"
            } else {
                LOGIN_PATH
            };
            reply(session, Outcome::Done, back).await
        }
        outcome @ Outcome::Redirect(_) => {
            session.cycle_id().await.map_err(StoreError::from)?;
            reply(session, outcome, HOME_PATH).await
        }
    }
}

/// Password sign-in.
#[instrument(skip(state, session, store, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ClientStore(store): ClientStore,
    Form(form): Form<CredentialsForm>,
) -> Result<Response> {
    authenticate(&state, &session, store, AuthMode::Login, form).await
}

/// Create an account and sign in.
#[instrument(skip(state, session, store, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    ClientStore(store): ClientStore,
    Form(form): Form<CredentialsForm>,
) -> Result<Response> {
    authenticate(&state, &session, store, AuthMode::Register, form).await
}

/// Google sign-in callback form data.
#[derive(Deserialize)]
pub struct GoogleCallbackForm {
    /// The ID token issued by Google.
    pub credential: Option<String>,
}

/// Sign in with a Google ID token.
#[instrument(skip(state, session, store, form))]
pub async fn google_callback(
    State(state): State<AppState>,
    session: Session,
    ClientStore(mut store): ClientStore,
    Form(form): Form<GoogleCallbackForm>,
) -> Result<Response> {
    let scope = ViewScope::new();
    let outcome = views::auth::google_sign_in(
        state.api(),
        &mut store,
        &scope,
        form.credential.as_deref(),
    )
    .await;
    store.save().await?;
    if matches!(outcome, Outcome::Redirect(_)) {
        session.cycle_id().await.map_err(StoreError::from)?;
    }
    reply(&session, outcome, LOGIN_PATH).await
}

/// Sign out and start over as a guest.
#[instrument(skip(session, store))]
pub async fn logout(session: Session, ClientStore(mut store): ClientStore) -> Result<Redirect> {
    let next_code = views::auth::sign_out(&mut store);
    store.save().await?;
    // New session ID whenever the signed-in user changes
    session.cycle_id().await.map_err(StoreError::from)?;
    tracing::info!(cart_code = %next_code, "Signed out");
    Ok(Redirect::to(HOME_PATH))
}

/// Account page template.
#[derive(Template, WebTemplate)]
#[template(path = "account.html")]
pub struct AccountTemplate {
    pub nav: NavView,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
}

/// Display the signed-in user's profile.
#[instrument(skip(session, store))]
pub async fn account(session: Session, ClientStore(store): ClientStore) -> Result<Response> {
    let (name, email, avatar_url) = match views::auth::account(&store) {
        Ok(user) => (
            user.display_name(),
            user.email.to_string(),
            user.avatar_url().to_string(),
        ),
        Err(outcome) => return reply(&session, outcome, LOGIN_PATH).await,
    };

    Ok(AccountTemplate {
        nav: NavView::new(&store, take_flash(&session).await),
        name,
        email,
        avatar_url,
    }
    .into_response())
}
