//! Login, registration, Google sign-in, account and logout.

use madstore_core::{CartCode, User};
use serde::Deserialize;
use tracing::instrument;

use super::{Outcome, ViewScope, failure_message};
use crate::api::{ApiClient, ApiError, AuthResponse, LoginRequest, RegisterRequest};
use crate::config::{GoogleConfig, trim_origin};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::store::{Store, StoreAction, StorePersistence};

pub const MISSING_CREDENTIALS: &str = "Please enter your email and password.";
pub const PASSWORD_MISMATCH: &str = "Passwords do not match.";
pub const MISSING_GOOGLE_TOKEN: &str = "Google login did not return a token.";

pub const GOOGLE_ORIGIN_NOT_ALLOWED: &str = "Google sign-in is disabled for this app origin.";
pub const GOOGLE_NOT_CONFIGURED: &str = "Google sign-in is not configured for this origin.";
pub const GOOGLE_UNAVAILABLE: &str = "Google sign-in is not available right now.";
pub const GOOGLE_DEFAULT_HINT: &str = "Google sign-in is not configured for this environment.";

/// Where the browser goes after signing in or out.
pub const HOME_PATH: &str = "/";

/// Which tab of the login screen is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    #[must_use]
    pub const fn is_register(self) -> bool {
        matches!(self, Self::Register)
    }

    /// Label of the submit button.
    #[must_use]
    pub const fn submit_label(self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::Register => "Create account",
        }
    }
}

/// The login and register form.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl std::fmt::Debug for CredentialsForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsForm")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl CredentialsForm {
    /// Check the form before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns the notice to show when the form is incomplete.
    pub fn validate(&self, mode: AuthMode) -> Result<(), &'static str> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(MISSING_CREDENTIALS);
        }
        if mode.is_register() && self.password != self.confirm_password {
            return Err(PASSWORD_MISMATCH);
        }
        Ok(())
    }

    /// The form as redisplayed after a failure: passwords are never echoed.
    #[must_use]
    pub fn without_passwords(&self) -> Self {
        Self {
            password: String::new(),
            confirm_password: String::new(),
            ..self.clone()
        }
    }
}

/// Make a freshly signed-in user the store's user.
fn adopt<P: StorePersistence>(store: &mut Store<P>, user: User) {
    let id = user
        .id
        .map_or_else(|| user.email.lookup_key(), |id| id.to_string());
    set_sentry_user(&id, Some(user.email.as_str()));
    tracing::info!(email = %user.email, "Signed in");
    store.dispatch(StoreAction::SignedIn(user));
}

fn signed_in<P: StorePersistence>(
    store: &mut Store<P>,
    result: Result<AuthResponse, ApiError>,
    fallback: &str,
) -> Outcome {
    match result {
        Ok(AuthResponse {
            user: Some(user), ..
        }) => {
            adopt(store, user);
            Outcome::Redirect(HOME_PATH.to_string())
        }
        Ok(_) | Err(ApiError::Cancelled) => Outcome::Done,
        Err(e) => Outcome::failed(&e, fallback),
    }
}

/// Password sign-in or registration.
#[instrument(skip(api, store, scope, form))]
pub async fn submit<P: StorePersistence>(
    api: &ApiClient,
    store: &mut Store<P>,
    scope: &ViewScope,
    mode: AuthMode,
    form: &CredentialsForm,
) -> Outcome {
    if let Err(message) = form.validate(mode) {
        return Outcome::Notice(message.to_string());
    }

    let result = match mode {
        AuthMode::Login => {
            let request = LoginRequest {
                email: form.email.trim(),
                password: &form.password,
            };
            scope.run(api.login(&request)).await
        }
        AuthMode::Register => {
            let request = RegisterRequest {
                first_name: form.first_name.trim(),
                last_name: form.last_name.trim(),
                email: form.email.trim(),
                password: &form.password,
            };
            scope.run(api.register(&request)).await
        }
    };
    signed_in(store, result, "Unable to sign in.")
}

/// Sign in with the ID token the Google SDK posted back.
#[instrument(skip(api, store, scope, credential))]
pub async fn google_sign_in<P: StorePersistence>(
    api: &ApiClient,
    store: &mut Store<P>,
    scope: &ViewScope,
    credential: Option<&str>,
) -> Outcome {
    let Some(id_token) = credential.map(str::trim).filter(|t| !t.is_empty()) else {
        return Outcome::Notice(MISSING_GOOGLE_TOKEN.to_string());
    };
    let result = scope.run(api.google_login(id_token)).await;
    signed_in(store, result, "Google sign-in failed.")
}

/// Whether the Google button can be shown, and why not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoogleSignIn {
    pub client_id: Option<String>,
    pub hint: Option<String>,
}

impl GoogleSignIn {
    fn hidden(hint: &str) -> Self {
        Self {
            client_id: None,
            hint: Some(hint.to_string()),
        }
    }

    /// Text shown in place of the button.
    #[must_use]
    pub fn hint_text(&self) -> &str {
        self.hint.as_deref().unwrap_or(GOOGLE_DEFAULT_HINT)
    }
}

/// Work out whether Google sign-in is available for `origin`.
///
/// A non-empty allow-list must contain the origin. The configured client ID
/// wins; otherwise the API's published one is used.
#[instrument(skip(api, scope, config))]
pub async fn google_sign_in_availability(
    api: &ApiClient,
    scope: &ViewScope,
    config: &GoogleConfig,
    origin: &str,
) -> GoogleSignIn {
    let origin = trim_origin(origin);
    if !config.allowed_origins.is_empty() && !config.allowed_origins.contains(&origin) {
        return GoogleSignIn::hidden(GOOGLE_ORIGIN_NOT_ALLOWED);
    }
    if let Some(client_id) = &config.client_id {
        return GoogleSignIn {
            client_id: Some(client_id.clone()),
            hint: None,
        };
    }

    match scope.run(api.google_config()).await {
        Ok(response) => match response.client_id.filter(|id| !id.is_empty()) {
            Some(client_id) => GoogleSignIn {
                client_id: Some(client_id),
                hint: None,
            },
            None => GoogleSignIn::hidden(GOOGLE_NOT_CONFIGURED),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Google sign-in config unavailable");
            GoogleSignIn::hidden(GOOGLE_UNAVAILABLE)
        }
    }
}

/// Sign out: new cart code, no user, guest email, empty wishlist and cart.
pub fn sign_out<P: StorePersistence>(store: &mut Store<P>) -> CartCode {
    let next_code = CartCode::generate();
    store.dispatch(StoreAction::SignedOut {
        next_code: next_code.clone(),
    });
    clear_sentry_user();
    next_code
}

/// The signed-in user, or where to send a guest instead.
///
/// # Errors
///
/// Returns a login redirect for guests.
pub fn account<P: StorePersistence>(store: &Store<P>) -> Result<&User, Outcome> {
    store.state().user.as_ref().ok_or_else(Outcome::login)
}
