//! Authentication endpoints.

use tracing::instrument;

use super::types::{
    AuthResponse, GoogleConfigResponse, GoogleLoginRequest, LoginRequest, RegisterRequest,
};
use super::{ApiClient, ApiError, decode};

impl ApiClient {
    /// Password sign-in.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest<'_>) -> Result<AuthResponse, ApiError> {
        let payload = self.post_json("auth/login/", request).await?;
        decode("auth/login/", payload)
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest<'_>) -> Result<AuthResponse, ApiError> {
        let payload = self.post_json("auth/register/", request).await?;
        decode("auth/register/", payload)
    }

    /// Exchange a Google ID token for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self, id_token))]
    pub async fn google_login(&self, id_token: &str) -> Result<AuthResponse, ApiError> {
        let payload = self
            .post_json("auth/google/", &GoogleLoginRequest { id_token })
            .await?;
        decode("auth/google/", payload)
    }

    /// Google client ID published by the API (empty when not configured).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn google_config(&self) -> Result<GoogleConfigResponse, ApiError> {
        let payload = self.get("auth/google/config/").await?;
        decode("auth/google/config/", payload)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    #[tokio::test]
    async fn test_login_returns_user() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth/login/")
                    .json_body(json!({"email": "jane@example.com", "password": "pw"}));
                then.status(200).json_body(json!({
                    "user": {"id": 1, "email": "jane@example.com", "first_name": "Jane",
                             "last_name": "Doe", "profile_picture_url": null},
                    "message": "Login successful."
                }));
            })
            .await;

        let api = ApiClient::new(server.url("/"));
        let response = api
            .login(&LoginRequest {
                email: "jane@example.com",
                password: "pw",
            })
            .await
            .unwrap();
        assert_eq!(response.user.unwrap().display_name(), "Jane Doe");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_failure_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/login/");
                then.status(401).json_body(json!({"error": "Invalid credentials."}));
            })
            .await;

        let api = ApiClient::new(server.url("/"));
        let err = api
            .login(&LoginRequest {
                email: "jane@example.com",
                password: "bad",
            })
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Invalid credentials.");
    }
}
