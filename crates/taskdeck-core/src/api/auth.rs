use serde_json::json;
use taskdeck_types::{AuthResponse, Credentials, MessageResponse, Registration, User};

use super::ApiClient;
use crate::client::endpoints::{
    FORGOT_PASSWORD_PATH, LOGIN_PATH, LOGOUT_PATH, REGISTER_PATH, RESET_PASSWORD_PATH,
};
use crate::client::{ApiRequest, ClientResult, Transport};

const ME_PATH: &str = "/auth/me";

/// `/auth/*` calls. The server sets and clears the session cookies.
pub struct AuthApi<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> AuthApi<'a, T> {
    pub(super) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    /// Creates an account and signs it in.
    pub async fn register(&self, registration: &Registration) -> ClientResult<AuthResponse> {
        let request = ApiRequest::post(REGISTER_PATH).json(registration)?;
        self.client.fetch(request).await
    }

    pub async fn login(&self, credentials: &Credentials) -> ClientResult<AuthResponse> {
        tracing::debug!(email = %credentials.email, "logging in");
        let request = ApiRequest::post(LOGIN_PATH).json(credentials)?;
        self.client.fetch(request).await
    }

    /// Revokes the refresh token and clears the session cookies.
    pub async fn logout(&self) -> ClientResult<MessageResponse> {
        self.client.fetch(ApiRequest::post(LOGOUT_PATH)).await
    }

    /// The signed-in user. Renews the session transparently if needed.
    pub async fn me(&self) -> ClientResult<User> {
        self.client.fetch(ApiRequest::get(ME_PATH)).await
    }

    pub async fn forgot_password(&self, email: &str) -> ClientResult<MessageResponse> {
        let request = ApiRequest::post(FORGOT_PASSWORD_PATH).json(&json!({ "email": email }))?;
        self.client.fetch(request).await
    }

    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> ClientResult<MessageResponse> {
        let request = ApiRequest::post(RESET_PASSWORD_PATH).json(&json!({
            "token": token,
            "new_password": new_password,
        }))?;
        self.client.fetch(request).await
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;

    use crate::api::testing::client_returning;
    use crate::client::ClientErrorKind;

    use super::*;

    #[tokio::test]
    async fn test_login_posts_credentials() {
        let (client, recorder) = client_returning(
            200,
            &json!({"message": "Login successful.", "user": {"id": 1, "email": "a@b.c"}}),
        );

        let response = client
            .auth()
            .login(&Credentials {
                email: "a@b.c".to_string(),
                password: "hunter22".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.user.email, "a@b.c");
        let request = recorder.last();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, LOGIN_PATH);
        assert_eq!(
            request.body,
            Some(json!({"email": "a@b.c", "password": "hunter22"}))
        );
    }

    #[tokio::test]
    async fn test_bad_credentials_do_not_renew() {
        let (client, recorder) =
            client_returning(401, &json!({"detail": "Incorrect email or password"}));

        let err = client
            .auth()
            .login(&Credentials {
                email: "a@b.c".to_string(),
                password: "nope".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind, ClientErrorKind::Unauthorized);
        assert_eq!(recorder.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reset_password_body() {
        let (client, recorder) = client_returning(200, &json!({"message": "Password reset"}));

        let response = client.auth().reset_password("t0k3n", "new-pass-123").await.unwrap();

        assert_eq!(response.message, "Password reset");
        assert_eq!(
            recorder.last().body,
            Some(json!({"token": "t0k3n", "new_password": "new-pass-123"}))
        );
    }
}
