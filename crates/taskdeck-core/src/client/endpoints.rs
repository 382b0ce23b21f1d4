//! Auth-surface endpoint classification.
//!
//! Requests to these paths never trigger session renewal: a 401 from the
//! login or refresh endpoint means "wrong credentials" or "no session", not
//! "stale access token".

/// Path of the session renewal endpoint.
pub const REFRESH_PATH: &str = "/auth/refresh";
pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const FORGOT_PASSWORD_PATH: &str = "/auth/forgot-password";
pub const RESET_PASSWORD_PATH: &str = "/auth/reset-password";

/// An endpoint that issues or renews credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEndpoint {
    Login,
    Register,
    Refresh,
    Logout,
    ForgotPassword,
    ResetPassword,
}

impl AuthEndpoint {
    pub fn path(self) -> &'static str {
        match self {
            AuthEndpoint::Login => LOGIN_PATH,
            AuthEndpoint::Register => REGISTER_PATH,
            AuthEndpoint::Refresh => REFRESH_PATH,
            AuthEndpoint::Logout => LOGOUT_PATH,
            AuthEndpoint::ForgotPassword => FORGOT_PASSWORD_PATH,
            AuthEndpoint::ResetPassword => RESET_PASSWORD_PATH,
        }
    }

    /// Classifies a request path. Query strings and trailing slashes are
    /// ignored; a leading slash is optional.
    pub fn classify(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_end_matches('/');
        let path = path.strip_prefix('/').unwrap_or(path);
        let endpoint = match path.to_ascii_lowercase().as_str() {
            "auth/login" => AuthEndpoint::Login,
            "auth/register" => AuthEndpoint::Register,
            "auth/refresh" => AuthEndpoint::Refresh,
            "auth/logout" => AuthEndpoint::Logout,
            "auth/forgot-password" => AuthEndpoint::ForgotPassword,
            "auth/reset-password" => AuthEndpoint::ResetPassword,
            _ => return None,
        };
        Some(endpoint)
    }

    pub fn is_excluded(path: &str) -> bool {
        Self::classify(path).is_some()
    }
}
