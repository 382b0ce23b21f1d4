//! Authenticated request layer.
//!
//! Feature code talks to the [`Dispatcher`]; a 401 on a protected endpoint
//! triggers one shared session renewal through the [`RefreshCoordinator`],
//! after which the request is reissued once.

mod dispatcher;
pub mod endpoints;
mod error;
mod navigator;
mod refresh;
mod transport;

use std::time::Duration;

pub use dispatcher::Dispatcher;
pub use endpoints::AuthEndpoint;
pub use error::{ClientError, ClientErrorKind, ClientResult, SESSION_EXPIRED_MESSAGE};
pub use navigator::{HeadlessNavigator, Navigator, Surface, invalidate_session};
pub use refresh::RefreshCoordinator;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport, TransportConfig, USER_AGENT};

/// Settings for building a client stack.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Per-request timeout (None disables)
    pub request_timeout: Option<Duration>,
    /// Upper bound on one renewal call (None disables)
    pub refresh_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: None,
            refresh_timeout: Some(RefreshCoordinator::DEFAULT_TIMEOUT),
        }
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            base_url: self.base_url.clone(),
            request_timeout: self.request_timeout,
        }
    }
}
