//! Request dispatch with transparent session renewal.

use std::sync::Arc;

use super::endpoints::AuthEndpoint;
use super::error::{ClientError, ClientResult};
use super::refresh::RefreshCoordinator;
use super::transport::{ApiRequest, ApiResponse, Transport};

/// The request being dispatched, and whether it has already been reissued
/// after a renewal.
struct RequestContext {
    request: ApiRequest,
    retried: bool,
}

/// Public entry point for feature code.
///
/// Every 401 from a non-auth endpoint goes through the shared
/// [`RefreshCoordinator`]; the original request is reissued at most once.
pub struct Dispatcher<T> {
    transport: Arc<T>,
    coordinator: Arc<RefreshCoordinator>,
}

impl<T> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            coordinator: Arc::clone(&self.coordinator),
        }
    }
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: Arc<T>, coordinator: Arc<RefreshCoordinator>) -> Self {
        Self {
            transport,
            coordinator,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Sends `request`, renewing the session once if it comes back 401.
    ///
    /// # Errors
    /// - any non-401 failure, unchanged;
    /// - a 401 from an auth endpoint, unchanged;
    /// - `RefreshFailed` if the session could not be renewed;
    /// - `LoopGuard` if the reissued request is still unauthorized.
    pub async fn dispatch(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let mut context = RequestContext {
            request,
            retried: false,
        };

        loop {
            let err = match self.transport.send(&context.request).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            if !err.is_unauthorized() {
                return Err(err);
            }

            if let Some(endpoint) = AuthEndpoint::classify(&context.request.path) {
                tracing::debug!(?endpoint, "401 from auth endpoint, not renewing");
                return Err(err);
            }

            if context.retried {
                tracing::warn!(
                    path = %context.request.path,
                    "still unauthorized after session renewal"
                );
                return Err(ClientError::loop_guard(&err));
            }

            context.retried = true;
            self.coordinator
                .ensure_fresh_session(self.transport.as_ref())
                .await?;
            tracing::debug!(path = %context.request.path, "reissuing after session renewal");
        }
    }
}
