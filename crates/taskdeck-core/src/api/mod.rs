//! Resource clients for the taskdeck REST service.
//!
//! Thin passthroughs over the [`Dispatcher`]: each call builds one
//! [`ApiRequest`] and decodes the answer. Session renewal is handled below
//! this layer.

mod analytics;
mod auth;
mod categories;
mod tags;
mod tasks;
mod views;

use std::sync::Arc;

use serde::de::DeserializeOwned;

pub use analytics::{AnalyticsApi, AnalyticsReport, TrendsQuery};
pub use auth::AuthApi;
pub use categories::CategoriesApi;
pub use tags::TagsApi;
pub use tasks::TasksApi;
pub use views::ViewsApi;

use crate::client::{
    ApiRequest, ClientConfig, ClientResult, Dispatcher, HttpTransport, Navigator,
    RefreshCoordinator, Transport,
};
use crate::session::SessionJar;

/// Entry point for talking to the service.
pub struct ApiClient<T = HttpTransport> {
    dispatcher: Dispatcher<T>,
}

impl<T> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl ApiClient<HttpTransport> {
    /// Builds the HTTP stack: one cookie jar, one transport, one renewal
    /// coordinator shared by every request made through this client.
    ///
    /// # Errors
    /// Returns a transport error if the base URL is invalid or the HTTP
    /// client cannot be built.
    pub fn connect(
        config: &ClientConfig,
        jar: Arc<SessionJar>,
        navigator: Arc<dyn Navigator>,
    ) -> ClientResult<Self> {
        let transport = HttpTransport::new(&config.transport_config(), jar)?;
        let coordinator =
            RefreshCoordinator::new(navigator).with_timeout(config.refresh_timeout);
        tracing::debug!(base_url = %transport.base_url(), "api client ready");
        Ok(Self::new(Dispatcher::new(
            Arc::new(transport),
            Arc::new(coordinator),
        )))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(dispatcher: Dispatcher<T>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    pub fn auth(&self) -> AuthApi<'_, T> {
        AuthApi::new(self)
    }

    pub fn tasks(&self) -> TasksApi<'_, T> {
        TasksApi::new(self)
    }

    pub fn views(&self) -> ViewsApi<'_, T> {
        ViewsApi::new(self)
    }

    pub fn categories(&self) -> CategoriesApi<'_, T> {
        CategoriesApi::new(self)
    }

    pub fn tags(&self) -> TagsApi<'_, T> {
        TagsApi::new(self)
    }

    pub fn analytics(&self) -> AnalyticsApi<'_, T> {
        AnalyticsApi::new(self)
    }

    /// Dispatches `request` and decodes the JSON body.
    pub(crate) async fn fetch<R: DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<R> {
        self.dispatcher.dispatch(request).await?.json()
    }

    /// Dispatches `request`, discarding the body (204 endpoints).
    pub(crate) async fn execute(&self, request: ApiRequest) -> ClientResult<()> {
        self.dispatcher.dispatch(request).await.map(|_| ())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-process fake of the service, for resource client tests.

    use std::sync::Mutex;

    use reqwest::StatusCode;
    use serde_json::Value;

    use super::*;
    use crate::client::{ApiResponse, ClientError, HeadlessNavigator};

    /// Answers every request with a canned response and records it.
    pub struct Recorder {
        pub response: Mutex<ClientResult<ApiResponse>>,
        pub requests: Mutex<Vec<ApiRequest>>,
    }

    impl Recorder {
        pub fn last(&self) -> ApiRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl Transport for Recorder {
        async fn send(&self, request: &ApiRequest) -> ClientResult<ApiResponse> {
            self.requests.lock().unwrap().push(request.clone());
            self.response.lock().unwrap().clone()
        }
    }

    pub fn client_returning(status: u16, body: &Value) -> (ApiClient<Recorder>, Arc<Recorder>) {
        let response = if (200..300).contains(&status) {
            Ok(ApiResponse::new(
                StatusCode::from_u16(status).unwrap(),
                serde_json::to_vec(body).unwrap(),
            ))
        } else {
            Err(ClientError::http_status(status, &body.to_string()))
        };
        let recorder = Arc::new(Recorder {
            response: Mutex::new(response),
            requests: Mutex::new(Vec::new()),
        });
        let coordinator = Arc::new(RefreshCoordinator::new(Arc::new(HeadlessNavigator)));
        let client = ApiClient::new(Dispatcher::new(Arc::clone(&recorder), coordinator));
        (client, recorder)
    }
}
