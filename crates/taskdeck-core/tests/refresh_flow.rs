//! End-to-end session renewal against a mock service.
//!
//! The mock authenticates with cookies only: protected routes accept the
//! request when it carries `access_token=fresh`, and `/auth/refresh` issues
//! that cookie when the request carries the refresh token.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::future::join_all;
use serde_json::json;
use taskdeck_core::api::ApiClient;
use taskdeck_core::client::{ClientConfig, ClientErrorKind, Navigator, Surface};
use taskdeck_core::session::SessionJar;
use taskdeck_types::{Credentials, TaskQuery};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

struct CountingNavigator {
    surface: Surface,
    redirects: AtomicUsize,
}

impl CountingNavigator {
    fn on(surface: Surface) -> Arc<Self> {
        Arc::new(Self {
            surface,
            redirects: AtomicUsize::new(0),
        })
    }

    fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for CountingNavigator {
    fn current_surface(&self) -> Surface {
        self.surface
    }

    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

fn cookie_header(req: &Request) -> String {
    req.headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn empty_task_list() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"total": 0, "tasks": []}))
}

fn unauthorized() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({"detail": "Could not validate credentials"}))
}

fn login_ok() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .append_header("set-cookie", "access_token=stale; HttpOnly; Path=/; Max-Age=1800")
        .append_header("set-cookie", "refresh_token=r1; HttpOnly; Path=/; Max-Age=604800")
        .set_body_json(json!({
            "message": "Login successful.",
            "user": {"id": 1, "email": "ada@example.com", "username": "ada"}
        }))
}

/// Protected `/tasks`: accepts only the renewed access token.
async fn mount_tasks(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/tasks"))
        .respond_with(|req: &Request| {
            if cookie_header(req).contains("access_token=fresh") {
                empty_task_list()
            } else {
                unauthorized()
            }
        })
        .mount(server)
        .await;
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(login_ok())
        .mount(server)
        .await;
}

async fn connect(server: &MockServer, navigator: Arc<CountingNavigator>) -> ApiClient {
    let config = ClientConfig::new(format!("{}/api/v1", server.uri()));
    let client =
        ApiClient::connect(&config, Arc::new(SessionJar::in_memory()), navigator).unwrap();
    client
        .auth()
        .login(&Credentials {
            email: "ada@example.com".to_string(),
            password: "correct horse".to_string(),
        })
        .await
        .unwrap();
    client
}

#[tokio::test]
async fn test_expired_access_token_is_renewed_transparently() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_tasks(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(|req: &Request| {
            if cookie_header(req).contains("refresh_token=r1") {
                ResponseTemplate::new(200)
                    .append_header("set-cookie", "access_token=fresh; HttpOnly; Path=/")
                    .set_body_json(json!({"message": "Access token refreshed successfully"}))
            } else {
                unauthorized()
            }
        })
        .expect(1)
        .mount(&server)
        .await;

    let navigator = CountingNavigator::on(Surface::Tasks);
    let client = connect(&server, Arc::clone(&navigator)).await;

    let list = client.tasks().list(&TaskQuery::default()).await.unwrap();
    assert_eq!(list.total, 0);
    assert_eq!(navigator.redirects(), 0);
}

#[tokio::test]
async fn test_concurrent_expiries_share_one_renewal() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_tasks(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("set-cookie", "access_token=fresh; HttpOnly; Path=/")
                .set_body_json(json!({"message": "Access token refreshed successfully"}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let navigator = CountingNavigator::on(Surface::Dashboard);
    let client = connect(&server, Arc::clone(&navigator)).await;

    let tasks = client.tasks();
    let query = TaskQuery::default();
    let results = join_all((0..5).map(|_| tasks.list(&query))).await;

    assert!(results.iter().all(Result::is_ok));
    assert!(!client.dispatcher().coordinator().is_refreshing());
}

#[tokio::test]
async fn test_failed_renewal_expires_session_once() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_tasks(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Invalid or expired refresh token"}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let navigator = CountingNavigator::on(Surface::Tasks);
    let client = connect(&server, Arc::clone(&navigator)).await;

    let tasks = client.tasks();
    let query = TaskQuery::default();
    let results = join_all((0..4).map(|_| tasks.list(&query))).await;

    for result in results {
        let err = result.unwrap_err();
        assert_eq!(err.kind, ClientErrorKind::RefreshFailed);
        assert!(err.is_session_expired());
    }
    assert_eq!(navigator.redirects(), 1);
}

#[tokio::test]
async fn test_wrong_password_never_renews() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Incorrect email or password"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let navigator = CountingNavigator::on(Surface::Login);
    let config = ClientConfig::new(format!("{}/api/v1", server.uri()));
    let nav: Arc<dyn Navigator> = Arc::<CountingNavigator>::clone(&navigator);
    let client = ApiClient::connect(&config, Arc::new(SessionJar::in_memory()), nav).unwrap();

    let err = client
        .auth()
        .login(&Credentials {
            email: "ada@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind, ClientErrorKind::Unauthorized);
    assert_eq!(err.message, "HTTP 401: Incorrect email or password");
    assert_eq!(navigator.redirects(), 0);
}

#[tokio::test]
async fn test_still_unauthorized_after_renewal_stops() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/tasks/stats/summary"))
        .respond_with(unauthorized())
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let navigator = CountingNavigator::on(Surface::Tasks);
    let client = connect(&server, Arc::clone(&navigator)).await;

    let err = client.tasks().stats().await.unwrap_err();
    assert_eq!(err.kind, ClientErrorKind::LoopGuard);
    assert_eq!(navigator.redirects(), 0);
}
