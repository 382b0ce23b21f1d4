//! Per-invocation client wiring.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use taskdeck_core::api::ApiClient;
use taskdeck_core::client::{Navigator, SESSION_EXPIRED_MESSAGE, Surface};
use taskdeck_core::config::{self, paths};
use taskdeck_core::session::SessionJar;

/// Navigator for a single CLI command.
///
/// "Redirecting to login" means forgetting the stored cookies and telling
/// the user to sign in again, once per process.
pub struct CliNavigator {
    surface: Surface,
    jar: Arc<SessionJar>,
    notified: AtomicBool,
}

impl CliNavigator {
    pub fn new(surface: Surface, jar: Arc<SessionJar>) -> Self {
        Self {
            surface,
            jar,
            notified: AtomicBool::new(false),
        }
    }
}

impl Navigator for CliNavigator {
    fn current_surface(&self) -> Surface {
        self.surface
    }

    fn redirect_to_login(&self) {
        if self.notified.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = self.jar.clear() {
            tracing::warn!("Failed to clear session: {e:#}");
        }
        eprintln!("{SESSION_EXPIRED_MESSAGE} Run `taskdeck login` to continue.");
    }
}

/// The API client plus the jar it stores cookies in.
pub struct Session {
    pub client: ApiClient,
    pub jar: Arc<SessionJar>,
}

impl Session {
    pub fn open(config: &config::Config, surface: Surface) -> Result<Self> {
        let session_path = paths::session_path();
        let jar = Arc::new(
            SessionJar::load(&session_path)
                .with_context(|| format!("load session from {}", session_path.display()))?,
        );
        let navigator = Arc::new(CliNavigator::new(surface, Arc::clone(&jar)));
        let client_config = config.client_config().context("resolve client config")?;
        let client = ApiClient::connect(&client_config, Arc::clone(&jar), navigator)
            .context("create API client")?;
        Ok(Self { client, jar })
    }

    /// Fails fast when no session cookies are stored.
    pub fn require_signed_in(&self) -> Result<()> {
        if self.jar.has_session() {
            Ok(())
        } else {
            anyhow::bail!("Not signed in. Run `taskdeck login` first.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_notifies_once() {
        let jar = Arc::new(SessionJar::in_memory());
        let navigator = CliNavigator::new(Surface::Tasks, jar);

        navigator.redirect_to_login();
        navigator.redirect_to_login();
        assert!(navigator.notified.load(Ordering::SeqCst));
    }

    #[test]
    fn test_surface_reported() {
        let navigator = CliNavigator::new(Surface::Login, Arc::new(SessionJar::in_memory()));
        assert!(navigator.current_surface().is_public());
    }
}
