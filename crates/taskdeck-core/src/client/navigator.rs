//! Where the user is, and how to send them back to sign-in.

use std::fmt;

/// A place in the application the user can be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Landing,
    Login,
    Register,
    ForgotPassword,
    ResetPassword,
    Dashboard,
    Tasks,
    PriorityMatrix,
    Categories,
    Tags,
    Analytics,
    Account,
}

impl Surface {
    /// Public surfaces are reachable without a session. Redirecting to login
    /// from one of them would loop.
    pub fn is_public(self) -> bool {
        matches!(
            self,
            Surface::Landing
                | Surface::Login
                | Surface::Register
                | Surface::ForgotPassword
                | Surface::ResetPassword
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Surface::Landing => "landing",
            Surface::Login => "login",
            Surface::Register => "register",
            Surface::ForgotPassword => "forgot-password",
            Surface::ResetPassword => "reset-password",
            Surface::Dashboard => "dashboard",
            Surface::Tasks => "tasks",
            Surface::PriorityMatrix => "priority-matrix",
            Surface::Categories => "categories",
            Surface::Tags => "tags",
            Surface::Analytics => "analytics",
            Surface::Account => "account",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Session-invalidation hook.
///
/// Implementations must be cheap and non-blocking: they run on the task that
/// settled the renewal.
pub trait Navigator: Send + Sync {
    /// The surface currently in front of the user.
    fn current_surface(&self) -> Surface;

    /// Sends the user to the login surface and forgets the dead session.
    fn redirect_to_login(&self);
}

/// Navigator for headless use: always on the dashboard, redirect is a no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessNavigator;

impl Navigator for HeadlessNavigator {
    fn current_surface(&self) -> Surface {
        Surface::Dashboard
    }

    fn redirect_to_login(&self) {
        tracing::debug!("session invalidated (headless, no redirect target)");
    }
}

/// Fires the invalidation side effect unless the user is already on a public
/// surface. Returns whether a redirect was issued.
pub fn invalidate_session(navigator: &dyn Navigator) -> bool {
    let surface = navigator.current_surface();
    if surface.is_public() {
        tracing::debug!(%surface, "session invalidated on public surface, not redirecting");
        return false;
    }
    tracing::info!(%surface, "session invalidated, redirecting to login");
    navigator.redirect_to_login();
    true
}
