//! Account command handlers.

use anyhow::{Context, Result};
use taskdeck_types::{Credentials, Registration};

use crate::cli::output;
use crate::cli::session::Session;

pub async fn login(session: &Session, email: String, password: String) -> Result<()> {
    let response = session
        .client
        .auth()
        .login(&Credentials { email, password })
        .await
        .context("sign in")?;
    println!("Signed in as {}", response.user.email);
    Ok(())
}

pub async fn register(session: &Session, registration: Registration) -> Result<()> {
    let response = session
        .client
        .auth()
        .register(&registration)
        .await
        .context("register")?;
    println!(
        "Registered and signed in as {} ({})",
        response.user.email,
        response.user.username.as_deref().unwrap_or("-")
    );
    Ok(())
}

/// Signs out on the server when possible; the local session is dropped
/// either way.
pub async fn logout(session: &Session) -> Result<()> {
    if session.jar.has_session()
        && let Err(e) = session.client.auth().logout().await
    {
        tracing::warn!("Server-side logout failed: {e}");
    }
    session.jar.clear().context("clear session")?;
    println!("Signed out.");
    Ok(())
}

pub async fn whoami(session: &Session) -> Result<()> {
    session.require_signed_in()?;
    let user = session.client.auth().me().await.context("fetch account")?;
    let rows = [
        ("ID", user.id.to_string()),
        ("Email", user.email),
        ("Username", user.username.unwrap_or_else(|| "-".to_string())),
        ("Name", user.full_name.unwrap_or_else(|| "-".to_string())),
        ("Active", user.is_active.to_string()),
        (
            "Member since",
            user.created_at
                .map_or_else(|| "-".to_string(), output::format_date),
        ),
    ];
    println!("{}", output::details_table(&rows));
    Ok(())
}

pub async fn forgot_password(session: &Session, email: &str) -> Result<()> {
    let response = session
        .client
        .auth()
        .forgot_password(email)
        .await
        .context("request password reset")?;
    println!("{}", response.message);
    Ok(())
}

pub async fn reset_password(session: &Session, token: &str, new_password: &str) -> Result<()> {
    let response = session
        .client
        .auth()
        .reset_password(token, new_password)
        .await
        .context("reset password")?;
    println!("{}", response.message);
    Ok(())
}
