//! Tag command handlers.

use anyhow::{Context, Result};
use taskdeck_types::{TagCreate, TagUpdate};

use super::categories::check_color;
use crate::cli::output;
use crate::cli::session::Session;

pub async fn list(session: &Session) -> Result<()> {
    session.require_signed_in()?;
    let tags = session.client.tags().list().await.context("list tags")?;
    if tags.is_empty() {
        println!("No tags found.");
    } else {
        println!("{}", output::tags_table(&tags));
    }
    Ok(())
}

pub async fn create(session: &Session, tag: TagCreate) -> Result<()> {
    check_color(tag.color.as_deref())?;
    session.require_signed_in()?;
    let created = session
        .client
        .tags()
        .create(&tag)
        .await
        .context("create tag")?;
    println!("Created tag {}: {}", created.id, created.name);
    Ok(())
}

pub async fn update(session: &Session, id: i64, update: TagUpdate) -> Result<()> {
    check_color(update.color.as_deref())?;
    session.require_signed_in()?;
    let updated = session
        .client
        .tags()
        .update(id, &update)
        .await
        .with_context(|| format!("update tag {id}"))?;
    println!("Updated tag {}: {}", updated.id, updated.name);
    Ok(())
}

pub async fn delete(session: &Session, id: i64) -> Result<()> {
    session.require_signed_in()?;
    session
        .client
        .tags()
        .delete(id)
        .await
        .with_context(|| format!("delete tag {id}"))?;
    println!("Deleted tag {id}.");
    Ok(())
}
