//! Category command handlers.

use anyhow::{Context, Result};
use taskdeck_types::category::is_hex_color;
use taskdeck_types::{CategoryCreate, CategoryUpdate};

use crate::cli::output;
use crate::cli::session::Session;

pub(super) fn check_color(color: Option<&str>) -> Result<()> {
    match color {
        Some(color) if !is_hex_color(color) => {
            anyhow::bail!("Invalid color '{color}': expected #RRGGBB")
        }
        _ => Ok(()),
    }
}

pub async fn list(session: &Session) -> Result<()> {
    session.require_signed_in()?;
    let categories = session
        .client
        .categories()
        .list()
        .await
        .context("list categories")?;
    if categories.is_empty() {
        println!("No categories found.");
    } else {
        println!("{}", output::categories_table(&categories));
    }
    Ok(())
}

pub async fn create(session: &Session, category: CategoryCreate) -> Result<()> {
    check_color(category.color.as_deref())?;
    session.require_signed_in()?;
    let created = session
        .client
        .categories()
        .create(&category)
        .await
        .context("create category")?;
    println!("Created category {}: {}", created.id, created.name);
    Ok(())
}

pub async fn update(session: &Session, id: i64, update: CategoryUpdate) -> Result<()> {
    check_color(update.color.as_deref())?;
    session.require_signed_in()?;
    let updated = session
        .client
        .categories()
        .update(id, &update)
        .await
        .with_context(|| format!("update category {id}"))?;
    println!("Updated category {}: {}", updated.id, updated.name);
    Ok(())
}

pub async fn delete(session: &Session, id: i64) -> Result<()> {
    session.require_signed_in()?;
    session
        .client
        .categories()
        .delete(id)
        .await
        .with_context(|| format!("delete category {id}"))?;
    println!("Deleted category {id}.");
    Ok(())
}
