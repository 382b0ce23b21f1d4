//! Task command handlers.

use anyhow::{Context, Result};
use taskdeck_types::{TaskCreate, TaskQuery, TaskUpdate};

use crate::cli::output;
use crate::cli::session::Session;

pub async fn list(session: &Session, query: &TaskQuery) -> Result<()> {
    session.require_signed_in()?;
    let list = session.client.tasks().list(query).await.context("list tasks")?;
    if list.tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }
    println!("{}", output::tasks_table(&list.tasks));
    println!("Showing {} of {} task(s).", list.tasks.len(), list.total);
    Ok(())
}

pub async fn show(session: &Session, id: i64) -> Result<()> {
    session.require_signed_in()?;
    let task = session
        .client
        .tasks()
        .get(id)
        .await
        .with_context(|| format!("fetch task {id}"))?;
    let rows = [
        ("ID", task.id.to_string()),
        ("Title", task.title),
        (
            "Description",
            task.description.unwrap_or_else(|| "-".to_string()),
        ),
        ("Status", task.status.to_string()),
        ("Priority", task.priority.to_string()),
        ("Urgent", task.is_urgent.to_string()),
        ("Important", task.is_important.to_string()),
        (
            "Category",
            task.category_id
                .map_or_else(|| "-".to_string(), |id| id.to_string()),
        ),
        (
            "Due",
            task.due_date
                .map_or_else(|| "-".to_string(), output::format_date),
        ),
        ("Created", output::format_date(task.created_at)),
        ("Updated", output::format_date(task.updated_at)),
    ];
    println!("{}", output::details_table(&rows));
    Ok(())
}

pub async fn create(session: &Session, task: &TaskCreate) -> Result<()> {
    session.require_signed_in()?;
    let created = session
        .client
        .tasks()
        .create(task)
        .await
        .context("create task")?;
    println!("Created task {}: {}", created.id, created.title);
    Ok(())
}

pub async fn update(session: &Session, id: i64, update: &TaskUpdate) -> Result<()> {
    if update.is_empty() {
        anyhow::bail!("Nothing to update. Pass at least one of --title, --description, --priority, --status.");
    }
    session.require_signed_in()?;
    let updated = session
        .client
        .tasks()
        .update(id, update)
        .await
        .with_context(|| format!("update task {id}"))?;
    println!(
        "Updated task {}: {} [{}, {}]",
        updated.id, updated.title, updated.status, updated.priority
    );
    Ok(())
}

pub async fn delete(session: &Session, id: i64) -> Result<()> {
    session.require_signed_in()?;
    session
        .client
        .tasks()
        .delete(id)
        .await
        .with_context(|| format!("delete task {id}"))?;
    println!("Deleted task {id}.");
    Ok(())
}

pub async fn stats(session: &Session) -> Result<()> {
    session.require_signed_in()?;
    let stats = session
        .client
        .tasks()
        .stats()
        .await
        .context("fetch task stats")?;
    let mut rows = vec![("Total", stats.total.to_string())];
    rows.extend(stats.by_status.iter().map(|(k, v)| (k.as_str(), v.to_string())));
    rows.extend(stats.by_priority.iter().map(|(k, v)| (k.as_str(), v.to_string())));
    println!("{}", output::details_table(&rows));
    Ok(())
}
