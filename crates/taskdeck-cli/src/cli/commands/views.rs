//! Task view command handlers.

use anyhow::{Context, Result};
use taskdeck_types::{QuadrantKind, TaskList, TimelinePeriod};

use crate::cli::output;
use crate::cli::session::Session;

pub async fn matrix(session: &Session) -> Result<()> {
    session.require_signed_in()?;
    let matrix = session
        .client
        .views()
        .priority_matrix()
        .await
        .context("fetch priority matrix")?;

    for &kind in QuadrantKind::all() {
        let Some(quadrant) = matrix.quadrant(kind) else {
            continue;
        };
        let title = if quadrant.label.is_empty() {
            kind.display_name()
        } else {
            quadrant.label.as_str()
        };
        println!("{title} ({})", quadrant.count);
        if !quadrant.description.is_empty() {
            println!("  {}", quadrant.description);
        }
        if !quadrant.tasks.is_empty() {
            println!("{}", output::tasks_table(&quadrant.tasks));
        }
        println!();
    }
    println!(
        "{} active task(s), {} need immediate attention.",
        matrix.summary.total_active, matrix.summary.needs_immediate_attention
    );
    Ok(())
}

pub async fn timeline(session: &Session, period: TimelinePeriod) -> Result<()> {
    session.require_signed_in()?;
    let list = session
        .client
        .views()
        .timeline(period)
        .await
        .with_context(|| format!("fetch {period} timeline"))?;
    print_list(&list, &format!("No tasks due this {period}."));
    Ok(())
}

pub async fn overdue(session: &Session) -> Result<()> {
    session.require_signed_in()?;
    let list = session
        .client
        .views()
        .overdue()
        .await
        .context("fetch overdue tasks")?;
    print_list(&list, "No overdue tasks.");
    Ok(())
}

fn print_list(list: &TaskList, empty_message: &str) {
    if list.tasks.is_empty() {
        println!("{empty_message}");
    } else {
        println!("{}", output::tasks_table(&list.tasks));
    }
}
