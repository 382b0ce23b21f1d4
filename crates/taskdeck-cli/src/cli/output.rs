//! Table rendering for command output.

use chrono::{DateTime, Local, Utc};
use comfy_table::{ContentArrangement, Table};
use taskdeck_types::{Category, Tag, Task};

fn new_table<const N: usize>(header: [&str; N]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

pub fn format_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

pub fn tasks_table(tasks: &[Task]) -> Table {
    let mut table = new_table(["ID", "Title", "Status", "Priority", "Due"]);
    for task in tasks {
        table.add_row([
            task.id.to_string(),
            task.title.clone(),
            task.status.to_string(),
            task.priority.to_string(),
            task.due_date.map_or_else(|| "-".to_string(), format_date),
        ]);
    }
    table
}

pub fn categories_table(categories: &[Category]) -> Table {
    let mut table = new_table(["ID", "Name", "Color", "Icon"]);
    for category in categories {
        table.add_row([
            category.id.to_string(),
            category.name.clone(),
            or_dash(category.color.as_deref()),
            or_dash(category.icon.as_deref()),
        ]);
    }
    table
}

pub fn tags_table(tags: &[Tag]) -> Table {
    let mut table = new_table(["ID", "Name", "Color"]);
    for tag in tags {
        table.add_row([
            tag.id.to_string(),
            tag.name.clone(),
            or_dash(tag.color.as_deref()),
        ]);
    }
    table
}

/// Key/value listing, e.g. for a single task.
pub fn details_table(rows: &[(&str, String)]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    for (key, value) in rows {
        table.add_row([(*key).to_string(), value.clone()]);
    }
    table
}
