//! Analytics command handler.

use anyhow::{Context, Result};
use taskdeck_core::api::{AnalyticsReport, TrendsQuery};

use crate::cli::session::Session;

pub async fn show(session: &Session, report: AnalyticsReport, trends: &TrendsQuery) -> Result<()> {
    session.require_signed_in()?;
    let value = session
        .client
        .analytics()
        .report(report, trends)
        .await
        .with_context(|| format!("fetch {report} report"))?;
    let pretty = serde_json::to_string_pretty(&value).context("format report")?;
    println!("{pretty}");
    Ok(())
}
