//! `/analytics/*` reports, returned as raw JSON.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use super::ApiClient;
use crate::client::{ApiRequest, ClientResult, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsReport {
    Overview,
    Trends,
    PriorityDistribution,
    Categories,
    Tags,
    TimeAnalysis,
    Dashboard,
}

impl AnalyticsReport {
    pub fn all() -> &'static [AnalyticsReport] {
        &[
            AnalyticsReport::Overview,
            AnalyticsReport::Trends,
            AnalyticsReport::PriorityDistribution,
            AnalyticsReport::Categories,
            AnalyticsReport::Tags,
            AnalyticsReport::TimeAnalysis,
            AnalyticsReport::Dashboard,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            AnalyticsReport::Overview => "overview",
            AnalyticsReport::Trends => "trends",
            AnalyticsReport::PriorityDistribution => "priority-distribution",
            AnalyticsReport::Categories => "categories",
            AnalyticsReport::Tags => "tags",
            AnalyticsReport::TimeAnalysis => "time-analysis",
            AnalyticsReport::Dashboard => "dashboard",
        }
    }

    pub fn path(self) -> String {
        format!("/analytics/{}", self.name())
    }
}

impl fmt::Display for AnalyticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnalyticsReport {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        Self::all()
            .iter()
            .copied()
            .find(|report| report.name() == normalized)
            .ok_or_else(|| format!("Unknown analytics report: {value}"))
    }
}

/// Parameters of the trends report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendsQuery {
    /// Bucket label: day, week, month, or year
    pub period: String,
    pub days: u32,
}

impl TrendsQuery {
    pub const MAX_DAYS: u32 = 365;
}

impl Default for TrendsQuery {
    fn default() -> Self {
        Self {
            period: "month".to_string(),
            days: 30,
        }
    }
}

pub struct AnalyticsApi<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> AnalyticsApi<'a, T> {
    pub(super) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    /// Fetches any report; `trends` only applies to [`AnalyticsReport::Trends`].
    pub async fn report(&self, report: AnalyticsReport, trends: &TrendsQuery) -> ClientResult<Value> {
        let mut request = ApiRequest::get(report.path());
        if report == AnalyticsReport::Trends {
            request = request.query([
                ("period", trends.period.clone()),
                ("days", trends.days.clamp(1, TrendsQuery::MAX_DAYS).to_string()),
            ]);
        }
        self.client.fetch(request).await
    }

    pub async fn overview(&self) -> ClientResult<Value> {
        self.report(AnalyticsReport::Overview, &TrendsQuery::default())
            .await
    }

    pub async fn trends(&self, query: &TrendsQuery) -> ClientResult<Value> {
        self.report(AnalyticsReport::Trends, query).await
    }

    pub async fn dashboard(&self) -> ClientResult<Value> {
        self.report(AnalyticsReport::Dashboard, &TrendsQuery::default())
            .await
    }
}
