//! Derived task views: the Eisenhower priority matrix and timelines.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Eisenhower quadrant keys as the service names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuadrantKind {
    /// Urgent and important
    DoFirst,
    /// Important, not urgent
    Schedule,
    /// Urgent, not important
    Delegate,
    /// Neither
    Eliminate,
}

impl QuadrantKind {
    pub fn all() -> &'static [QuadrantKind] {
        &[
            QuadrantKind::DoFirst,
            QuadrantKind::Schedule,
            QuadrantKind::Delegate,
            QuadrantKind::Eliminate,
        ]
    }

    pub fn display_name(self) -> &'static str {
        match self {
            QuadrantKind::DoFirst => "Do First",
            QuadrantKind::Schedule => "Schedule",
            QuadrantKind::Delegate => "Delegate",
            QuadrantKind::Eliminate => "Eliminate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Quadrant {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MatrixSummary {
    #[serde(default)]
    pub total_active: u64,
    #[serde(default)]
    pub needs_immediate_attention: u64,
}

/// Response of `GET /tasks/views/priority-matrix`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriorityMatrix {
    pub quadrants: BTreeMap<QuadrantKind, Quadrant>,
    #[serde(default)]
    pub summary: MatrixSummary,
}

impl PriorityMatrix {
    pub fn quadrant(&self, kind: QuadrantKind) -> Option<&Quadrant> {
        self.quadrants.get(&kind)
    }
}

/// Window for the timeline view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimelinePeriod {
    Today,
    #[default]
    Week,
    Month,
}

impl TimelinePeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            TimelinePeriod::Today => "today",
            TimelinePeriod::Week => "week",
            TimelinePeriod::Month => "month",
        }
    }
}

impl fmt::Display for TimelinePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimelinePeriod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(format!("Unknown timeline period: {other}")),
        }
    }
}
