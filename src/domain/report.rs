//! Store-independent report shapes returned by every query adapter.

use std::fmt;

use serde::Serialize;

use super::month::Month;

/// A single measured value in a report row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Measure {
    Followers(u64),
    Rating(f64),
    Sales(i64),
    Month(Month),
    Zone(String),
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Followers(n) => write!(f, "{n} followers"),
            Self::Rating(r) => write!(f, "{r:.1}"),
            Self::Sales(amount) => write!(f, "${amount}"),
            Self::Month(m) => write!(f, "{m}"),
            Self::Zone(z) => f.write_str(z),
        }
    }
}

/// `{entity_name, metric, secondary_metric?}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub entity_name: String,
    pub metric: Measure,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_metric: Option<Measure>,
}

impl ReportRow {
    pub fn new(entity_name: impl Into<String>, metric: Measure) -> Self {
        Self {
            entity_name: entity_name.into(),
            metric,
            secondary_metric: None,
        }
    }

    #[must_use]
    pub fn with_secondary(mut self, secondary: Measure) -> Self {
        self.secondary_metric = Some(secondary);
        self
    }
}

/// A titled, ordered set of rows. An empty row set is a valid answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub title: String,
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn new(title: impl Into<String>, rows: Vec<ReportRow>) -> Self {
        Self {
            title: title.into(),
            rows,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Entity names in row order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.entity_name.as_str())
    }
}

/// A named lookup that matched nothing.
///
/// This is an ordinary query outcome, never a failure: it is carried inside
/// `Ok(QueryOutcome::NotFound(..))`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "lookup", content = "name", rename_all = "snake_case")]
pub enum QueryNotFound {
    #[error("no city named '{0}'")]
    City(String),
    #[error("no zone named '{0}'")]
    Zone(String),
    #[error("no category named '{0}'")]
    Category(String),
    #[error("no sales recorded for restaurant '{0}'")]
    Restaurant(String),
    #[error("'{0}' is not a month (use a Spanish or English name, or 1-12)")]
    Month(String),
}

/// What a query adapter hands back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum QueryOutcome {
    Found(Report),
    NotFound(QueryNotFound),
}

impl QueryOutcome {
    #[must_use]
    pub fn report(&self) -> Option<&Report> {
        match self {
            Self::Found(report) => Some(report),
            Self::NotFound(_) => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<Report> for QueryOutcome {
    fn from(report: Report) -> Self {
        Self::Found(report)
    }
}

impl From<QueryNotFound> for QueryOutcome {
    fn from(missing: QueryNotFound) -> Self {
        Self::NotFound(missing)
    }
}
