// Telemetry data domain models
use super::timestamp::to_compact;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl DataPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Time bounds of a `/data` query. Bounds are inclusive on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFilter {
    Between {
        after: DateTime<Utc>,
        before: DateTime<Utc>,
    },
    Before(DateTime<Utc>),
    After(DateTime<Utc>),
}

impl TimeFilter {
    pub fn mode(&self) -> &'static str {
        match self {
            TimeFilter::Between { .. } => "between",
            TimeFilter::Before(_) => "before",
            TimeFilter::After(_) => "after",
        }
    }

    pub fn lower(&self) -> Option<DateTime<Utc>> {
        match *self {
            TimeFilter::Between { after, .. } | TimeFilter::After(after) => Some(after),
            TimeFilter::Before(_) => None,
        }
    }

    pub fn upper(&self) -> Option<DateTime<Utc>> {
        match *self {
            TimeFilter::Between { before, .. } | TimeFilter::Before(before) => Some(before),
            TimeFilter::After(_) => None,
        }
    }

    /// Render as a query string, e.g. `?filter=between&after=...&before=...`
    pub fn to_query(&self) -> String {
        let mut query = format!("?filter={}", self.mode());
        if let Some(after) = self.lower() {
            query.push_str("&after=");
            query.push_str(&to_compact(after));
        }
        if let Some(before) = self.upper() {
            query.push_str("&before=");
            query.push_str(&to_compact(before));
        }
        query
    }
}
