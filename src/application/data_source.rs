// Source trait for fetching points from the data endpoint
use crate::domain::telemetry::{DataPoint, TimeFilter};
use crate::domain::timestamp::TimestampError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("data endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error(transparent)]
    Timestamp(#[from] TimestampError),
    #[error("window starts at {start} after it ends at {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch all points of metric `(id, name)` matching `filter`, in the
    /// order the endpoint returns them.
    async fn fetch(&self, id: &str, name: &str, filter: TimeFilter) -> Result<Vec<DataPoint>, FetchError>;
}
