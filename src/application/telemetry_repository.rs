// Repository trait for telemetry data access
use crate::domain::telemetry::{DataPoint, TimeFilter};
use async_trait::async_trait;

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// Points of metric `(id, name)` within `filter`, bounds inclusive,
    /// oldest first
    async fn query_points(
        &self,
        id: &str,
        name: &str,
        filter: TimeFilter,
    ) -> anyhow::Result<Vec<DataPoint>>;
}
