// HTTP request handlers
use crate::domain::telemetry::TimeFilter;
use crate::domain::timestamp::{parse_query_bound, to_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct DataQuery {
    pub filter: Option<String>,
    pub after: Option<String>,
    pub before: Option<String>,
}

impl DataQuery {
    pub fn to_filter(&self, now: DateTime<Utc>) -> Result<TimeFilter, ApiError> {
        let mode = self
            .filter
            .as_deref()
            .ok_or_else(|| ApiError::BadRequest("Missing parameter 'filter'".to_string()))?;

        match mode {
            "between" => {
                let after = bound("after", self.after.as_deref(), mode, now)?;
                let before = bound("before", self.before.as_deref(), mode, now)?;
                if after > before {
                    return Err(ApiError::BadRequest(format!(
                        "after={} is later than before={}",
                        self.after.as_deref().unwrap_or_default(),
                        self.before.as_deref().unwrap_or_default()
                    )));
                }
                Ok(TimeFilter::Between { after, before })
            }
            "before" => Ok(TimeFilter::Before(bound("before", self.before.as_deref(), mode, now)?)),
            "after" => Ok(TimeFilter::After(bound("after", self.after.as_deref(), mode, now)?)),
            other => Err(ApiError::BadRequest(format!("Unknown filter mode '{}'", other))),
        }
    }
}

fn bound(
    param: &str,
    value: Option<&str>,
    mode: &str,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, ApiError> {
    let value = value.filter(|v| !v.is_empty()).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Missing parameter '{}' for filter mode '{}'",
            param, mode
        ))
    })?;
    parse_query_bound(value, now).map_err(|_| {
        ApiError::BadRequest(format!(
            "timestamp {}={} is not in the relative timestamp format -1h5m or compact ISO timestamp",
            param, value
        ))
    })
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Points of one metric as `[[timestamp, value], ...]`, oldest first
pub async fn get_data(
    Path((id, name)): Path<(String, String)>,
    Query(query): Query<DataQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<(String, f64)>>, ApiError> {
    let filter = query.to_filter(Utc::now())?;
    tracing::debug!("Loading {}/{} with filter {:?}", id, name, filter);

    let points = state.repository.query_points(&id, &name, filter).await?;
    Ok(Json(
        points
            .into_iter()
            .map(|p| (to_response(p.timestamp), p.value))
            .collect(),
    ))
}
