// InfluxDB repository implementation
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::telemetry::{DataPoint, TimeFilter};
use crate::infrastructure::config::{prepare_query, InfluxSettings};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct InfluxRepository {
    host: String,
    token: String,
    database: String,
    retention_policy: String,
    measurement: String,
    points_query: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    columns: Vec<String>,
    values: Vec<Vec<serde_json::Value>>,
}

impl InfluxRepository {
    pub fn new(settings: InfluxSettings) -> Self {
        Self {
            host: settings.host.trim_end_matches('/').to_string(),
            token: settings.token,
            database: settings.database,
            retention_policy: settings.retention_policy,
            measurement: settings.measurement,
            points_query: settings.points_query,
            client: reqwest::Client::new(),
        }
    }

    fn build_query_url(&self, query: &str) -> String {
        let encoded_query = urlencoding::encode(query);
        format!(
            "{}/query?db={}&rp={}&q={}",
            self.host, self.database, self.retention_policy, encoded_query
        )
    }

    fn build_points_query(&self, id: &str, name: &str, filter: TimeFilter) -> String {
        let mut bounds = Vec::with_capacity(2);
        if let Some(lower) = filter.lower() {
            bounds.push(format!("time >= '{}'", influx_time(lower)));
        }
        if let Some(upper) = filter.upper() {
            bounds.push(format!("time <= '{}'", influx_time(upper)));
        }

        let mut vars = HashMap::new();
        vars.insert("measurement".to_string(), self.measurement.clone());
        vars.insert("id".to_string(), escape_literal(id));
        vars.insert("name".to_string(), escape_literal(name));
        vars.insert("time".to_string(), bounds.join(" AND "));
        prepare_query(&self.points_query, &vars)
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse> {
        let url = self.build_query_url(query);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB query failed with status {}: {}", status, body);
        }

        let data = response
            .json::<InfluxQLResponse>()
            .await
            .context("Failed to parse InfluxDB response")?;

        // Check for errors in the response
        if let Some(result) = data.results.first() {
            if let Some(error) = &result.error {
                anyhow::bail!("InfluxDB query error: {}", error);
            }
        }

        Ok(data)
    }
}

#[async_trait]
impl TelemetryRepository for InfluxRepository {
    async fn query_points(&self, id: &str, name: &str, filter: TimeFilter) -> Result<Vec<DataPoint>> {
        let query = self.build_points_query(id, name, filter);
        tracing::debug!("Executing points query: {}", query);
        let response = self.execute_query(&query).await?;

        let mut points = Vec::new();
        if let Some(result) = response.results.first() {
            if let Some(series) = &result.series {
                for s in series {
                    let time_idx = s.columns.iter().position(|c| c == "time").unwrap_or(0);
                    let value_idx = s.columns.iter().position(|c| c == "value").unwrap_or(1);

                    for value_row in &s.values {
                        if value_row.len() > time_idx && value_row.len() > value_idx {
                            if let (Some(time_str), Some(value)) = (
                                value_row[time_idx].as_str(),
                                value_row[value_idx].as_f64(),
                            ) {
                                if let Ok(time) = DateTime::parse_from_rfc3339(time_str) {
                                    points.push(DataPoint::new(time.with_timezone(&Utc), value));
                                }
                            }
                        }
                    }
                }
            }
        }

        tracing::debug!("Found {} points for {}/{}", points.len(), id, name);
        Ok(points)
    }
}

fn influx_time(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Escape a value for use inside a single-quoted InfluxQL string
fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
