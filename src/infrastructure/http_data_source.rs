// HTTP client for the /data endpoint
use crate::application::data_source::{DataSource, FetchError};
use crate::domain::telemetry::{DataPoint, TimeFilter};
use crate::domain::timestamp::parse_response;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpDataSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpDataSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn data_url(&self, id: &str, name: &str, filter: TimeFilter) -> String {
        format!(
            "{}/data/{}/{}{}",
            self.base_url,
            id,
            urlencoding::encode(name),
            filter.to_query()
        )
    }
}

/// Decode `[[timestamp, value], ...]`
fn decode_points(body: &[u8]) -> Result<Vec<DataPoint>, FetchError> {
    let rows: Vec<(String, f64)> =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    rows.into_iter()
        .map(|(ts, value)| Ok(DataPoint::new(parse_response(&ts)?, value)))
        .collect()
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch(&self, id: &str, name: &str, filter: TimeFilter) -> Result<Vec<DataPoint>, FetchError> {
        let url = self.data_url(id, name, filter);
        let transport = |source| FetchError::Transport {
            url: url.clone(),
            source,
        };

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        let points = decode_points(&body)?;
        tracing::debug!("Fetched {} points from {}", points.len(), url);
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_data_url_encodes_name() {
        let source = HttpDataSource::new("http://car.local/");
        let after = Utc.with_ymd_and_hms(2011, 6, 1, 8, 0, 0).unwrap();

        assert_eq!(
            source.data_url("0x402", "Bus Voltage/Avg", TimeFilter::After(after)),
            "http://car.local/data/0x402/Bus%20Voltage%2FAvg?filter=after&after=20110601080000"
        );
    }

    #[test]
    fn test_decode_points() {
        let body = br#"[["2011-06-01 08:00:00.500000", 12.5], ["2011-06-01 08:00:01", 13]]"#;
        let points = decode_points(body).unwrap();

        let base = Utc.with_ymd_and_hms(2011, 6, 1, 8, 0, 0).unwrap();
        assert_eq!(points[0], DataPoint::new(base + chrono::Duration::milliseconds(500), 12.5));
        assert_eq!(points[1], DataPoint::new(base + chrono::Duration::seconds(1), 13.0));
    }

    #[test]
    fn test_decode_rejects_bad_payloads() {
        assert!(matches!(decode_points(b"{\"data\": []}"), Err(FetchError::Decode(_))));
        assert!(matches!(
            decode_points(br#"[["noon", 1.0]]"#),
            Err(FetchError::Timestamp(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_between() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/0x402/Bus%20Voltage"))
            .and(query_param("filter", "between"))
            .and(query_param("after", "20110601080000"))
            .and(query_param("before", "20110601090000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                ["2011-06-01 08:15:00.000000", 118.0],
                ["2011-06-01 08:30:00.000000", 117.5]
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let source = HttpDataSource::new(server.uri());
        let after = Utc.with_ymd_and_hms(2011, 6, 1, 8, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2011, 6, 1, 9, 0, 0).unwrap();
        let points = source
            .fetch("0x402", "Bus Voltage", TimeFilter::Between { after, before })
            .await
            .unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[1].value, 117.5);
    }

    #[tokio::test]
    async fn test_fetch_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string("{\"error\": \"bad filter\"}"))
            .mount(&server)
            .await;

        let source = HttpDataSource::new(server.uri());
        let result = source
            .fetch("0x402", "Bus Voltage", TimeFilter::After(Utc::now()))
            .await;

        match result {
            Err(FetchError::Status { status, body }) => {
                assert_eq!(status, 400);
                assert!(body.contains("bad filter"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
