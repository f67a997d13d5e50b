// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::domain::models::page::DetectedEndpoint;
use crate::domain::models::record::{RawRecord, RecordContent};
use crate::engines::traits::{
    EndpointProbe, EngineError, ExecutionContext, FetchOptions, FetchStrategy,
};
use crate::utils::date_utils::to_iso8601_or_now;
use crate::utils::timeouts::Deadline;

const API_ITEM_TITLE: &str = "API Item";
const DEFAULT_ACCEPT: &str = "application/json";

/// 接口回放抓取策略
///
/// 直接调用已探测到的JSON接口；没有提供接口时先运行探测器。
/// 探测与各接口调用共享一个截止时间，每次调用只拿到剩余时间；
/// 截止后不再发起新调用。单个接口失败只记录警告，继续处理其余接口。
pub struct ApiStrategy {
    client: reqwest::Client,
    probe: Arc<dyn EndpointProbe>,
    safety_margin: Duration,
}

impl ApiStrategy {
    pub fn new(client: reqwest::Client, probe: Arc<dyn EndpointProbe>, safety_margin: Duration) -> Self {
        Self {
            client,
            probe,
            safety_margin,
        }
    }

    async fn call_endpoint(
        &self,
        endpoint: &DetectedEndpoint,
        timeout: Duration,
    ) -> Result<Value, EngineError> {
        let accept = if endpoint.content_type.trim().is_empty() {
            DEFAULT_ACCEPT
        } else {
            endpoint.content_type.as_str()
        };

        let response = self
            .client
            .get(&endpoint.url)
            .header(ACCEPT, accept)
            .timeout(timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Http {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| EngineError::Decode(e.to_string()))
    }
}

#[async_trait]
impl FetchStrategy for ApiStrategy {
    async fn fetch(
        &self,
        url: &str,
        ctx: &ExecutionContext,
        options: &FetchOptions,
    ) -> Result<Vec<RawRecord>, EngineError> {
        let deadline = Deadline::within(options.timeout, self.safety_margin)?;
        let endpoints = match options.detected_endpoints.as_ref().filter(|e| !e.is_empty()) {
            Some(endpoints) => endpoints.clone(),
            None => self.probe.detect(url, deadline.remaining()).await,
        };
        tracing::info!(
            url,
            source = %ctx.source,
            strategy = self.name(),
            endpoints = endpoints.len(),
            "Fetching endpoints"
        );

        let mut records = Vec::new();
        for (index, endpoint) in endpoints.iter().enumerate() {
            if deadline.is_expired() {
                tracing::warn!(
                    url,
                    skipped = endpoints.len() - index,
                    "Fetch deadline reached, skipping remaining endpoints"
                );
                break;
            }
            match self.call_endpoint(endpoint, deadline.remaining()).await {
                Ok(value) => records.extend(json_to_records(&value, &endpoint.url, &ctx.source)),
                Err(e) => {
                    tracing::warn!(url = %endpoint.url, error = %e, "Failed to fetch endpoint");
                }
            }
        }
        Ok(records)
    }

    fn name(&self) -> &'static str {
        "api"
    }
}

/// 把JSON响应映射为记录：数组按元素，对象视为单条
fn json_to_records(value: &Value, endpoint_url: &str, source: &str) -> Vec<RawRecord> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![value],
        _ => Vec::new(),
    };

    items
        .into_iter()
        .map(|item| RawRecord {
            title: first_string(item, &["title", "name"])
                .unwrap_or_else(|| API_ITEM_TITLE.to_string()),
            url: endpoint_url.to_string(),
            date: to_iso8601_or_now(first_string(item, &["date", "publishedAt"]).as_deref()),
            content: RecordContent::Text(item.to_string()),
            source: source.to_string(),
        })
        .collect()
}

fn first_string(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| item.get(*key))
        .find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::endpoint_detector::NoopEndpointProbe;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn strategy() -> ApiStrategy {
        ApiStrategy::new(
            reqwest::Client::new(),
            Arc::new(NoopEndpointProbe),
            Duration::from_secs(5),
        )
    }

    fn endpoint(url: String) -> DetectedEndpoint {
        DetectedEndpoint {
            url,
            method: "GET".to_string(),
            content_type: "application/json; charset=utf-8".to_string(),
        }
    }

    #[test]
    fn test_json_array_mapping() {
        let value = json!([
            {"title": "첫 공지", "date": "2024-01-15"},
            {"name": "Second", "publishedAt": "2024-02-01T10:00:00Z"},
            {"id": 3}
        ]);
        let records = json_to_records(&value, "https://a.com/api", "src");

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].title, "첫 공지");
        assert!(records[0].date.starts_with("2024-01-15"));
        assert_eq!(records[1].title, "Second");
        assert!(records[1].date.starts_with("2024-02-01T10:00:00"));
        assert_eq!(records[2].title, API_ITEM_TITLE);
        assert!(records.iter().all(|r| r.url == "https://a.com/api" && r.source == "src"));
    }

    #[test]
    fn test_json_object_is_single_record() {
        let records = json_to_records(&json!({"title": "only"}), "u", "s");
        assert_eq!(records.len(), 1);
        assert!(records[0].content.as_text().contains("\"only\""));
        assert!(json_to_records(&json!("scalar"), "u", "s").is_empty());
    }

    #[tokio::test]
    async fn test_fetch_replays_endpoints_and_skips_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/notices"))
            .and(header("accept", "application/json; charset=utf-8"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"title": "공지 1"}, {"title": "공지 2"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let options = FetchOptions::new(Duration::from_secs(5), false).with_endpoints(vec![
            endpoint(format!("{}/api/broken", server.uri())),
            endpoint(format!("{}/api/notices", server.uri())),
        ]);
        let records = strategy()
            .fetch(&server.uri(), &ExecutionContext::new("api-src"), &options)
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].title, "공지 2");
    }

    #[tokio::test]
    async fn test_fetch_without_endpoints_is_empty() {
        let options = FetchOptions::new(Duration::from_secs(5), false);
        let records = strategy()
            .fetch("https://example.com", &ExecutionContext::new("s"), &options)
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_slow_endpoints_share_one_deadline() {
        let server = MockServer::start().await;
        for route in ["/api/first", "/api/second"] {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!([{"title": route}]))
                        .set_delay(Duration::from_millis(1500)),
                )
                .mount(&server)
                .await;
        }

        let budget = Duration::from_secs(2);
        let options = FetchOptions::new(budget, false).with_endpoints(vec![
            endpoint(format!("{}/api/first", server.uri())),
            endpoint(format!("{}/api/second", server.uri())),
        ]);
        let started = std::time::Instant::now();
        let records = strategy()
            .fetch(&server.uri(), &ExecutionContext::new("api-src"), &options)
            .await
            .unwrap();

        assert!(started.elapsed() < budget, "took {:?}", started.elapsed());
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_zero_budget_is_rejected() {
        let options = FetchOptions::new(Duration::ZERO, false);
        let err = strategy()
            .fetch("https://example.com", &ExecutionContext::new("s"), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Other(_)));
    }
}
