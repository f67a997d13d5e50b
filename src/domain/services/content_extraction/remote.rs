// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

use async_trait::async_trait;
use scraper::Html;
use serde::{Deserialize, Serialize};

use super::ContentExtractor;
use crate::domain::models::extraction::ExtractedContent;
use crate::engines::traits::EngineError;
use crate::utils::html::{element_text, normalize_text};

#[derive(Debug, Serialize)]
struct RemoteRequest<'a> {
    url: &'a str,
    html: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RemoteResponse {
    title: Option<String>,
    content: Option<String>,
    author: Option<String>,
    date_published: Option<String>,
}

/// 远程正文抽取服务客户端
///
/// `POST {endpoint}`，请求体为 `{url, html}`，响应为
/// `{title, content, author, datePublished}`。`content` 可以是HTML，会被转换为纯文本。
/// 任何失败（超时、非2xx、响应格式错误）都记录警告并返回 `None`。
pub struct RemoteExtractionService {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    min_content_length: usize,
}

impl RemoteExtractionService {
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        min_content_length: usize,
    ) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
            min_content_length,
        })
    }

    async fn call(&self, markup: &str, url: &str) -> Result<RemoteResponse, reqwest::Error> {
        self.client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&RemoteRequest { url, html: markup })
            .send()
            .await?
            .error_for_status()?
            .json::<RemoteResponse>()
            .await
    }
}

#[async_trait]
impl ContentExtractor for RemoteExtractionService {
    async fn extract(&self, markup: &str, url: &str) -> Option<ExtractedContent> {
        let response = match self.call(markup, url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url, endpoint = %self.endpoint, error = %e, "Remote extraction failed");
                return None;
            }
        };

        let content = response.content.as_deref().map(html_to_text).unwrap_or_default();
        let result = ExtractedContent {
            title: response.title.map(|t| normalize_text(&t)).unwrap_or_default(),
            content,
            author: response.author.filter(|a| !a.trim().is_empty()),
            published_date: response.date_published.filter(|d| !d.trim().is_empty()),
            confidence: 0.0,
        };

        if result.content_len() < self.min_content_length {
            tracing::debug!(url, length = result.content_len(), "Remote extraction returned too little content");
            return None;
        }
        Some(result)
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

/// 远程服务可能返回HTML片段，统一转为纯文本
fn html_to_text(content: &str) -> String {
    if !content.contains('<') {
        return content.trim().to_string();
    }
    let fragment = Html::parse_fragment(content);
    normalize_text(&element_text(fragment.root_element()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LONG_HTML: &str = "<div><p>This remote service returned an HTML body that is long enough to be accepted.</p></div>";

    #[tokio::test]
    async fn test_remote_extraction_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/extract"))
            .and(body_partial_json(
                serde_json::json!({ "url": "https://example.com/post/1" }),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "title": "Remote Title",
                "content": LONG_HTML,
                "author": "Kim",
                "datePublished": "2024-02-02T00:00:00Z"
            })))
            .mount(&server)
            .await;

        let service = RemoteExtractionService::new(
            format!("{}/extract", server.uri()),
            Duration::from_secs(5),
            50,
        )
        .unwrap();
        let result = service
            .extract("<html></html>", "https://example.com/post/1")
            .await
            .unwrap();

        assert_eq!(result.title, "Remote Title");
        assert!(result.content.starts_with("This remote service"));
        assert!(!result.content.contains('<'));
        assert_eq!(result.author.as_deref(), Some("Kim"));
        assert_eq!(result.published_date.as_deref(), Some("2024-02-02T00:00:00Z"));
    }

    #[tokio::test]
    async fn test_remote_extraction_fails_open_on_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let service =
            RemoteExtractionService::new(server.uri(), Duration::from_secs(5), 50).unwrap();
        assert!(service.extract("<html></html>", "https://example.com").await.is_none());
    }

    #[tokio::test]
    async fn test_remote_extraction_fails_open_on_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "content": LONG_HTML }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let service =
            RemoteExtractionService::new(server.uri(), Duration::from_millis(100), 50).unwrap();
        assert!(service.extract("<html></html>", "https://example.com").await.is_none());
    }

    #[tokio::test]
    async fn test_remote_extraction_rejects_short_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "content": "short" })),
            )
            .mount(&server)
            .await;

        let service =
            RemoteExtractionService::new(server.uri(), Duration::from_secs(5), 50).unwrap();
        assert!(service.extract("<html></html>", "https://example.com").await.is_none());
    }
}
