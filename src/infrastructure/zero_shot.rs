// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::settings::ClassificationSettings;
use crate::domain::models::content::SemanticType;
use crate::domain::models::page::PageRole;
use crate::engines::traits::EngineError;

/// 发送给分类服务的候选类别
pub const CATEGORIES: [&str; 3] = ["notice", "recruit", "event"];

/// 采纳分类结果的最低分数
pub const MIN_CONFIDENT_SCORE: f64 = 0.5;

/// 分类结果
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ZeroShotLabel {
    pub label: String,
    #[serde(default)]
    pub score: f64,
}

impl ZeroShotLabel {
    /// 分数足够高时映射为详情页角色
    pub fn confident_role(&self) -> Option<PageRole> {
        if self.score < MIN_CONFIDENT_SCORE {
            return None;
        }
        let semantic = match self.label.trim().to_lowercase().as_str() {
            "notice" => SemanticType::Notice,
            "recruit" => SemanticType::Recruit,
            "event" => SemanticType::Event,
            _ => return None,
        };
        Some(PageRole::for_semantic(semantic, false))
    }
}

/// 零样本分类能力
///
/// 可选依赖，失败返回 `None`，不影响页面采集
#[async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    async fn classify(&self, text: &str, categories: &[&str]) -> Option<ZeroShotLabel>;
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
    categories: &'a [&'a str],
}

/// 基于HTTP的分类服务客户端，`POST {base_url}/classify`
pub struct HttpZeroShotClassifier {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpZeroShotClassifier {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, EngineError> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// 配置了服务地址时创建客户端
    ///
    /// # 返回值
    ///
    /// 未配置地址时为 `Ok(None)`，客户端构建失败时返回错误
    pub fn from_settings(settings: &ClassificationSettings) -> Result<Option<Self>, EngineError> {
        settings
            .zero_shot_url
            .as_ref()
            .map(|url| Self::new(url.clone(), Duration::from_millis(settings.zero_shot_timeout_ms)))
            .transpose()
    }

    async fn call(&self, text: &str, categories: &[&str]) -> Result<ZeroShotLabel, reqwest::Error> {
        self.client
            .post(format!("{}/classify", self.base_url))
            .timeout(self.timeout)
            .json(&ClassifyRequest { text, categories })
            .send()
            .await?
            .error_for_status()?
            .json::<ZeroShotLabel>()
            .await
    }
}

#[async_trait]
impl ZeroShotClassifier for HttpZeroShotClassifier {
    async fn classify(&self, text: &str, categories: &[&str]) -> Option<ZeroShotLabel> {
        match self.call(text, categories).await {
            Ok(label) if !label.label.trim().is_empty() => Some(label),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Zero-shot classification failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_confident_role_mapping() {
        let label = |l: &str, score: f64| ZeroShotLabel {
            label: l.to_string(),
            score,
        };
        assert_eq!(label("recruit", 0.9).confident_role(), Some(PageRole::DetailRecruit));
        assert_eq!(label("Notice", 0.5).confident_role(), Some(PageRole::DetailNotice));
        assert_eq!(label("event", 0.49).confident_role(), None);
        assert_eq!(label("weather", 0.99).confident_role(), None);
    }

    #[tokio::test]
    async fn test_http_classifier() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/classify"))
            .and(body_partial_json(serde_json::json!({
                "categories": ["notice", "recruit", "event"]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "label": "event", "score": 0.8 })),
            )
            .mount(&server)
            .await;

        let classifier =
            HttpZeroShotClassifier::new(server.uri(), Duration::from_secs(5)).unwrap();
        let label = classifier.classify("행사 안내", &CATEGORIES).await.unwrap();
        assert_eq!(label.confident_role(), Some(PageRole::DetailEvent));
    }

    #[tokio::test]
    async fn test_http_classifier_fails_open() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let classifier =
            HttpZeroShotClassifier::new(server.uri(), Duration::from_secs(5)).unwrap();
        assert!(classifier.classify("text", &CATEGORIES).await.is_none());
    }

    #[test]
    fn test_disabled_without_url() {
        let classifier =
            HttpZeroShotClassifier::from_settings(&ClassificationSettings::default()).unwrap();
        assert!(classifier.is_none());
    }

    #[test]
    fn test_enabled_with_url() {
        let settings = ClassificationSettings {
            zero_shot_url: Some("http://localhost:9000/".to_string()),
            ..ClassificationSettings::default()
        };
        let classifier = HttpZeroShotClassifier::from_settings(&settings).unwrap().unwrap();
        assert_eq!(classifier.base_url, "http://localhost:9000");
    }
}
