// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pagescout::domain::models::page::PageRole;
use pagescout::domain::models::page_config::{PageConfig, StrategyOverride};
use pagescout::domain::models::strategy::{Fetcher, ParserKind};
use pagescout::infrastructure::zero_shot::{ZeroShotClassifier, ZeroShotLabel};
use wiremock::MockServer;

use super::helpers::{mount_page, test_collector};

struct CountingClassifier {
    label: &'static str,
    score: f64,
    calls: AtomicUsize,
}

impl CountingClassifier {
    fn new(label: &'static str, score: f64) -> Arc<Self> {
        Arc::new(Self {
            label,
            score,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ZeroShotClassifier for CountingClassifier {
    async fn classify(&self, _text: &str, _categories: &[&str]) -> Option<ZeroShotLabel> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Some(ZeroShotLabel {
            label: self.label.to_string(),
            score: self.score,
        })
    }
}

fn plain_page() -> String {
    "<html><head><title>Welcome</title></head><body><div>Applications for the spring term are open.</div></body></html>"
        .to_string()
}

#[tokio::test]
async fn test_confident_label_refines_static_page() {
    let server = MockServer::start().await;
    mount_page(&server, "/welcome", plain_page()).await;

    let classifier = CountingClassifier::new("recruit", 0.9);
    let collector = test_collector().with_classifier(classifier.clone());
    let understanding = collector
        .understand(&format!("{}/welcome", server.uri()), None)
        .await;

    assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
    assert_eq!(understanding.profile.page_role, PageRole::DetailRecruit);
    assert_eq!(understanding.strategy.parser, ParserKind::Detail);
    assert!(understanding.strategy.use_readability);
}

#[tokio::test]
async fn test_low_score_keeps_heuristic_role() {
    let server = MockServer::start().await;
    mount_page(&server, "/welcome", plain_page()).await;

    let classifier = CountingClassifier::new("event", 0.2);
    let understanding = test_collector()
        .with_classifier(classifier.clone())
        .understand(&format!("{}/welcome", server.uri()), None)
        .await;

    assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
    assert_eq!(understanding.profile.page_role, PageRole::StaticPage);
}

#[tokio::test]
async fn test_override_skips_classification() {
    let server = MockServer::start().await;
    mount_page(&server, "/welcome", plain_page()).await;

    let classifier = CountingClassifier::new("recruit", 0.9);
    let config = PageConfig::for_source("welcome").with_override(StrategyOverride {
        fetcher: Some(Fetcher::Static),
        ..StrategyOverride::default()
    });
    let understanding = test_collector()
        .with_classifier(classifier.clone())
        .understand(&format!("{}/welcome", server.uri()), Some(&config))
        .await;

    assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    assert_eq!(understanding.profile.page_role, PageRole::StaticPage);
    assert_eq!(understanding.strategy.parser, ParserKind::Detail);
}
