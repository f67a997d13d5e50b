// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::models::record::RawRecord;
use crate::engines::page_loader::PageLoader;
use crate::engines::page_records::PageRecordBuilder;
use crate::engines::traits::{EngineError, ExecutionContext, FetchOptions, FetchStrategy};
use crate::utils::timeouts::Deadline;

/// 静态HTML抓取策略
///
/// 一次 HTTP GET，然后执行共用的页面后处理。
/// 请求与正文抽取共享同一个截止时间。
pub struct StaticStrategy {
    loader: Arc<PageLoader>,
    records: PageRecordBuilder,
    safety_margin: Duration,
}

impl StaticStrategy {
    pub fn new(loader: Arc<PageLoader>, records: PageRecordBuilder, safety_margin: Duration) -> Self {
        Self {
            loader,
            records,
            safety_margin,
        }
    }
}

#[async_trait]
impl FetchStrategy for StaticStrategy {
    async fn fetch(
        &self,
        url: &str,
        ctx: &ExecutionContext,
        options: &FetchOptions,
    ) -> Result<Vec<RawRecord>, EngineError> {
        tracing::info!(url, source = %ctx.source, strategy = self.name(), "Fetching page");

        let deadline = Deadline::within(options.timeout, self.safety_margin)?;
        let page = self.loader.fetch(url, deadline.remaining()).await?;
        let records = self
            .records
            .build(&page.raw_markup, url, ctx, options.use_readability, deadline.remaining())
            .await;

        tracing::debug!(url, count = records.len(), "Static fetch finished");
        Ok(records)
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{HttpSettings, ScoringSettings};
    use crate::domain::services::content_extraction::{HybridContentExtractor, ReadabilityExtractor};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn strategy(margin: Duration) -> StaticStrategy {
        let hybrid = HybridContentExtractor::new(
            Arc::new(ReadabilityExtractor::default()),
            None,
            ScoringSettings::default(),
            50,
        );
        StaticStrategy::new(
            Arc::new(PageLoader::new(&HttpSettings::default(), None).unwrap()),
            PageRecordBuilder::new(hybrid, 5000),
            margin,
        )
    }

    #[tokio::test]
    async fn test_fetch_builds_page_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                "<html><head><title>Static page</title></head><body><div>hello</div></body></html>",
                "text/html; charset=utf-8",
            ))
            .mount(&server)
            .await;

        let records = strategy(Duration::from_secs(1))
            .fetch(
                &format!("{}/page", server.uri()),
                &ExecutionContext::new("static-src"),
                &FetchOptions::new(Duration::from_secs(5), false),
            )
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Static page");
        assert_eq!(records[0].source, "static-src");
    }

    #[tokio::test]
    async fn test_fetch_stays_within_budget_when_server_stalls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let budget = Duration::from_secs(2);
        let started = std::time::Instant::now();
        let result = strategy(Duration::from_secs(5))
            .fetch(
                &format!("{}/slow", server.uri()),
                &ExecutionContext::new("s"),
                &FetchOptions::new(budget, false),
            )
            .await;

        assert!(result.is_err());
        assert!(started.elapsed() < budget);
    }
}
