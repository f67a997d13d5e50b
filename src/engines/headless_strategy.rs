// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::settings::BrowserSettings;
use crate::domain::models::record::RawRecord;
use crate::engines::browser::{navigation_window, BrowserLauncher, ChromiumLauncher};
use crate::engines::page_records::PageRecordBuilder;
use crate::engines::traits::{EngineError, ExecutionContext, FetchOptions, FetchStrategy};
use crate::utils::timeouts::Deadline;

/// 无头浏览器抓取策略
///
/// 启动、导航和正文抽取共享一个截止时间（调用方超时 - 安全余量）；
/// 加载完成后等待一段时间再读取DOM。
/// 会话在成功、失败和超时路径上都会关闭。
pub struct HeadlessStrategy {
    launcher: Arc<dyn BrowserLauncher>,
    settings: BrowserSettings,
    records: PageRecordBuilder,
}

impl HeadlessStrategy {
    pub fn new(settings: BrowserSettings, records: PageRecordBuilder) -> Self {
        Self {
            launcher: Arc::new(ChromiumLauncher::new(settings.clone())),
            settings,
            records,
        }
    }

    /// 替换浏览器启动器
    pub fn with_launcher(mut self, launcher: Arc<dyn BrowserLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    async fn render(&self, url: &str, deadline: &Deadline) -> Result<String, EngineError> {
        let mut session = deadline.run(self.launcher.launch(deadline.remaining())).await?;
        let (navigation_timeout, settle) =
            navigation_window(deadline.remaining(), self.settings.settle_delay());
        let rendered = deadline
            .run(session.render(url, navigation_timeout, settle))
            .await;
        session.close().await;
        rendered
    }
}

#[async_trait]
impl FetchStrategy for HeadlessStrategy {
    async fn fetch(
        &self,
        url: &str,
        ctx: &ExecutionContext,
        options: &FetchOptions,
    ) -> Result<Vec<RawRecord>, EngineError> {
        tracing::info!(url, source = %ctx.source, strategy = self.name(), "Fetching page");

        let deadline = Deadline::within(options.timeout, self.settings.safety_margin())?;
        let markup = self.render(url, &deadline).await?;
        let records = self
            .records
            .build(&markup, url, ctx, options.use_readability, deadline.remaining())
            .await;

        tracing::debug!(url, count = records.len(), "Headless fetch finished");
        Ok(records)
    }

    fn name(&self) -> &'static str {
        "headless"
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::settings::ScoringSettings;
    use crate::domain::services::content_extraction::{HybridContentExtractor, ReadabilityExtractor};
    use crate::engines::browser::fake::{FakeLauncher, Outcome};

    fn strategy(launcher: Arc<FakeLauncher>) -> HeadlessStrategy {
        let hybrid = HybridContentExtractor::new(
            Arc::new(ReadabilityExtractor::default()),
            None,
            ScoringSettings::default(),
            50,
        );
        HeadlessStrategy::new(BrowserSettings::default(), PageRecordBuilder::new(hybrid, 5000))
            .with_launcher(launcher)
    }

    async fn fetch(launcher: &Arc<FakeLauncher>) -> Result<Vec<RawRecord>, EngineError> {
        strategy(launcher.clone())
            .fetch(
                "https://example.com/app",
                &ExecutionContext::new("spa"),
                &FetchOptions::new(Duration::from_secs(30), false),
            )
            .await
    }

    #[tokio::test]
    async fn test_rendered_page_becomes_record_and_session_closes() {
        let launcher = FakeLauncher::new(Outcome::Loaded {
            markup: "<html><head><title>Rendered</title></head><body><div>client side</div></body></html>",
            endpoints: Vec::new(),
        });

        let records = fetch(&launcher).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Rendered");
        assert_eq!(launcher.launches(), 1);
        assert_eq!(launcher.closes(), 1);
    }

    #[tokio::test]
    async fn test_session_closes_after_navigation_error() {
        let launcher = FakeLauncher::new(Outcome::NavigationFailed);

        let err = fetch(&launcher).await.unwrap_err();

        assert!(matches!(err, EngineError::Navigation(_)));
        assert_eq!(launcher.closes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_closes_when_navigation_stalls() {
        let launcher = FakeLauncher::new(Outcome::Stalled);

        let err = fetch(&launcher).await.unwrap_err();

        // 30s 预算减去 5s 余量
        assert!(matches!(err, EngineError::Timeout(limit) if limit == Duration::from_secs(25)));
        assert!(err.is_retryable());
        assert_eq!(launcher.closes(), 1);
    }

    #[tokio::test]
    async fn test_launch_failure_is_reported() {
        let launcher = FakeLauncher::unavailable();

        let err = fetch(&launcher).await.unwrap_err();

        assert!(matches!(err, EngineError::Browser(_)));
        assert_eq!(launcher.launches(), 1);
        assert_eq!(launcher.closes(), 0);
    }
}
