// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::settings::BrowserSettings;
use crate::domain::models::page::DetectedEndpoint;
use crate::engines::browser::{navigation_window, BrowserLauncher, ChromiumLauncher};
use crate::engines::traits::{EndpointProbe, EngineError};
use crate::utils::timeouts::Deadline;

/// 基于无头浏览器的JSON接口探测器
///
/// 导航期间观察 XHR/fetch 响应，只保留JSON类型。
/// 任何失败都降级为空列表，会话在所有路径上关闭。
pub struct BrowserEndpointDetector {
    launcher: Arc<dyn BrowserLauncher>,
    settings: BrowserSettings,
}

impl BrowserEndpointDetector {
    pub fn new(settings: BrowserSettings) -> Self {
        Self {
            launcher: Arc::new(ChromiumLauncher::new(settings.clone())),
            settings,
        }
    }

    /// 替换浏览器启动器
    pub fn with_launcher(mut self, launcher: Arc<dyn BrowserLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    async fn observe(
        &self,
        url: &str,
        deadline: &Deadline,
    ) -> Result<Vec<DetectedEndpoint>, EngineError> {
        let mut session = deadline.run(self.launcher.launch(deadline.remaining())).await?;
        let (navigation_timeout, settle) =
            navigation_window(deadline.remaining(), self.settings.settle_delay());
        let captured = deadline
            .run(session.capture_endpoints(url, navigation_timeout, settle))
            .await;
        session.close().await;
        captured.map(dedupe_endpoints)
    }
}

#[async_trait]
impl EndpointProbe for BrowserEndpointDetector {
    async fn detect(&self, url: &str, timeout: Duration) -> Vec<DetectedEndpoint> {
        let result = match Deadline::within(timeout, self.settings.safety_margin()) {
            Ok(deadline) => self.observe(url, &deadline).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(endpoints) => {
                tracing::info!(url, count = endpoints.len(), "Endpoint detection finished");
                endpoints
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "Endpoint detection failed, continuing without endpoints");
                Vec::new()
            }
        }
    }
}

/// 不执行任何探测的实现，用于关闭浏览器探测的场景
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEndpointProbe;

#[async_trait]
impl EndpointProbe for NoopEndpointProbe {
    async fn detect(&self, _url: &str, _timeout: Duration) -> Vec<DetectedEndpoint> {
        Vec::new()
    }
}

/// 按 (method, url) 去重，保持首次出现的顺序
fn dedupe_endpoints(endpoints: Vec<DetectedEndpoint>) -> Vec<DetectedEndpoint> {
    let mut seen = HashSet::new();
    endpoints
        .into_iter()
        .filter(|ep| seen.insert((ep.method.clone(), ep.url.clone())))
        .collect()
}
