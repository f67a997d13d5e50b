// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{
    EventRequestWillBeSent, EventResponseReceived, ResourceType,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::settings::BrowserSettings;
use crate::domain::models::page::DetectedEndpoint;
use crate::engines::traits::EngineError;

/// 浏览器启动器
///
/// 每次调用返回一个新的一次性会话
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// 启动或连接浏览器
    ///
    /// # 参数
    ///
    /// * `request_timeout` - CDP请求超时
    async fn launch(
        &self,
        request_timeout: Duration,
    ) -> Result<Box<dyn BrowserSession>, EngineError>;
}

/// 一次性的浏览器会话
///
/// 调用方必须在所有退出路径上调用 [`BrowserSession::close`]。
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// 导航到 `url`，等待 `settle_delay` 后返回渲染后的HTML
    async fn render(
        &self,
        url: &str,
        navigation_timeout: Duration,
        settle_delay: Duration,
    ) -> Result<String, EngineError>;

    /// 导航到 `url`，返回期间观察到的 XHR/fetch JSON 响应（未去重）
    async fn capture_endpoints(
        &self,
        url: &str,
        navigation_timeout: Duration,
        settle_delay: Duration,
    ) -> Result<Vec<DetectedEndpoint>, EngineError>;

    /// 释放会话，错误只记录不返回
    async fn close(&mut self);
}

/// 把剩余时间拆成导航超时与加载后等待
///
/// 等待时间最多占一半，二者之和不超过 `remaining`
pub fn navigation_window(remaining: Duration, settle_delay: Duration) -> (Duration, Duration) {
    let settle = settle_delay.min(remaining / 2);
    (remaining - settle, settle)
}

/// 基于 chromiumoxide 的启动器
///
/// 设置了 `remote_debugging_url` 时连接已有实例，否则启动本地进程
pub struct ChromiumLauncher {
    settings: BrowserSettings,
}

impl ChromiumLauncher {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(
        &self,
        request_timeout: Duration,
    ) -> Result<Box<dyn BrowserSession>, EngineError> {
        let (browser, mut handler, owned) = match &self.settings.remote_debugging_url {
            Some(url) => {
                tracing::info!(url = %url, "Connecting to remote Chrome instance");
                let (browser, handler) = Browser::connect(url.as_str()).await.map_err(|e| {
                    EngineError::Browser(format!("Failed to connect to remote Chrome: {}", e))
                })?;
                (browser, handler, false)
            }
            None => {
                let config = BrowserConfig::builder()
                    .no_sandbox()
                    .request_timeout(request_timeout)
                    .arg("--disable-gpu")
                    .arg("--disable-dev-shm-usage")
                    .build()
                    .map_err(EngineError::Browser)?;
                let (browser, handler) = Browser::launch(config)
                    .await
                    .map_err(|e| EngineError::Browser(e.to_string()))?;
                (browser, handler, true)
            }
        };

        // 驱动CDP事件循环
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Box::new(ChromiumSession {
            browser,
            handler,
            owned,
        }))
    }
}

/// chromiumoxide 会话
///
/// 本地启动的浏览器在关闭时退出；远程连接只断开
struct ChromiumSession {
    browser: Browser,
    handler: JoinHandle<()>,
    owned: bool,
}

impl ChromiumSession {
    async fn new_page(&self) -> Result<Page, EngineError> {
        self.browser
            .new_page("about:blank")
            .await
            .map_err(|e| EngineError::Browser(e.to_string()))
    }

    async fn observe(
        page: &Page,
        url: &str,
        navigation_timeout: Duration,
        settle_delay: Duration,
    ) -> Result<Vec<DetectedEndpoint>, EngineError> {
        let requests = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(|e| EngineError::Browser(e.to_string()))?;
        let responses = page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(|e| EngineError::Browser(e.to_string()))?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let observer = tokio::spawn(async move {
            let mut requests = std::pin::pin!(requests);
            let mut responses = std::pin::pin!(responses);
            let mut methods: HashMap<String, String> = HashMap::new();
            loop {
                tokio::select! {
                    Some(event) = requests.next() => {
                        methods.insert(event.request_id.inner().clone(), event.request.method.clone());
                    }
                    Some(event) = responses.next() => {
                        let is_script_call = matches!(event.r#type, ResourceType::Xhr | ResourceType::Fetch);
                        if is_script_call && is_json_mime(&event.response.mime_type) {
                            let method = methods
                                .get(event.request_id.inner())
                                .cloned()
                                .unwrap_or_else(|| "GET".to_string());
                            let _ = tx.send(DetectedEndpoint {
                                url: event.response.url.clone(),
                                method,
                                content_type: event.response.mime_type.clone(),
                            });
                        }
                    }
                    else => break,
                }
            }
        });

        let navigation = navigate(page, url, navigation_timeout).await;
        if navigation.is_ok() {
            // 捕获加载完成后仍在进行的异步调用
            tokio::time::sleep(settle_delay).await;
        }
        observer.abort();
        navigation?;

        let mut endpoints = Vec::new();
        while let Ok(endpoint) = rx.try_recv() {
            endpoints.push(endpoint);
        }
        Ok(endpoints)
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn render(
        &self,
        url: &str,
        navigation_timeout: Duration,
        settle_delay: Duration,
    ) -> Result<String, EngineError> {
        let page = self.new_page().await?;
        let result = async {
            navigate(&page, url, navigation_timeout).await?;
            tokio::time::sleep(settle_delay).await;
            page.content()
                .await
                .map_err(|e| EngineError::Browser(e.to_string()))
        }
        .await;
        close_page(page).await;
        result
    }

    async fn capture_endpoints(
        &self,
        url: &str,
        navigation_timeout: Duration,
        settle_delay: Duration,
    ) -> Result<Vec<DetectedEndpoint>, EngineError> {
        let page = self.new_page().await?;
        let result = Self::observe(&page, url, navigation_timeout, settle_delay).await;
        close_page(page).await;
        result
    }

    async fn close(&mut self) {
        if self.owned {
            if let Err(e) = self.browser.close().await {
                tracing::warn!(error = %e, "Failed to close browser");
            }
            if let Err(e) = self.browser.wait().await {
                tracing::warn!(error = %e, "Failed to wait for browser exit");
            }
        }
        self.handler.abort();
        tracing::debug!("Browser session closed");
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// 关闭标签页，错误只记录
async fn close_page(page: Page) {
    if let Err(e) = page.close().await {
        tracing::debug!(error = %e, "Failed to close page");
    }
}

/// 导航并等待加载完成，超时与导航错误区分返回
async fn navigate(page: &Page, url: &str, timeout: Duration) -> Result<(), EngineError> {
    match tokio::time::timeout(timeout, page.goto(url)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(EngineError::Navigation(e.to_string())),
        Err(_) => Err(EngineError::Timeout(timeout)),
    }
}

pub(crate) fn is_json_mime(mime_type: &str) -> bool {
    mime_type.to_ascii_lowercase().contains("json")
}

/// 记录启动与关闭次数的模拟浏览器
#[cfg(test)]
pub(crate) mod fake {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    /// 模拟会话的导航结果
    pub(crate) enum Outcome {
        Loaded {
            markup: &'static str,
            endpoints: Vec<DetectedEndpoint>,
        },
        NavigationFailed,
        Stalled,
    }

    #[derive(Default)]
    struct Counters {
        launches: AtomicUsize,
        closes: AtomicUsize,
    }

    pub(crate) struct FakeLauncher {
        outcome: Arc<Outcome>,
        counters: Arc<Counters>,
        unavailable: bool,
    }

    impl FakeLauncher {
        pub(crate) fn new(outcome: Outcome) -> Arc<Self> {
            Arc::new(Self {
                outcome: Arc::new(outcome),
                counters: Arc::default(),
                unavailable: false,
            })
        }

        /// 启动总是失败
        pub(crate) fn unavailable() -> Arc<Self> {
            Arc::new(Self {
                outcome: Arc::new(Outcome::Stalled),
                counters: Arc::default(),
                unavailable: true,
            })
        }

        pub(crate) fn launches(&self) -> usize {
            self.counters.launches.load(Ordering::SeqCst)
        }

        pub(crate) fn closes(&self) -> usize {
            self.counters.closes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BrowserLauncher for FakeLauncher {
        async fn launch(
            &self,
            _request_timeout: Duration,
        ) -> Result<Box<dyn BrowserSession>, EngineError> {
            self.counters.launches.fetch_add(1, Ordering::SeqCst);
            if self.unavailable {
                return Err(EngineError::Browser("chrome not found".to_string()));
            }
            Ok(Box::new(FakeSession {
                outcome: self.outcome.clone(),
                counters: self.counters.clone(),
            }))
        }
    }

    struct FakeSession {
        outcome: Arc<Outcome>,
        counters: Arc<Counters>,
    }

    impl FakeSession {
        async fn navigate(&self) -> Result<(&'static str, Vec<DetectedEndpoint>), EngineError> {
            match self.outcome.as_ref() {
                Outcome::Loaded { markup, endpoints } => Ok((*markup, endpoints.clone())),
                Outcome::NavigationFailed => Err(EngineError::Navigation(
                    "net::ERR_CONNECTION_REFUSED".to_string(),
                )),
                Outcome::Stalled => std::future::pending().await,
            }
        }
    }

    #[async_trait]
    impl BrowserSession for FakeSession {
        async fn render(
            &self,
            _url: &str,
            _nav: Duration,
            _settle: Duration,
        ) -> Result<String, EngineError> {
            self.navigate().await.map(|(markup, _)| markup.to_string())
        }

        async fn capture_endpoints(
            &self,
            _url: &str,
            _nav: Duration,
            _settle: Duration,
        ) -> Result<Vec<DetectedEndpoint>, EngineError> {
            self.navigate().await.map(|(_, endpoints)| endpoints)
        }

        async fn close(&mut self) {
            self.counters.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}
