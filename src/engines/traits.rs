// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::page::DetectedEndpoint;
use crate::domain::models::record::RawRecord;

/// 引擎错误类型
///
/// 抓取策略的硬失败，原样返回给调用方用于重试判断
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 非成功的HTTP状态码
    #[error("HTTP status {status}")]
    Http { status: u16 },
    /// 浏览器导航失败
    #[error("Navigation failed: {0}")]
    Navigation(String),
    /// 浏览器启动或通信失败
    #[error("Browser error: {0}")]
    Browser(String),
    /// 超时
    #[error("Timeout after {0:?}")]
    Timeout(Duration),
    /// 非法URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// 响应解码失败
    #[error("Decode error: {0}")]
    Decode(String),
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl EngineError {
    /// 判断错误是否可重试
    ///
    /// # 返回值
    ///
    /// 超时、连接错误、5xx/429 以及导航超时返回true
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::RequestFailed(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            EngineError::Http { status } => *status >= 500 || *status == 429,
            EngineError::Navigation(msg) => msg.to_lowercase().contains("timeout"),
            EngineError::Timeout(_) => true,
            _ => false,
        }
    }
}

/// 单次采集的执行上下文
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// 来源名称，写入每条记录
    pub source: String,
}

impl ExecutionContext {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// 抓取选项
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// 调用方给出的总超时
    pub timeout: Duration,
    /// 是否执行正文抽取
    pub use_readability: bool,
    /// 已探测到的接口，API策略可直接回放
    pub detected_endpoints: Option<Vec<DetectedEndpoint>>,
}

impl FetchOptions {
    pub fn new(timeout: Duration, use_readability: bool) -> Self {
        Self {
            timeout,
            use_readability,
            detected_endpoints: None,
        }
    }

    pub fn with_endpoints(mut self, endpoints: Vec<DetectedEndpoint>) -> Self {
        self.detected_endpoints = Some(endpoints);
        self
    }
}

/// 抓取策略特质
///
/// 由 `StrategyFactory` 按抓取方式创建，采集管线只依赖此接口
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    /// 抓取并返回原始记录
    ///
    /// # 参数
    ///
    /// * `url` - 目标URL
    /// * `ctx` - 执行上下文
    /// * `options` - 抓取选项
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<RawRecord>)` - 记录列表，可以为空
    /// * `Err(EngineError)` - 导航、超时或HTTP失败
    async fn fetch(
        &self,
        url: &str,
        ctx: &ExecutionContext,
        options: &FetchOptions,
    ) -> Result<Vec<RawRecord>, EngineError>;

    /// 策略名称
    fn name(&self) -> &'static str;
}

/// 接口探测特质
///
/// 探测失败返回空列表，不向上传播错误
#[async_trait]
pub trait EndpointProbe: Send + Sync {
    /// 观察页面加载过程中的JSON接口调用
    async fn detect(&self, url: &str, timeout: Duration) -> Vec<DetectedEndpoint>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(EngineError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(EngineError::Http { status: 503 }.is_retryable());
        assert!(EngineError::Http { status: 429 }.is_retryable());
        assert!(EngineError::Navigation("Request Timeout".into()).is_retryable());
    }

    #[test]
    fn test_non_retryable_errors() {
        assert!(!EngineError::Http { status: 404 }.is_retryable());
        assert!(!EngineError::InvalidUrl("ftp://x".into()).is_retryable());
        assert!(!EngineError::Navigation("net::ERR_NAME_NOT_RESOLVED".into()).is_retryable());
        assert!(!EngineError::Decode("bad json".into()).is_retryable());
    }
}
