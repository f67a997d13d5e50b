// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::utils::retry_policy::{BackoffStrategy, RetryPolicy};

/// 抓取方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Fetcher {
    Static,
    Headless,
}

impl Fetcher {
    /// 该抓取方式的重试策略
    pub fn retry_policy(&self) -> RetryPolicy {
        let (max_retries, backoff_ms) = match self {
            Fetcher::Headless => (2, 2000),
            Fetcher::Static => (3, 1000),
        };
        RetryPolicy {
            max_retries,
            initial_backoff: Duration::from_millis(backoff_ms),
            strategy: BackoffStrategy::Exponential,
            ..RetryPolicy::default()
        }
    }

    /// 该抓取方式的总超时
    pub fn timeout(&self) -> Duration {
        match self {
            Fetcher::Headless => Duration::from_millis(30_000),
            Fetcher::Static => Duration::from_millis(15_000),
        }
    }
}

/// 解析方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParserKind {
    List,
    Detail,
    Api,
    Mixed,
}

/// 执行计划，计算一次后不再修改
#[derive(Debug, Clone)]
pub struct CrawlStrategy {
    pub fetcher: Fetcher,
    pub parser: ParserKind,
    pub retry_policy: RetryPolicy,
    pub timeout: Duration,
    pub use_readability: bool,
}

impl CrawlStrategy {
    /// 按抓取方式派生重试策略与超时
    pub fn new(fetcher: Fetcher, parser: ParserKind, use_readability: bool) -> Self {
        Self {
            fetcher,
            parser,
            retry_policy: fetcher.retry_policy(),
            timeout: fetcher.timeout(),
            use_readability,
        }
    }
}
