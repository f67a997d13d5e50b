// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

use crate::engines::traits::EngineError;

/// 退避方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffStrategy {
    /// 每次等待相同时间
    Fixed,
    /// 等待时间按 2^n 增长
    Exponential,
}

/// 采集重试策略
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大重试次数（不含首次尝试）
    pub max_retries: u32,
    /// 初始退避时间
    pub initial_backoff: Duration,
    /// 最大退避时间
    pub max_backoff: Duration,
    /// 退避方式
    pub strategy: BackoffStrategy,
    /// 抖动因子 (0.0-1.0)
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(2000),
            max_backoff: Duration::from_secs(10),
            strategy: BackoffStrategy::Exponential,
            jitter_factor: 0.1,
        }
    }
}

impl RetryPolicy {
    /// 不重试
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// 固定间隔重试
    pub fn fixed(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff: backoff,
            max_backoff: backoff,
            strategy: BackoffStrategy::Fixed,
            jitter_factor: 0.0,
        }
    }

    /// 计算第 `attempt` 次重试（从1开始）前的等待时间
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let base = match self.strategy {
            BackoffStrategy::Fixed => self.initial_backoff.as_secs_f64(),
            BackoffStrategy::Exponential => {
                self.initial_backoff.as_secs_f64() * 2f64.powi(attempt.saturating_sub(1) as i32)
            }
        };
        let capped = base.min(self.max_backoff.as_secs_f64());

        let jittered = if self.jitter_factor > 0.0 && capped > 0.0 {
            let range = capped * self.jitter_factor;
            (capped + rand::random_range(-range..range)).max(0.0)
        } else {
            capped
        };

        Duration::from_secs_f64(jittered)
    }

    /// 是否还可以重试
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// 根据错误类型判断是否应该重试
    pub fn should_retry_error(&self, attempt: u32, error: &EngineError) -> bool {
        self.should_retry(attempt) && error.is_retryable()
    }
}
