// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::engines::traits::EngineError;

/// 内部调用的最小超时
const MIN_INNER_TIMEOUT: Duration = Duration::from_secs(1);

/// 从外部预算中扣除安全余量，得到内部调用超时
///
/// 结果严格小于 `budget`，让浏览器等资源能在外部截止前释放。
/// 扣除余量后不足 [`MIN_INNER_TIMEOUT`]（或余量为零）时取预算的一半。
///
/// # 返回值
///
/// 预算为零时不存在严格更小的正超时，返回 [`EngineError::Other`]
pub fn inner_timeout(budget: Duration, safety_margin: Duration) -> Result<Duration, EngineError> {
    if budget.is_zero() {
        return Err(EngineError::Other(format!(
            "timeout budget must be positive, got {budget:?}"
        )));
    }
    Ok(match budget.checked_sub(safety_margin) {
        Some(rest) if rest >= MIN_INNER_TIMEOUT && rest < budget => rest,
        _ => budget / 2,
    })
}

/// 一次抓取中所有内部调用共享的截止时间
///
/// 每个调用只拿到截止前的剩余时间，多次调用的总耗时不会超过外部预算
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    limit: Duration,
}

impl Deadline {
    /// 以 [`inner_timeout`] 的结果为时长，从现在开始计时
    pub fn within(budget: Duration, safety_margin: Duration) -> Result<Self, EngineError> {
        let limit = inner_timeout(budget, safety_margin)?;
        Ok(Self {
            at: Instant::now() + limit,
            limit,
        })
    }

    /// 在截止前完成 `operation`，否则放弃它并返回 [`EngineError::Timeout`]
    pub async fn run<T, F>(&self, operation: F) -> Result<T, EngineError>
    where
        F: Future<Output = Result<T, EngineError>>,
    {
        tokio::time::timeout_at(self.at, operation)
            .await
            .unwrap_or(Err(EngineError::Timeout(self.limit)))
    }

    /// 距截止的剩余时间，已过期时为零
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_timeout_subtracts_margin() {
        assert_eq!(
            inner_timeout(Duration::from_secs(30), Duration::from_secs(5)).unwrap(),
            Duration::from_secs(25)
        );
    }

    #[test]
    fn test_inner_timeout_small_budget() {
        let budget = Duration::from_secs(4);
        let inner = inner_timeout(budget, Duration::from_secs(5)).unwrap();
        assert!(inner < budget);
        assert_eq!(inner, Duration::from_secs(2));
    }

    #[test]
    fn test_inner_timeout_zero_margin_stays_below_budget() {
        let budget = Duration::from_secs(10);
        let inner = inner_timeout(budget, Duration::ZERO).unwrap();
        assert!(inner < budget);
    }

    #[test]
    fn test_inner_timeout_rejects_zero_budget() {
        let err = inner_timeout(Duration::ZERO, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, EngineError::Other(_)));
        assert!(!err.is_retryable());
        assert!(Deadline::within(Duration::ZERO, Duration::ZERO).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_counts_down_and_expires() {
        let deadline = Deadline::within(Duration::from_secs(10), Duration::from_secs(4)).unwrap();
        assert_eq!(deadline.remaining(), Duration::from_secs(6));

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(deadline.remaining(), Duration::from_secs(2));
        assert!(!deadline.is_expired());

        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(deadline.remaining(), Duration::ZERO);
        assert!(deadline.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_abandons_stalled_operation() {
        let deadline = Deadline::within(Duration::from_secs(10), Duration::from_secs(4)).unwrap();
        let finished = deadline.run(async { Ok::<_, EngineError>(7) }).await.unwrap();
        assert_eq!(finished, 7);

        let stalled = deadline
            .run(std::future::pending::<Result<(), EngineError>>())
            .await;
        assert!(matches!(stalled, Err(EngineError::Timeout(limit)) if limit == Duration::from_secs(6)));
        assert!(deadline.is_expired());
    }
}
