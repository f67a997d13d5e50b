// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

use pagescout::engines::traits::{EngineError, ExecutionContext};
use pagescout::utils::retry_policy::RetryPolicy;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::helpers::test_collector;

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;
    // 加载一次，静态抓取一次
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let err = test_collector()
        .with_retry_policy(RetryPolicy::fixed(3, Duration::from_millis(10)))
        .collect_with_retry(&format!("{}/missing", server.uri()), None)
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Http { status: 404 }));
}

#[tokio::test]
async fn test_server_error_reruns_whole_pipeline() {
    let server = MockServer::start().await;
    // 每次尝试都重新加载并抓取：两次尝试共四个请求
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&server)
        .await;

    let err = test_collector()
        .with_retry_policy(RetryPolicy::fixed(1, Duration::from_millis(10)))
        .collect_with_retry(&format!("{}/flaky", server.uri()), None)
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    assert!(matches!(err, EngineError::Http { status: 503 }));
}

#[tokio::test]
async fn test_single_attempt_does_not_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&server)
        .await;

    let ctx = ExecutionContext::new("single");
    let result = test_collector()
        .collect_once(&format!("{}/down", server.uri()), None, &ctx)
        .await;

    assert!(matches!(result, Err(EngineError::Http { status: 502 })));
}
