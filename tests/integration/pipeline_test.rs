// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use pagescout::domain::models::page::PageRole;
use pagescout::domain::models::page_config::{CustomSelectors, PageConfig, StrategyOverride};
use pagescout::domain::models::strategy::{Fetcher, ParserKind};
use wiremock::MockServer;

use super::helpers::{detail_page, mount_page, notice_board, test_collector};

#[tokio::test]
async fn test_list_page_yields_model_records() {
    let server = MockServer::start().await;
    mount_page(&server, "/notice/list", notice_board()).await;
    let url = format!("{}/notice/list", server.uri());

    let collector = test_collector();
    let understanding = collector.understand(&url, None).await;
    assert_eq!(understanding.profile.page_role, PageRole::ListNotice);
    assert_eq!(understanding.strategy.fetcher, Fetcher::Static);
    assert_eq!(understanding.strategy.parser, ParserKind::List);
    assert!(!understanding.strategy.use_readability);
    assert_eq!(understanding.model.items.len(), 5);

    let config = PageConfig::for_source("campus-notice");
    let records = collector
        .collect_with_retry(&url, Some(&config))
        .await
        .unwrap();

    // 一条页面记录加五条模型记录
    assert_eq!(records.len(), 6);
    assert!(records.iter().all(|r| r.source == "campus-notice"));

    let first_item = &records[1];
    assert_eq!(first_item.title, "학사 일정 변경 안내 1");
    assert_eq!(first_item.url, format!("{}/notice/view?no=1", server.uri()));
    assert!(first_item.date.starts_with("2024-01-01"));
    assert!(first_item.content.as_text().contains("Department: 교무팀"));
}

#[tokio::test]
async fn test_detail_page_uses_content_extraction() {
    let server = MockServer::start().await;
    mount_page(&server, "/board/view.do", detail_page()).await;
    let url = format!("{}/board/view.do", server.uri());

    let collector = test_collector();
    let understanding = collector.understand(&url, None).await;
    assert_eq!(understanding.profile.page_role, PageRole::DetailNotice);
    assert_eq!(understanding.strategy.parser, ParserKind::Detail);
    assert!(understanding.strategy.use_readability);

    let records = collector.collect_with_retry(&url, None).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Campus library hours extended");
    assert_eq!(records[0].source, url);
    assert!(records[0].date.starts_with("2024-05-01"));
}

#[tokio::test]
async fn test_override_with_custom_selectors() {
    let items: String = (1..=3)
        .map(|i| format!("<li><a href=\"/post/{i}\">Post {i}</a><span class=\"date\">2024-03-0{i}</span></li>"))
        .collect();
    let markup = format!(
        "<html><head><title>About</title></head><body><ul class=\"board\">{items}</ul></body></html>"
    );

    let server = MockServer::start().await;
    mount_page(&server, "/about", markup).await;
    let url = format!("{}/about", server.uri());

    let config = PageConfig::for_source("custom")
        .with_override(StrategyOverride {
            page_role: Some(PageRole::ListEvent),
            parser: Some(ParserKind::List),
            use_readability: Some(false),
            ..StrategyOverride::default()
        })
        .with_selectors(CustomSelectors {
            item: Some("ul.board li".to_string()),
            title: Some("a".to_string()),
            date: Some(".date".to_string()),
            detail_url: Some("a".to_string()),
            ..CustomSelectors::default()
        });

    let collector = test_collector();
    let understanding = collector.understand(&url, Some(&config)).await;
    assert_eq!(understanding.strategy.fetcher, Fetcher::Static);
    assert_eq!(understanding.strategy.parser, ParserKind::List);
    assert_eq!(understanding.model.items.len(), 3);

    let records = collector
        .collect_with_retry(&url, Some(&config))
        .await
        .unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[3].title, "Post 3");
    assert_eq!(records[3].url, format!("{}/post/3", server.uri()));
    assert!(records[3].date.starts_with("2024-03-03"));
}
