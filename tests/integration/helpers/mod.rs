// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use pagescout::config::settings::Settings;
use pagescout::engines::collector::DynamicCollector;
use pagescout::engines::endpoint_detector::NoopEndpointProbe;
use pagescout::engines::page_loader::PageLoader;
use pagescout::engines::strategy_factory::StrategyFactory;
use pagescout::engines::traits::EndpointProbe;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 不依赖浏览器的采集器
pub fn test_collector() -> DynamicCollector {
    let settings = Settings::default();
    let probe: Arc<dyn EndpointProbe> = Arc::new(NoopEndpointProbe);
    let loader = Arc::new(PageLoader::new(&settings.http, None).unwrap());
    let factory = StrategyFactory::from_settings(&settings, loader, probe.clone()).unwrap();

    DynamicCollector::new(&settings, None)
        .unwrap()
        .with_probe(probe)
        .with_factory(factory)
}

/// 挂载一个返回HTML的页面
pub async fn mount_page(server: &MockServer, route: &str, markup: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(markup),
        )
        .mount(server)
        .await;
}

/// 五行的公告列表
pub fn notice_board() -> String {
    let rows: String = (1..=5)
        .map(|i| {
            format!(
                "<tr><td>{i}</td><td><a href=\"/notice/view?no={i}\">학사 일정 변경 안내 {i}</a></td>\
                 <td>교무팀</td><td>2024-01-0{i}</td></tr>"
            )
        })
        .collect();
    format!(
        "<html><head><title>공지사항</title></head><body>\
         <table><thead><tr><th>번호</th><th>제목</th><th>부서</th><th>날짜</th></tr></thead>\
         <tbody>{rows}</tbody></table></body></html>"
    )
}

pub fn detail_page() -> String {
    r#"<html><head><title>Site</title>
        <meta property="og:title" content="Campus library hours extended">
        <meta property="article:published_time" content="2024-05-01">
        </head><body><div class="article-body">
        <p>The campus library will extend its opening hours during the exam period, starting next Monday, until further notice.</p>
        <p>Students are asked to carry their identification cards, as access will be checked at the entrance after 10pm.</p>
        </div></body></html>"#
        .to_string()
}
