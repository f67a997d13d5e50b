// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 结构化区域抽取
//!
//! 把页面切分为导航、头部、搜索、主内容、侧栏和页脚，
//! 并在其中识别排名列表和商品列表。

pub mod item_extractors;
pub mod section_detector;
pub mod section_extractors;
pub mod selectors;
pub mod text_utils;

use scraper::Html;
use tracing::debug;

use crate::domain::models::structured::{SidebarBlock, StructuredContent};
use section_extractors::{
    extract_footer, extract_header, extract_main_content, extract_search, extract_section_text,
};

const MAX_NAVIGATION: usize = 30;
const MAX_SIDEBAR: usize = 30;

/// 将HTML转换为结构化内容
///
/// 没有数据的区域整体省略；返回值可能不含任何区域
pub fn extract_structured_content(markup: &str) -> StructuredContent {
    let document = Html::parse_document(markup);

    let mut navigation = extract_section_text(&document, selectors::NAVIGATION);
    navigation.truncate(MAX_NAVIGATION);

    let mut sidebar_items = extract_section_text(&document, selectors::SIDEBAR);
    sidebar_items.truncate(MAX_SIDEBAR);
    let sidebar = if sidebar_items.is_empty() {
        Vec::new()
    } else {
        vec![SidebarBlock {
            title: "Sidebar".to_string(),
            items: sidebar_items,
        }]
    };

    let structured = StructuredContent {
        navigation,
        header: extract_header(&document),
        search: extract_search(&document),
        main_content: extract_main_content(&document),
        sidebar,
        footer: extract_footer(&document),
    };

    debug!(
        navigation = structured.navigation.len(),
        sections = structured
            .main_content
            .as_ref()
            .map(|m| m.sections.len())
            .unwrap_or(0),
        "Structured content extracted"
    );
    structured
}
