// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;

use crate::domain::models::structured::SectionType;
use crate::utils::html::{class_attr, css};

static RANKING_HINT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)rank|ranking|랭킹").unwrap());
static PRODUCT_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)product|goods|상품|item|아이템").unwrap());

/// 判断分区类型
///
/// 按 ranking → product → table → list → article → text 的顺序检测
pub fn detect_section_type(element: ElementRef<'_>, text: &str) -> SectionType {
    let class = class_attr(element);
    let html = element.inner_html();
    let tag = element.value().name();

    if RANKING_HINT.is_match(text) || RANKING_HINT.is_match(class) || RANKING_HINT.is_match(&html) {
        return SectionType::Ranking;
    }
    if PRODUCT_HINT.is_match(class) || PRODUCT_HINT.is_match(&html) {
        return SectionType::Product;
    }
    if tag == "table" || element.select(&css("table")).next().is_some() {
        return SectionType::Table;
    }
    if matches!(tag, "ul" | "ol") || element.select(&css("ul, ol, li")).next().is_some() {
        return SectionType::List;
    }
    if tag == "article" || element.select(&css("article")).next().is_some() {
        return SectionType::Article;
    }
    SectionType::Text
}
