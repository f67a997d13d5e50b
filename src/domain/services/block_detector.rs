// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use tracing::debug;

use crate::domain::models::content::{field, BlockType, ContentBlock, DetectedField, SemanticType};
use crate::domain::models::page::PageRole;
use crate::domain::models::page_config::CustomSelectors;
use crate::utils::html::{char_len, css, element_text, try_css, SearchScope};

static DATE_FULL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}[.\-/]\d{1,2}[.\-/]\d{1,2}").unwrap());
static DATE_SHORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{2}[.\-/]\d{1,2}[.\-/]\d{1,2}").unwrap());
static DEPARTMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(팀|부|과|실)$").unwrap());
static VIEWS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());
static NO_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)no=\d+").unwrap());

/// 列表链接中指向详情页的片段
const DETAIL_HREF_MARKERS: [&str; 4] = ["rNo=", "view", "detail", "read"];

/// 文章类容器
const ARTICLE_LOCATOR: &str = "article, .article, .post, .item";
const LIST_ITEM_LOCATOR: &str = "ul li, ol li";
const TABLE_ROW_LOCATOR: &str = "table tbody tr";

/// 列表项被视为内容的最小文本长度
const LIST_ITEM_MIN_TEXT: usize = 20;
/// 至少需要多少个列表项
const LIST_ITEM_MIN_COUNT: usize = 3;

/// 单元素字段候选：(字段名, 候选选择器, 置信度)
const ELEMENT_FIELD_CANDIDATES: [(&str, &[&str], f64); 4] = [
    (field::TITLE, &["h1", "h2", ".title", ".post-title", ".article-title"], 0.9),
    (field::DATE, &[".date", ".published", "time", "[datetime]"], 0.8),
    (field::AUTHOR, &[".author", ".writer", ".by"], 0.8),
    (field::CONTENT, &[".content", ".article-content", ".post-content", "article"], 0.9),
];

/// 自定义选择器产生的字段置信度
const CUSTOM_FIELD_CONFIDENCE: f64 = 1.0;

/// 内容块与字段检测器
pub struct BlockDetector;

impl BlockDetector {
    /// 检测页面上的内容块
    ///
    /// # 参数
    ///
    /// * `markup` - 页面HTML
    /// * `role` - 页面角色，决定块的语义类型
    /// * `custom` - 来源配置中的自定义选择器，额外追加一个列表块
    ///
    /// # 返回值
    ///
    /// 所有检测到的块；没有块也是合法结果
    pub fn detect(
        markup: &str,
        role: PageRole,
        custom: Option<&CustomSelectors>,
    ) -> Vec<ContentBlock> {
        let document = Html::parse_document(markup);
        let semantic = role.semantic_type();
        let mut blocks = Vec::new();

        if let Some(block) = Self::detect_table(&document, semantic) {
            blocks.push(block);
        }

        let articles: Vec<_> = document.select(&css(ARTICLE_LOCATOR)).collect();
        let article_block_type = match articles.len() {
            0 => None,
            1 => Some(BlockType::Detail),
            _ => Some(BlockType::List),
        };
        if let (Some(block_type), Some(first)) = (article_block_type, articles.first()) {
            let fields = Self::detect_element_fields(*first);
            blocks.extend(ContentBlock::new(block_type, semantic, fields, ARTICLE_LOCATOR));
        }

        let list_items: Vec<_> = document
            .select(&css(LIST_ITEM_LOCATOR))
            .filter(|li| char_len(element_text(*li).trim()) > LIST_ITEM_MIN_TEXT)
            .collect();
        if list_items.len() > LIST_ITEM_MIN_COUNT {
            let fields = Self::detect_element_fields(list_items[0]);
            blocks.extend(ContentBlock::new(BlockType::List, semantic, fields, LIST_ITEM_LOCATOR));
        }

        if let Some(block) = custom.and_then(|c| Self::custom_block(c, semantic)) {
            blocks.push(block);
        }

        debug!(blocks = blocks.len(), ?role, "Content blocks detected");
        blocks
    }

    /// 表格检测：分析第一个表体中第一行含 td 的行
    fn detect_table(document: &Html, semantic: SemanticType) -> Option<ContentBlock> {
        let tbody = document.select(&css("table tbody")).next()?;
        let td = css("td");
        let row = tbody
            .select(&css("tr"))
            .find(|tr| tr.select(&td).next().is_some())?;
        let fields = Self::detect_row_fields(row);
        ContentBlock::new(BlockType::Table, semantic, fields, TABLE_ROW_LOCATOR)
    }

    /// 逐个单元格匹配字段
    ///
    /// 字段选择器使用 `td:nth-child(n)`，保证模型构建时能在每一行重新定位
    fn detect_row_fields(row: ElementRef<'_>) -> Vec<DetectedField> {
        let link_sel = css("a");
        let mut fields = Vec::new();

        let cells = row.children().filter_map(ElementRef::wrap);
        for (index, cell) in cells.enumerate() {
            if cell.value().name() != "td" {
                continue;
            }
            let cell_selector = format!("td:nth-child({})", index + 1);
            let text = element_text(cell);
            let text = text.trim();
            let text_len = char_len(text);
            let mut matched = false;

            if DATE_FULL.is_match(text) || DATE_SHORT.is_match(text) {
                fields.push(DetectedField::new(field::DATE, &cell_selector, 0.9).with_pattern(DATE_FULL.as_str()));
                matched = true;
            }

            if DEPARTMENT.is_match(text) && text_len < 20 {
                fields.push(DetectedField::new(field::DEPARTMENT, &cell_selector, 0.7));
                matched = true;
            }

            if VIEWS.is_match(text) && text.parse::<u64>().is_ok_and(|n| n > 0 && n < 1_000_000) {
                fields.push(DetectedField::new(field::VIEWS, &cell_selector, 0.6));
                matched = true;
            }

            if let Some(link) = cell.select(&link_sel).next() {
                let link_selector = format!("{cell_selector} a");
                let href = link.value().attr("href").unwrap_or("");
                if Self::is_detail_href(href) {
                    fields.push(DetectedField::new(field::DETAIL_URL, &link_selector, 0.8));
                }
                let link_text = element_text(link);
                let link_len = char_len(link_text.trim());
                if link_len > 5 && link_len < 200 {
                    fields.push(DetectedField::new(field::TITLE, &link_selector, 0.9));
                }
            } else if !matched && text_len > 5 && text_len < 200 {
                fields.push(DetectedField::new(field::TITLE, &cell_selector, 0.6));
            }
        }

        dedupe_fields(fields)
    }

    fn is_detail_href(href: &str) -> bool {
        !href.is_empty()
            && (DETAIL_HREF_MARKERS.iter().any(|m| href.contains(m)) || NO_PARAM.is_match(href))
    }

    /// 单元素字段检测：每个字段按候选顺序取第一个命中
    fn detect_element_fields(element: ElementRef<'_>) -> Vec<DetectedField> {
        let scope = SearchScope::Element(element);
        let mut fields = Vec::new();

        for (name, candidates, confidence) in ELEMENT_FIELD_CANDIDATES {
            let hit = candidates.iter().find(|candidate| {
                scope.first(&css(candidate)).is_some_and(|el| {
                    !element_text(el).trim().is_empty()
                        || (name == field::DATE && el.value().attr("datetime").is_some())
                })
            });
            if let Some(selector) = hit {
                fields.push(DetectedField::new(name, *selector, confidence));
            }
        }

        if let Some(link) = scope.first(&css("a")) {
            let href = link.value().attr("href").unwrap_or("");
            if href.contains("view") || href.contains("detail") {
                fields.push(DetectedField::new(field::DETAIL_URL, "a", 0.7));
            }
        }

        fields
    }

    /// 自定义选择器构成的列表块
    fn custom_block(custom: &CustomSelectors, semantic: SemanticType) -> Option<ContentBlock> {
        let item = custom.item.as_deref()?;
        let locator = match custom.list.as_deref() {
            Some(list) if !list.contains(',') && !item.contains(',') => format!("{list} {item}"),
            _ => item.to_string(),
        };
        try_css(&locator)?;

        let candidates = [
            (field::TITLE, &custom.title),
            (field::DATE, &custom.date),
            (field::AUTHOR, &custom.author),
            (field::CONTENT, &custom.content),
            (field::DETAIL_URL, &custom.detail_url),
        ];
        let fields = candidates
            .into_iter()
            .filter_map(|(name, selector)| {
                let selector = selector.as_deref()?;
                try_css(selector)?;
                Some(DetectedField::new(name, selector, CUSTOM_FIELD_CONFIDENCE))
            })
            .collect();

        ContentBlock::new(BlockType::List, semantic, fields, &locator)
    }
}

/// 同名字段只保留置信度最高的一个（同分保留先出现的）
fn dedupe_fields(fields: Vec<DetectedField>) -> Vec<DetectedField> {
    let mut out: Vec<DetectedField> = Vec::with_capacity(fields.len());
    for f in fields {
        match out.iter_mut().find(|existing| existing.name == f.name) {
            Some(existing) if f.confidence > existing.confidence => *existing = f,
            Some(_) => {}
            None => out.push(f),
        }
    }
    out
}
