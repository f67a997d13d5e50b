// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html};
use tracing::debug;
use url::Url;

use crate::domain::models::content::{
    field, BlockType, ContentBlock, DetectedField, ExtractedItem, PageDataModel,
};
use crate::utils::html::{css, element_text, normalize_text, try_css, SearchScope};
use crate::utils::url_utils::resolve_url;

/// 页面数据模型构建器
///
/// 将检测到的块重新应用到整页，得到具体条目
pub struct ModelBuilder;

impl ModelBuilder {
    /// 构建页面数据模型
    ///
    /// # 参数
    ///
    /// * `markup` - 页面HTML
    /// * `blocks` - 检测到的块
    /// * `base_url` - 解析相对链接的基础URL
    ///
    /// # 返回值
    ///
    /// 包含全部块和非空条目的数据模型
    pub fn build(markup: &str, blocks: Vec<ContentBlock>, base_url: &str) -> PageDataModel {
        let document = Html::parse_document(markup);
        let base = Url::parse(base_url).ok();
        let header_cell = css("td");
        let mut items = Vec::new();

        for block in &blocks {
            let Some(locator) = try_css(&block.locator) else {
                continue;
            };

            for element in document.select(&locator) {
                // 表头行（只有 th）不作为条目
                if block.block_type == BlockType::Table && element.select(&header_cell).next().is_none() {
                    continue;
                }

                let fields: BTreeMap<String, String> = block
                    .fields
                    .iter()
                    .filter_map(|f| {
                        Self::field_value(element, f, base.as_ref()).map(|v| (f.name.clone(), v))
                    })
                    .collect();

                if !fields.is_empty() {
                    items.push(ExtractedItem {
                        block_type: block.block_type,
                        semantic_type: block.semantic_type,
                        fields,
                    });
                }
            }
        }

        debug!(items = items.len(), url = base_url, "Page data model built");
        PageDataModel {
            page_url: base_url.to_string(),
            blocks,
            items,
        }
    }

    /// 读取单个字段的值，不可用时返回 None
    fn field_value(element: ElementRef<'_>, f: &DetectedField, base: Option<&Url>) -> Option<String> {
        let selector = try_css(f.selector.as_deref()?)?;
        let target = SearchScope::Element(element).first(&selector)?;

        if f.name == field::DETAIL_URL {
            return Self::resolve_href(target.value().attr("href")?, base);
        }

        if f.name == field::DATE {
            if let Some(datetime) = target.value().attr("datetime").map(str::trim) {
                if !datetime.is_empty() {
                    return Some(datetime.to_string());
                }
            }
        }

        let text = normalize_text(&element_text(target));
        (!text.is_empty()).then_some(text)
    }

    /// 链接转为绝对 http(s) URL，无法解析时丢弃
    fn resolve_href(href: &str, base: Option<&Url>) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        let resolved = match base {
            Some(base) => resolve_url(base, href).ok()?,
            None => Url::parse(href).ok()?,
        };
        matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::page::PageRole;
    use crate::domain::services::block_detector::BlockDetector;

    fn board(rows: usize, with_header_row: bool) -> String {
        let header = if with_header_row {
            "<tr><th>Date</th><th>Title</th></tr>"
        } else {
            ""
        };
        let body: String = (1..=rows)
            .map(|i| {
                format!(
                    "<tr><td>2024-01-{i:02}</td><td><a href=\"view.php?no={i}\">This is a sufficiently long title</a></td></tr>"
                )
            })
            .collect();
        format!("<html><body><table><tbody>{header}{body}</tbody></table></body></html>")
    }

    #[test]
    fn test_table_items_materialized() {
        let markup = board(5, false);
        let blocks = BlockDetector::detect(&markup, PageRole::ListNotice, None);
        let model = ModelBuilder::build(&markup, blocks, "https://example.com/board/list.php");

        assert_eq!(model.items.len(), 5);
        for (i, item) in model.items.iter().enumerate() {
            assert_eq!(item.get(field::TITLE), Some("This is a sufficiently long title"));
            assert_eq!(item.get(field::DATE), Some(format!("2024-01-{:02}", i + 1).as_str()));
            assert_eq!(
                item.get(field::DETAIL_URL),
                Some(format!("https://example.com/board/view.php?no={}", i + 1).as_str())
            );
        }
    }

    #[test]
    fn test_header_row_excluded() {
        let markup = board(5, true);
        let blocks = BlockDetector::detect(&markup, PageRole::ListNotice, None);
        assert_eq!(blocks.len(), 1);
        let model = ModelBuilder::build(&markup, blocks, "https://example.com/");
        assert_eq!(model.items.len(), 5);
    }

    #[test]
    fn test_detected_fields_survive_model_building() {
        let markup = "<html><body>\
            <div class=\"post\"><h2>First post</h2><time datetime=\"2024-02-01\">Feb 1</time><a href=\"/view/1\">go</a></div>\
            <div class=\"post\"><h2>Second post</h2><time datetime=\"2024-02-02\">Feb 2</time><a href=\"/view/2\">go</a></div>\
            </body></html>";
        let blocks = BlockDetector::detect(markup, PageRole::ListNotice, None);
        let model = ModelBuilder::build(markup, blocks.clone(), "https://example.com/list");

        let first = &model.items[0];
        for block in &blocks {
            for f in block.fields.iter().filter(|f| f.confidence >= 0.6) {
                assert!(first.get(&f.name).is_some(), "field {} dropped", f.name);
            }
        }
        assert_eq!(first.get(field::DATE), Some("2024-02-01"));
        assert_eq!(first.get(field::DETAIL_URL), Some("https://example.com/view/1"));
    }

    #[test]
    fn test_unresolvable_links_dropped() {
        let block = ContentBlock::new(
            BlockType::List,
            crate::domain::models::content::SemanticType::Unknown,
            vec![
                DetectedField::new(field::DETAIL_URL, "a", 0.7),
                DetectedField::new(field::TITLE, "b", 0.9),
            ],
            "li",
        )
        .unwrap();
        let markup = "<ul><li><a href=\"javascript:void(0)\">x</a><b>kept</b></li><li><a href=\"\">y</a></li></ul>";
        let model = ModelBuilder::build(markup, vec![block], "https://example.com/");
        // 第二个条目没有任何字段，被丢弃
        assert_eq!(model.items.len(), 1);
        assert_eq!(model.items[0].get(field::DETAIL_URL), None);
        assert_eq!(model.items[0].get(field::TITLE), Some("kept"));
    }
}
