// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::domain::models::extraction::BestContent;
use crate::domain::models::record::{RawRecord, RecordContent};
use crate::domain::services::content_extraction::HybridContentExtractor;
use crate::domain::services::structured::extract_structured_content;
use crate::engines::traits::ExecutionContext;
use crate::utils::date_utils::to_iso8601_or_now;
use crate::utils::html::{char_len, css, element_text, normalize_text, strip_nodes};

static NOISE: Lazy<Selector> =
    Lazy::new(|| css(r#"script, style, noscript, meta, link[rel="stylesheet"]"#));
static TITLE: Lazy<Selector> = Lazy::new(|| css("title"));
static BODY: Lazy<Selector> = Lazy::new(|| css("body"));

/// 按优先级排列的主内容容器
const MAIN_CONTAINERS: [&str; 8] = [
    "main",
    "article",
    ".content",
    ".main-content",
    "#content",
    r#"[role="main"]"#,
    ".article-content",
    ".post-content",
];

/// 主内容容器至少需要的文本长度（不含）
const MIN_CONTAINER_TEXT: usize = 100;
const UNTITLED: &str = "Untitled";

/// 把已渲染的页面HTML转换为记录
///
/// 静态与无头两种抓取策略共用同一套后处理：
/// 混合正文抽取 → 结构化区域 → 受限长度的纯文本。
#[derive(Clone)]
pub struct PageRecordBuilder {
    hybrid: HybridContentExtractor,
    max_plain_text_length: usize,
}

impl PageRecordBuilder {
    pub fn new(hybrid: HybridContentExtractor, max_plain_text_length: usize) -> Self {
        Self {
            hybrid,
            max_plain_text_length,
        }
    }

    /// 生成页面记录
    ///
    /// # 参数
    ///
    /// * `markup` - 渲染后的HTML
    /// * `url` - 页面地址
    /// * `ctx` - 执行上下文
    /// * `use_readability` - 是否先尝试混合正文抽取
    /// * `time_limit` - 正文抽取可用的剩余时间
    ///
    /// # 返回值
    ///
    /// 最多一条记录；正文抽取、结构化抽取都失败时退回纯文本
    pub async fn build(
        &self,
        markup: &str,
        url: &str,
        ctx: &ExecutionContext,
        use_readability: bool,
        time_limit: Duration,
    ) -> Vec<RawRecord> {
        let fallback_title = page_title(markup);

        if use_readability && !time_limit.is_zero() {
            if let Some(best) = self.hybrid.extract(markup, url, time_limit).await {
                tracing::info!(
                    url,
                    source = %ctx.source,
                    method = ?best.method,
                    confidence = best.confidence,
                    length = char_len(&best.content),
                    "Content extracted"
                );
                return vec![self.best_content_record(markup, url, ctx, best, fallback_title)];
            }
        }

        let structured = extract_structured_content(markup);
        if structured.has_sections() {
            tracing::debug!(url, "Using structured sections as record content");
            return vec![record(ctx, fallback_title, url, structured.into(), None)];
        }

        let text = self.plain_text(markup);
        vec![record(ctx, fallback_title, url, text.into(), None)]
    }

    fn best_content_record(
        &self,
        markup: &str,
        url: &str,
        ctx: &ExecutionContext,
        best: BestContent,
        fallback_title: String,
    ) -> RawRecord {
        let structured = extract_structured_content(markup);
        let content = if structured.has_sections() {
            RecordContent::from(structured)
        } else {
            RecordContent::from(self.truncate(&best.content))
        };
        let title = if best.title.trim().is_empty() || best.title == UNTITLED {
            fallback_title
        } else {
            best.title
        };
        record(ctx, title, url, content, best.published_date.as_deref())
    }

    /// 去掉脚本等噪声后的纯文本，优先取主内容容器
    pub fn plain_text(&self, markup: &str) -> String {
        let document = strip_nodes(markup, &NOISE);
        let text = MAIN_CONTAINERS
            .iter()
            .map(|selector| css(selector))
            .filter_map(|selector| document.select(&selector).next())
            .map(|el| normalize_text(&element_text(el)))
            .find(|text| char_len(text) > MIN_CONTAINER_TEXT)
            .or_else(|| {
                document
                    .select(&BODY)
                    .next()
                    .map(|body| normalize_text(&element_text(body)))
            })
            .unwrap_or_default();
        self.truncate(&text)
    }

    fn truncate(&self, text: &str) -> String {
        let cleaned = normalize_text(text);
        if char_len(&cleaned) > self.max_plain_text_length {
            let mut out: String = cleaned.chars().take(self.max_plain_text_length).collect();
            out.push_str("...");
            out
        } else {
            cleaned
        }
    }
}

fn page_title(markup: &str) -> String {
    let document = Html::parse_document(markup);
    document
        .select(&TITLE)
        .next()
        .map(|t| normalize_text(&element_text(t)))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

fn record(
    ctx: &ExecutionContext,
    title: String,
    url: &str,
    content: RecordContent,
    date: Option<&str>,
) -> RawRecord {
    RawRecord {
        title,
        url: url.to_string(),
        date: to_iso8601_or_now(date),
        content,
        source: ctx.source.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::settings::ScoringSettings;
    use crate::domain::services::content_extraction::ReadabilityExtractor;

    fn builder(max_len: usize) -> PageRecordBuilder {
        let hybrid = HybridContentExtractor::new(
            Arc::new(ReadabilityExtractor::default()),
            None,
            ScoringSettings::default(),
            50,
        );
        PageRecordBuilder::new(hybrid, max_len)
    }

    #[test]
    fn test_plain_text_prefers_main_container() {
        let main_text = "본문 ".repeat(60);
        let markup = format!(
            "<html><body><div>menu text</div><main>{main_text}</main><script>var a=1;</script></body></html>"
        );
        let text = builder(5000).plain_text(&markup);
        assert!(text.starts_with("본문"));
        assert!(!text.contains("menu"));
    }

    #[test]
    fn test_plain_text_is_bounded() {
        let markup = format!("<html><body><p>{}</p></body></html>", "a".repeat(200));
        let text = builder(50).plain_text(&markup);
        assert_eq!(text.chars().count(), 53);
        assert!(text.ends_with("..."));
    }

    #[tokio::test]
    async fn test_detail_page_uses_extracted_content() {
        let markup = r#"<html><head><title>Site</title>
            <meta property="og:title" content="A detail page title">
            <meta property="article:published_time" content="2024-05-01">
            </head><body><div class="article-body">
            <p>This is the first paragraph of the article, long enough to score, with commas, too.</p>
            <p>This is the second paragraph of the article, also long enough to be counted here.</p>
            </div></body></html>"#;
        let ctx = ExecutionContext::new("test-source");
        let records = builder(5000)
            .build(markup, "https://example.com/view/1", &ctx, true, Duration::from_secs(5))
            .await;

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.title, "A detail page title");
        assert_eq!(record.source, "test-source");
        assert!(record.date.starts_with("2024-05-01"));
        assert!(record.content.as_text().contains("first paragraph"));
    }

    #[tokio::test]
    async fn test_without_readability_falls_back_to_plain_text() {
        let markup = "<html><head><title>Plain</title></head><body><div>just some text</div></body></html>";
        let ctx = ExecutionContext::new("s");
        let records = builder(5000)
            .build(markup, "https://example.com", &ctx, false, Duration::from_secs(5))
            .await;

        assert_eq!(records[0].title, "Plain");
        assert_eq!(records[0].content, RecordContent::Text("just some text".into()));
    }
}
