// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use readability::extractor;
use scraper::{Html, Selector};
use url::Url;

use super::ContentExtractor;
use crate::domain::models::extraction::ExtractedContent;
use crate::utils::html::{char_len, css, element_text, normalize_text, strip_nodes};

static NOISE: Lazy<Selector> = Lazy::new(|| {
    css("script, style, noscript, iframe, nav, header, footer, aside, form, template")
});
static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| css("p, pre, blockquote"));
static BODY: Lazy<Selector> = Lazy::new(|| css("body"));

static OG_TITLE: Lazy<Selector> = Lazy::new(|| css(r#"meta[property="og:title"]"#));
static TITLE: Lazy<Selector> = Lazy::new(|| css("title"));
static H1: Lazy<Selector> = Lazy::new(|| css("h1"));
static META_AUTHOR: Lazy<Selector> = Lazy::new(|| css(r#"meta[name="author"]"#));
static AUTHOR: Lazy<Selector> = Lazy::new(|| css(r#".author, .writer, [rel="author"]"#));
static META_PUBLISHED: Lazy<Selector> =
    Lazy::new(|| css(r#"meta[property="article:published_time"]"#));
static TIME: Lazy<Selector> = Lazy::new(|| css("time[datetime]"));

const CONFIDENCE: f64 = 0.95;
const BODY_FALLBACK_CONFIDENCE: f64 = 0.75;

/// 进程内的 readability 正文抽取
///
/// 先去掉导航、页脚等噪声节点，再交给 `readability` 选出正文容器；
/// 没有得到足够正文时退回整个 body 的文本（较低置信度）。
/// 标题、作者、发布日期从原始文档的 meta 与常见标记中读取。
#[derive(Debug, Clone)]
pub struct ReadabilityExtractor {
    min_content_length: usize,
}

impl Default for ReadabilityExtractor {
    fn default() -> Self {
        Self::new(50)
    }
}

impl ReadabilityExtractor {
    pub fn new(min_content_length: usize) -> Self {
        Self { min_content_length }
    }

    /// 同步抽取，供阻塞线程池调用
    ///
    /// # 参数
    ///
    /// * `markup` - 页面HTML
    /// * `url` - 页面地址，用于解析相对链接；缺失时只做 body 回退
    pub fn extract_document(&self, markup: &str, url: Option<&Url>) -> Option<ExtractedContent> {
        let original = Html::parse_document(markup);
        let cleaned = strip_nodes(markup, &NOISE);

        let article = url
            .and_then(|url| main_content(&cleaned.html(), url))
            .filter(|content| char_len(content) >= self.min_content_length);
        let (content, confidence) = match article {
            Some(content) => (content, CONFIDENCE),
            None => (body_text(&cleaned)?, BODY_FALLBACK_CONFIDENCE),
        };

        let result = ExtractedContent {
            title: extract_title(&original),
            content,
            author: extract_author(&original),
            published_date: extract_published_date(&original),
            confidence,
        };
        (result.content_len() >= self.min_content_length).then_some(result)
    }
}

#[async_trait]
impl ContentExtractor for ReadabilityExtractor {
    async fn extract(&self, markup: &str, url: &str) -> Option<ExtractedContent> {
        let extractor = self.clone();
        let markup = markup.to_owned();
        let page_url = match Url::parse(url) {
            Ok(page_url) => Some(page_url),
            Err(e) => {
                tracing::debug!(url, error = %e, "Page address is not absolute, using body text");
                None
            }
        };
        let task = move || extractor.extract_document(&markup, page_url.as_ref());
        match tokio::task::spawn_blocking(task).await {
            Ok(result) => {
                tracing::debug!(url, success = result.is_some(), "Readability extraction finished");
                result
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "Readability extraction task failed");
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "readability"
    }
}

/// readability 选出的正文容器，按段落拼接为纯文本
fn main_content(markup: &str, url: &Url) -> Option<String> {
    let product = match extractor::extract(&mut markup.as_bytes(), url) {
        Ok(product) => product,
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "Readability found no article");
            return None;
        }
    };

    let fragment = Html::parse_fragment(&product.content);
    let paragraphs: Vec<String> = fragment
        .select(&PARAGRAPHS)
        .map(|p| normalize_text(&element_text(p)))
        .filter(|text| !text.is_empty())
        .collect();

    let content = if paragraphs.is_empty() {
        normalize_text(&product.text)
    } else {
        paragraphs.join("\n\n")
    };
    (!content.is_empty()).then_some(content)
}

fn body_text(document: &Html) -> Option<String> {
    let body = document.select(&BODY).next()?;
    let text = normalize_text(&element_text(body));
    (!text.is_empty()).then_some(text)
}

fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .filter_map(|el| el.value().attr("content"))
        .map(normalize_text)
        .find(|v| !v.is_empty())
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .map(|el| normalize_text(&element_text(el)))
        .find(|v| !v.is_empty())
}

fn extract_title(document: &Html) -> String {
    meta_content(document, &OG_TITLE)
        .or_else(|| first_text(document, &TITLE))
        .or_else(|| first_text(document, &H1))
        .unwrap_or_default()
}

fn extract_author(document: &Html) -> Option<String> {
    meta_content(document, &META_AUTHOR).or_else(|| first_text(document, &AUTHOR))
}

fn extract_published_date(document: &Html) -> Option<String> {
    meta_content(document, &META_PUBLISHED).or_else(|| {
        document
            .select(&TIME)
            .filter_map(|el| el.value().attr("datetime"))
            .map(str::trim)
            .find(|v| !v.is_empty())
            .map(str::to_string)
    })
}
