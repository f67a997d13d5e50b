// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// 不可见内容所在的标签
const INVISIBLE_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// 编译固定的CSS选择器
///
/// 仅用于源码中的常量选择器，解析失败属于编程错误
pub fn css(selector: &str) -> Selector {
    Selector::parse(selector).unwrap_or_else(|e| panic!("invalid selector {selector:?}: {e}"))
}

/// 解析运行时传入的选择器（例如来源配置）
pub fn try_css(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(sel) => Some(sel),
        Err(e) => {
            tracing::warn!(selector, error = %e, "Ignoring invalid selector");
            None
        }
    }
}

/// 规范化文本：合并连续空白并去除首尾空白
pub fn normalize_text(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// 按字符截断（而非字节），保证不会切断多字节字符
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// 字符长度
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// 元素的全部文本（包含脚本内容），与 DOM textContent 一致
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// 元素的可见文本，跳过 script/style/noscript 内部文本
pub fn visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        if let Node::Text(text) = node.value() {
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| INVISIBLE_TAGS.contains(&el.name()))
            });
            if !hidden {
                out.push_str(text);
            }
        }
    }
    out
}

/// 元素的 class 属性
pub fn class_attr<'a>(element: ElementRef<'a>) -> &'a str {
    element.value().attr("class").unwrap_or("")
}

/// 下一个兄弟元素
pub fn next_element_sibling(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

/// 父元素
pub fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}

/// 可搜索的作用域
///
/// 统一文档根和单个元素两种查找入口，调用方无需区分
#[derive(Clone, Copy)]
pub enum SearchScope<'a> {
    /// 整个文档
    Document(&'a Html),
    /// 单个元素的后代
    Element(ElementRef<'a>),
}

impl<'a> SearchScope<'a> {
    /// 查找所有匹配元素（文档顺序）
    pub fn find(&self, selector: &Selector) -> Vec<ElementRef<'a>> {
        match self {
            SearchScope::Document(doc) => doc.select(selector).collect(),
            SearchScope::Element(el) => el.select(selector).collect(),
        }
    }

    /// 查找第一个匹配元素
    pub fn first(&self, selector: &Selector) -> Option<ElementRef<'a>> {
        match self {
            SearchScope::Document(doc) => doc.select(selector).next(),
            SearchScope::Element(el) => el.select(selector).next(),
        }
    }
}

/// 删除匹配选择器的所有节点，返回清理后的文档
pub fn strip_nodes(markup: &str, selector: &Selector) -> Html {
    let mut document = Html::parse_document(markup);
    let ids: Vec<_> = document.select(selector).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
    document
}
