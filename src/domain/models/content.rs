// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 常用字段名
pub mod field {
    pub const TITLE: &str = "title";
    pub const DATE: &str = "date";
    pub const AUTHOR: &str = "author";
    pub const DEPARTMENT: &str = "department";
    pub const VIEWS: &str = "views";
    pub const DETAIL_URL: &str = "detailUrl";
    pub const CONTENT: &str = "content";
}

/// 内容块类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockType {
    List,
    Detail,
    Table,
    Text,
}

/// 语义类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SemanticType {
    Notice,
    Recruit,
    Event,
    Unknown,
}

/// 检测到的字段
///
/// `selector` 相对于所属块的定位元素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedField {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// 置信度 [0,1]，仅用于比较，不是概率
    pub confidence: f64,
}

impl DetectedField {
    pub fn new(name: &str, selector: impl Into<String>, confidence: f64) -> Self {
        Self {
            name: name.to_string(),
            selector: Some(selector.into()),
            pattern: None,
            confidence,
        }
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }
}

/// 内容块：页面上重复或单一的结构区域及其字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    pub block_type: BlockType,
    pub semantic_type: SemanticType,
    /// 非空
    pub fields: Vec<DetectedField>,
    /// 选中块内每个元素的CSS选择器
    pub locator: String,
}

impl ContentBlock {
    /// 字段为空时不构造块
    pub fn new(
        block_type: BlockType,
        semantic_type: SemanticType,
        fields: Vec<DetectedField>,
        locator: &str,
    ) -> Option<Self> {
        if fields.is_empty() {
            return None;
        }
        Some(Self {
            block_type,
            semantic_type,
            fields,
            locator: locator.to_string(),
        })
    }

    pub fn field(&self, name: &str) -> Option<&DetectedField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// 从页面中实际抽取的条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedItem {
    pub block_type: BlockType,
    pub semantic_type: SemanticType,
    pub fields: BTreeMap<String, String>,
}

impl ExtractedItem {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// 页面数据模型
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDataModel {
    pub page_url: String,
    pub blocks: Vec<ContentBlock>,
    pub items: Vec<ExtractedItem>,
}
