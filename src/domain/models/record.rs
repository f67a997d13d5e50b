// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

use super::structured::StructuredContent;

/// 交给下游规范化模块的原始记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub title: String,
    pub url: String,
    /// ISO-8601
    pub date: String,
    pub content: RecordContent,
    pub source: String,
}

/// 记录内容：纯文本或结构化对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordContent {
    Text(String),
    Structured(Box<StructuredContent>),
}

impl RecordContent {
    /// 文本形式，结构化内容按 `Display` 渲染
    pub fn as_text(&self) -> String {
        match self {
            RecordContent::Text(text) => text.clone(),
            RecordContent::Structured(structured) => structured.to_string(),
        }
    }
}

impl From<String> for RecordContent {
    fn from(text: String) -> Self {
        RecordContent::Text(text)
    }
}

impl From<StructuredContent> for RecordContent {
    fn from(structured: StructuredContent) -> Self {
        RecordContent::Structured(Box::new(structured))
    }
}
