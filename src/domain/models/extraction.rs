// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 单一抽取方法的结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedContent {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_date: Option<String>,
    /// 方法自身给出的置信度
    #[serde(default)]
    pub confidence: f64,
}

impl ExtractedContent {
    /// 去除首尾空白后的正文字符数
    pub fn content_len(&self) -> usize {
        self.content.trim().chars().count()
    }

    pub fn title_len(&self) -> usize {
        self.title.trim().chars().count()
    }
}

/// 抽取方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    /// 进程内的 DOM 启发式抽取
    Readability,
    /// 远程抽取服务
    Remote,
    /// 两种方法都成功，经仲裁后合并
    Hybrid,
}

/// 仲裁后的最佳正文
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestContent {
    pub title: String,
    pub content: String,
    pub author: Option<String>,
    pub published_date: Option<String>,
    pub method: ExtractionMethod,
    pub confidence: f64,
}
