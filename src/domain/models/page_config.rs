// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

use super::page::PageRole;
use super::strategy::{Fetcher, ParserKind};

/// 单个来源的可选配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageConfig {
    pub source_name: Option<String>,
    pub url: Option<String>,
    /// 人工覆盖，存在时跳过自动分类结果
    #[serde(rename = "override", skip_serializing_if = "Option::is_none")]
    pub strategy_override: Option<StrategyOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selectors: Option<CustomSelectors>,
}

impl PageConfig {
    pub fn for_source(source_name: &str) -> Self {
        Self {
            source_name: Some(source_name.to_string()),
            ..Self::default()
        }
    }

    pub fn with_override(mut self, strategy_override: StrategyOverride) -> Self {
        self.strategy_override = Some(strategy_override);
        self
    }

    pub fn with_selectors(mut self, selectors: CustomSelectors) -> Self {
        self.selectors = Some(selectors);
        self
    }
}

/// 策略覆盖，缺失的字段回退到自动计算的值
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrategyOverride {
    pub page_role: Option<PageRole>,
    pub fetcher: Option<Fetcher>,
    pub parser: Option<ParserKind>,
    pub use_readability: Option<bool>,
}

/// 自定义选择器，补充而非替换内置启发式
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomSelectors {
    pub list: Option<String>,
    pub item: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    pub content: Option<String>,
    pub detail_url: Option<String>,
}
