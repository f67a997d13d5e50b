// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::content::SemanticType;

/// 已加载页面
///
/// 每次采集尝试创建一次，分析结束后丢弃
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedPage {
    /// 请求的URL
    pub url: String,
    /// 初始HTML
    pub raw_markup: String,
    /// 响应头（小写键）
    pub response_headers: HashMap<String, String>,
    /// HTTP状态码，加载失败时为0
    pub status_code: u16,
    /// 加载耗时（毫秒）
    pub load_time_ms: u64,
}

impl LoadedPage {
    /// 加载失败时使用的空页面
    pub fn empty(url: &str, load_time_ms: u64) -> Self {
        Self {
            url: url.to_string(),
            raw_markup: String::new(),
            response_headers: HashMap::new(),
            status_code: 0,
            load_time_ms,
        }
    }
}

/// 从原始HTML计算出的结构信号
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlSignals {
    pub script_count: usize,
    /// 是否包含全局状态注入标记（如 `__NEXT_DATA__`）
    pub inline_data_presence: bool,
    /// 存在 noscript 且正文可见文本少于100字符
    pub noscript_only: bool,
    /// 原始HTML长度，按 Unicode 标量值（`char`）计数。
    /// 不是字节数，也不是 UTF-16 码元数：补充平面字符（如 emoji）记为 1。
    pub content_length: usize,
    pub has_table: bool,
    pub has_article: bool,
}

/// 浏览器探测到的JSON接口
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedEndpoint {
    pub url: String,
    pub method: String,
    pub content_type: String,
}

/// 数据获取方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataAccessType {
    Html,
    Xhr,
    Mixed,
}

impl DataAccessType {
    /// 根据接口与HTML情况推导数据获取方式
    pub fn derive(has_endpoints: bool, has_meaningful_html: bool) -> Self {
        match (has_endpoints, has_meaningful_html) {
            (true, true) => DataAccessType::Mixed,
            (true, false) => DataAccessType::Xhr,
            (false, _) => DataAccessType::Html,
        }
    }
}

/// 渲染方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RenderingType {
    Static,
    Csr,
}

/// 页面分析结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAnalysis {
    pub has_meaningful_html: bool,
    pub html_signals: HtmlSignals,
    pub requires_js_execution: bool,
    /// JS依赖评分，范围 [0,1]
    pub js_dependency_score: f64,
    pub detected_endpoints: Vec<DetectedEndpoint>,
    pub data_access_type: DataAccessType,
    pub rendering_type: RenderingType,
}

/// 页面角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageRole {
    ListNotice,
    DetailNotice,
    ListRecruit,
    DetailRecruit,
    ListEvent,
    DetailEvent,
    StaticPage,
    Unknown,
}

impl PageRole {
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            PageRole::ListNotice | PageRole::ListRecruit | PageRole::ListEvent
        )
    }

    pub fn is_detail(&self) -> bool {
        matches!(
            self,
            PageRole::DetailNotice | PageRole::DetailRecruit | PageRole::DetailEvent
        )
    }

    /// 角色对应的语义类型
    pub fn semantic_type(&self) -> SemanticType {
        match self {
            PageRole::ListNotice | PageRole::DetailNotice => SemanticType::Notice,
            PageRole::ListRecruit | PageRole::DetailRecruit => SemanticType::Recruit,
            PageRole::ListEvent | PageRole::DetailEvent => SemanticType::Event,
            PageRole::StaticPage | PageRole::Unknown => SemanticType::Unknown,
        }
    }

    /// 按语义类型和列表/详情构造角色
    pub fn for_semantic(semantic: SemanticType, is_list: bool) -> Self {
        match (semantic, is_list) {
            (SemanticType::Notice, true) => PageRole::ListNotice,
            (SemanticType::Notice, false) => PageRole::DetailNotice,
            (SemanticType::Recruit, true) => PageRole::ListRecruit,
            (SemanticType::Recruit, false) => PageRole::DetailRecruit,
            (SemanticType::Event, true) => PageRole::ListEvent,
            (SemanticType::Event, false) => PageRole::DetailEvent,
            (SemanticType::Unknown, _) => PageRole::StaticPage,
        }
    }
}

/// 页面画像，每个URL每次运行只推导一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageProfile {
    pub rendering_type: RenderingType,
    pub data_access_type: DataAccessType,
    pub page_role: PageRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_access_type_derivation() {
        assert_eq!(DataAccessType::derive(false, true), DataAccessType::Html);
        assert_eq!(DataAccessType::derive(false, false), DataAccessType::Html);
        assert_eq!(DataAccessType::derive(true, false), DataAccessType::Xhr);
        assert_eq!(DataAccessType::derive(true, true), DataAccessType::Mixed);
    }

    #[test]
    fn test_page_role_wire_format() {
        assert_eq!(
            serde_json::to_string(&PageRole::DetailNotice).unwrap(),
            "\"DETAIL_NOTICE\""
        );
        let role: PageRole = serde_json::from_str("\"LIST_RECRUIT\"").unwrap();
        assert!(role.is_list());
        assert_eq!(role.semantic_type(), SemanticType::Recruit);
    }

    #[test]
    fn test_role_for_semantic() {
        assert_eq!(
            PageRole::for_semantic(SemanticType::Event, false),
            PageRole::DetailEvent
        );
        assert_eq!(
            PageRole::for_semantic(SemanticType::Unknown, true),
            PageRole::StaticPage
        );
    }
}
