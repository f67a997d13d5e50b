// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::Html;

use crate::config::settings::ScoringSettings;
use crate::domain::models::page::{
    DataAccessType, DetectedEndpoint, HtmlSignals, PageAnalysis, RenderingType,
};
use crate::utils::html::{css, element_text};

/// 已知的全局状态注入标记
const INLINE_DATA_MARKERS: [&str; 4] = [
    "window.__DATA__",
    "__INITIAL_STATE__",
    "__NEXT_DATA__",
    "window.__INITIAL_DATA__",
];

/// 判断是否需要执行JS的阈值
const JS_REQUIRED_THRESHOLD: f64 = 0.5;

/// 结构信号分析器
///
/// 纯函数式分析，不做任何 I/O
#[derive(Debug, Clone, Default)]
pub struct SignalAnalyzer {
    scoring: ScoringSettings,
}

impl SignalAnalyzer {
    pub fn new(scoring: ScoringSettings) -> Self {
        Self { scoring }
    }

    /// 从原始HTML计算结构信号
    ///
    /// # 参数
    ///
    /// * `markup` - 初始HTML
    ///
    /// # 返回值
    ///
    /// 结构信号，`content_length` 为原始HTML的 `char` 数（非UTF-16码元）
    pub fn analyze(&self, markup: &str) -> HtmlSignals {
        let document = Html::parse_document(markup);
        let body_text_len = document
            .select(&css("body"))
            .next()
            .map(|body| element_text(body).trim().chars().count())
            .unwrap_or(0);
        let has_noscript = document.select(&css("noscript")).next().is_some();

        HtmlSignals {
            script_count: document.select(&css("script")).count(),
            inline_data_presence: INLINE_DATA_MARKERS.iter().any(|m| markup.contains(m)),
            noscript_only: has_noscript && body_text_len < 100,
            content_length: markup.chars().count(),
            has_table: document.select(&css("tbody tr")).count() > 3,
            has_article: document.select(&css("article")).count() > 1,
        }
    }

    /// JS依赖评分，结果总在 [0,1] 内
    pub fn score(&self, signals: &HtmlSignals) -> f64 {
        let mut score = 0.0;
        if signals.script_count > self.scoring.script_count_threshold {
            score += self.scoring.script_bonus;
        }
        if signals.content_length < self.scoring.short_content_threshold {
            score += self.scoring.short_content_bonus;
        }
        if signals.inline_data_presence {
            score -= self.scoring.inline_data_penalty;
        }
        score.clamp(0.0, 1.0)
    }

    pub fn has_meaningful_html(signals: &HtmlSignals) -> bool {
        signals.content_length > 2000 && (signals.has_table || signals.has_article)
    }

    pub fn requires_js(score: f64) -> bool {
        score > JS_REQUIRED_THRESHOLD
    }

    pub fn rendering_type(score: f64) -> RenderingType {
        if score > JS_REQUIRED_THRESHOLD {
            RenderingType::Csr
        } else {
            RenderingType::Static
        }
    }

    /// 在已有信号和探测结果上组装分析结果
    pub fn build_analysis(
        &self,
        html_signals: HtmlSignals,
        detected_endpoints: Vec<DetectedEndpoint>,
    ) -> PageAnalysis {
        let score = self.score(&html_signals);
        let has_meaningful_html = Self::has_meaningful_html(&html_signals);
        PageAnalysis {
            has_meaningful_html,
            requires_js_execution: Self::requires_js(score),
            js_dependency_score: score,
            data_access_type: DataAccessType::derive(
                !detected_endpoints.is_empty(),
                has_meaningful_html,
            ),
            rendering_type: Self::rendering_type(score),
            html_signals,
            detected_endpoints,
        }
    }
}
