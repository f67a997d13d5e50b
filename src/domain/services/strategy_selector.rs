// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use tracing::debug;

use crate::domain::models::page::{DataAccessType, PageAnalysis, PageProfile, RenderingType};
use crate::domain::models::page_config::{PageConfig, StrategyOverride};
use crate::domain::models::strategy::{CrawlStrategy, Fetcher, ParserKind};

/// 静态且有意义HTML时启用正文抽取的JS依赖上限
const READABILITY_MAX_JS_SCORE: f64 = 0.3;

/// 策略选择器
///
/// 将分析结果和页面画像映射为执行计划
pub struct StrategySelector;

impl StrategySelector {
    /// 选择执行计划
    ///
    /// # 参数
    ///
    /// * `analysis` - 页面分析结果
    /// * `profile` - 页面画像
    /// * `config` - 来源配置，存在 `override` 时完全替换自动计算的抓取/解析方式
    ///
    /// # 返回值
    ///
    /// 不可变的执行计划，重试与超时由最终抓取方式决定
    pub fn select(
        analysis: &PageAnalysis,
        profile: &PageProfile,
        config: Option<&PageConfig>,
    ) -> CrawlStrategy {
        if let Some(ov) = config.and_then(|c| c.strategy_override.as_ref()) {
            return Self::from_override(profile, ov);
        }

        let (fetcher, mut parser) = Self::decision_table(analysis, profile);
        let role = profile.page_role;
        let mut use_readability = false;

        if role.is_list() {
            parser = ParserKind::List;
        } else if role.is_detail() {
            parser = ParserKind::Detail;
            use_readability = true;
        }

        if !use_readability {
            use_readability = role.is_detail()
                || (analysis.has_meaningful_html
                    && analysis.js_dependency_score < READABILITY_MAX_JS_SCORE);
        }

        let strategy = CrawlStrategy::new(fetcher, parser, use_readability);
        debug!(
            fetcher = ?strategy.fetcher,
            parser = ?strategy.parser,
            use_readability = strategy.use_readability,
            "Strategy selected"
        );
        strategy
    }

    /// 决策表，首个命中的条件生效
    fn decision_table(analysis: &PageAnalysis, profile: &PageProfile) -> (Fetcher, ParserKind) {
        match (profile.rendering_type, profile.data_access_type) {
            (RenderingType::Static, DataAccessType::Html) => (Fetcher::Static, ParserKind::List),
            (RenderingType::Csr, _) => (Fetcher::Headless, ParserKind::List),
            (_, DataAccessType::Xhr) if !analysis.detected_endpoints.is_empty() => {
                (Fetcher::Headless, ParserKind::Api)
            }
            (_, DataAccessType::Mixed) => (Fetcher::Headless, ParserKind::Mixed),
            _ => (Fetcher::Static, ParserKind::List),
        }
    }

    /// 覆盖分支：缺失字段回退到计算值
    fn from_override(profile: &PageProfile, ov: &StrategyOverride) -> CrawlStrategy {
        let role = ov.page_role.unwrap_or(profile.page_role);
        let fetcher = ov.fetcher.unwrap_or(match profile.rendering_type {
            RenderingType::Csr => Fetcher::Headless,
            RenderingType::Static => Fetcher::Static,
        });
        let parser = ov.parser.unwrap_or(if role.is_list() {
            ParserKind::List
        } else {
            ParserKind::Detail
        });
        let use_readability = ov.use_readability.unwrap_or(parser == ParserKind::Detail);

        debug!(?fetcher, ?parser, use_readability, "Strategy taken from override");
        CrawlStrategy::new(fetcher, parser, use_readability)
    }
}
