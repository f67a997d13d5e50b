// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use scraper::Html;
use serde::Serialize;

use crate::config::settings::{ScoringSettings, Settings};
use crate::domain::models::content::{field, PageDataModel};
use crate::domain::models::page::{LoadedPage, PageAnalysis, PageProfile, PageRole};
use crate::domain::models::page_config::PageConfig;
use crate::domain::models::record::{RawRecord, RecordContent};
use crate::domain::models::strategy::CrawlStrategy;
use crate::domain::services::block_detector::BlockDetector;
use crate::domain::services::model_builder::ModelBuilder;
use crate::domain::services::page_classifier::PageClassifier;
use crate::domain::services::quality::mean_quality;
use crate::domain::services::signal_analyzer::SignalAnalyzer;
use crate::domain::services::strategy_selector::StrategySelector;
use crate::engines::endpoint_detector::BrowserEndpointDetector;
use crate::engines::page_loader::PageLoader;
use crate::engines::strategy_factory::StrategyFactory;
use crate::engines::traits::{EndpointProbe, EngineError, ExecutionContext, FetchOptions};
use crate::infrastructure::page_cache::PageCache;
use crate::infrastructure::zero_shot::{HttpZeroShotClassifier, ZeroShotClassifier, CATEGORIES};
use crate::utils::date_utils::to_iso8601_or_now;
use crate::utils::html::{css, normalize_text, truncate_chars, visible_text};
use crate::utils::retry_policy::RetryPolicy;

const UNTITLED: &str = "Untitled";
/// 发送给分类服务的文本上限
const CLASSIFY_TEXT_LIMIT: usize = 1000;

/// 单个URL的理解结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageUnderstanding {
    pub analysis: PageAnalysis,
    pub profile: PageProfile,
    pub model: PageDataModel,
    #[serde(skip)]
    pub strategy: CrawlStrategy,
}

/// 通用采集管线
///
/// 加载 → 信号分析 →（按需）接口探测 → 分类 → 内容块/模型 → 策略选择 → 抓取，
/// 最后把策略记录与模型记录拼接。每次调用相互独立，不保存跨URL的可变状态。
pub struct DynamicCollector {
    loader: Arc<PageLoader>,
    analyzer: SignalAnalyzer,
    probe: Arc<dyn EndpointProbe>,
    classifier: Option<Arc<dyn ZeroShotClassifier>>,
    factory: StrategyFactory,
    scoring: ScoringSettings,
    probe_timeout: Duration,
    /// 覆盖执行计划自带的重试策略
    retry_policy: Option<RetryPolicy>,
}

impl DynamicCollector {
    /// 按配置构造全部组件
    ///
    /// # 参数
    ///
    /// * `settings` - 全局配置
    /// * `cache` - 可选的页面缓存句柄
    ///
    /// # 返回值
    ///
    /// 任一HTTP客户端无法按配置构建时返回错误
    pub fn new(settings: &Settings, cache: Option<Arc<PageCache>>) -> Result<Self, EngineError> {
        let loader = Arc::new(PageLoader::new(&settings.http, cache)?);
        let probe: Arc<dyn EndpointProbe> =
            Arc::new(BrowserEndpointDetector::new(settings.browser.clone()));
        let factory = StrategyFactory::from_settings(settings, loader.clone(), probe.clone())?;
        let classifier = HttpZeroShotClassifier::from_settings(&settings.classification)?
            .map(|c| Arc::new(c) as Arc<dyn ZeroShotClassifier>);

        Ok(Self {
            loader,
            analyzer: SignalAnalyzer::new(settings.scoring.clone()),
            probe,
            classifier,
            factory,
            scoring: settings.scoring.clone(),
            probe_timeout: settings.browser.probe_timeout(),
            retry_policy: None,
        })
    }

    /// 替换接口探测器（同时用于分析阶段）
    pub fn with_probe(mut self, probe: Arc<dyn EndpointProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_factory(mut self, factory: StrategyFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ZeroShotClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = Some(retry_policy);
        self
    }

    /// 分析页面并给出执行计划，不执行抓取
    pub async fn understand(&self, url: &str, config: Option<&PageConfig>) -> PageUnderstanding {
        let page = self.loader.load(url).await;
        self.understand_page(&page, config).await
    }

    async fn understand_page(
        &self,
        page: &LoadedPage,
        config: Option<&PageConfig>,
    ) -> PageUnderstanding {
        let url = page.url.as_str();
        let markup = page.raw_markup.as_str();

        let signals = self.analyzer.analyze(markup);
        let score = self.analyzer.score(&signals);
        let endpoints = if SignalAnalyzer::requires_js(score) {
            self.probe.detect(url, self.probe_timeout).await
        } else {
            Vec::new()
        };
        let analysis = self.analyzer.build_analysis(signals, endpoints);

        let mut profile = PageClassifier::classify(url, markup, &analysis);
        match config.and_then(|c| c.strategy_override.as_ref()) {
            Some(ov) => {
                if let Some(role) = ov.page_role {
                    profile.page_role = role;
                }
            }
            None if profile.page_role == PageRole::StaticPage => {
                if let Some(role) = self.classify_remotely(markup).await {
                    tracing::debug!(url, role = ?role, "Page role refined by zero-shot classification");
                    profile.page_role = role;
                }
            }
            None => {}
        }

        let blocks = BlockDetector::detect(
            markup,
            profile.page_role,
            config.and_then(|c| c.selectors.as_ref()),
        );
        let model = ModelBuilder::build(markup, blocks, url);
        let strategy = StrategySelector::select(&analysis, &profile, config);

        tracing::info!(
            url,
            rendering_type = ?profile.rendering_type,
            data_access_type = ?profile.data_access_type,
            page_role = ?profile.page_role,
            fetcher = ?strategy.fetcher,
            parser = ?strategy.parser,
            items = model.items.len(),
            "Page analysis completed"
        );

        PageUnderstanding {
            analysis,
            profile,
            model,
            strategy,
        }
    }

    async fn classify_remotely(&self, markup: &str) -> Option<PageRole> {
        let classifier = self.classifier.as_ref()?;
        let text = classification_text(markup);
        if text.is_empty() {
            return None;
        }
        classifier
            .classify(&text, &CATEGORIES)
            .await
            .and_then(|label| label.confident_role())
    }

    /// 执行一次完整的采集尝试
    ///
    /// # 参数
    ///
    /// * `url` - 目标URL
    /// * `config` - 来源配置
    /// * `ctx` - 执行上下文
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<RawRecord>)` - 策略记录在前，模型记录在后；可以为空
    /// * `Err(EngineError)` - 抓取策略的硬失败
    pub async fn collect_once(
        &self,
        url: &str,
        config: Option<&PageConfig>,
        ctx: &ExecutionContext,
    ) -> Result<Vec<RawRecord>, EngineError> {
        self.attempt(url, config, ctx).await.1
    }

    /// 单次尝试，同时返回本次执行计划的重试策略
    async fn attempt(
        &self,
        url: &str,
        config: Option<&PageConfig>,
        ctx: &ExecutionContext,
    ) -> (RetryPolicy, Result<Vec<RawRecord>, EngineError>) {
        let understanding = self.understand(url, config).await;
        let strategy = &understanding.strategy;

        let fetcher = self.factory.create(strategy);
        let options = FetchOptions::new(strategy.timeout, strategy.use_readability)
            .with_endpoints(understanding.analysis.detected_endpoints.clone());
        let mut records = match fetcher.fetch(url, ctx, &options).await {
            Ok(records) => records,
            Err(e) => return (strategy.retry_policy.clone(), Err(e)),
        };
        let strategy_count = records.len();

        records.extend(model_to_records(&understanding.model, &ctx.source));

        tracing::info!(
            url,
            source = %ctx.source,
            strategy = fetcher.name(),
            count = records.len(),
            strategy_items = strategy_count,
            model_items = records.len() - strategy_count,
            mean_quality = mean_quality(&records, &self.scoring),
            "Collection finished"
        );
        (strategy.retry_policy.clone(), Ok(records))
    }

    /// 带重试的采集
    ///
    /// 每次重试都从头执行整个管线，不保留上次尝试的中间结果。
    /// 重试次数与退避取自本次执行计划（或 [`Self::with_retry_policy`] 的覆盖），
    /// 只有 [`EngineError::is_retryable`] 的错误会重试。
    pub async fn collect_with_retry(
        &self,
        url: &str,
        config: Option<&PageConfig>,
    ) -> Result<Vec<RawRecord>, EngineError> {
        let source = config
            .and_then(|c| c.source_name.clone())
            .unwrap_or_else(|| url.to_string());
        let ctx = ExecutionContext::new(source);

        let mut retries = 0;
        loop {
            let (plan_policy, result) = self.attempt(url, config, &ctx).await;
            let policy = self.retry_policy.as_ref().unwrap_or(&plan_policy);
            match result {
                Ok(records) => return Ok(records),
                Err(e) if policy.should_retry_error(retries, &e) => {
                    retries += 1;
                    let delay = policy.calculate_backoff(retries);
                    tracing::warn!(
                        url,
                        attempt = retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Collection failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::warn!(url, retries, error = %e, "Collection failed");
                    return Err(e);
                }
            }
        }
    }
}

/// 分类用文本：标题加正文可见文本
fn classification_text(markup: &str) -> String {
    let document = Html::parse_document(markup);
    let title = document
        .select(&css("title"))
        .next()
        .map(visible_text)
        .unwrap_or_default();
    let body = document
        .select(&css("body"))
        .next()
        .map(visible_text)
        .unwrap_or_default();
    truncate_chars(&normalize_text(&format!("{title} {body}")), CLASSIFY_TEXT_LIMIT)
}

/// 把模型条目转换为记录
fn model_to_records(model: &PageDataModel, source: &str) -> Vec<RawRecord> {
    model
        .items
        .iter()
        .map(|item| RawRecord {
            title: item.get(field::TITLE).unwrap_or(UNTITLED).to_string(),
            url: item
                .get(field::DETAIL_URL)
                .unwrap_or(&model.page_url)
                .to_string(),
            date: to_iso8601_or_now(item.get(field::DATE)),
            content: RecordContent::Text(item_summary(item)),
            source: source.to_string(),
        })
        .collect()
}

fn item_summary(item: &crate::domain::models::content::ExtractedItem) -> String {
    let mut lines = Vec::new();
    for (label, name) in [
        ("Author", field::AUTHOR),
        ("Date", field::DATE),
        ("Department", field::DEPARTMENT),
        ("Views", field::VIEWS),
    ] {
        if let Some(value) = item.get(name) {
            lines.push(format!("{label}: {value}"));
        }
    }
    if let Some(content) = item.get(field::CONTENT) {
        lines.push(content.to_string());
    } else if let Some(title) = item.get(field::TITLE) {
        lines.push(title.to_string());
    }
    lines.join("\n")
}
