// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use crate::config::settings::Settings;
use crate::domain::models::strategy::{CrawlStrategy, Fetcher, ParserKind};
use crate::domain::services::content_extraction::{
    ContentExtractor, HybridContentExtractor, ReadabilityExtractor, RemoteExtractionService,
};
use crate::engines::api_strategy::ApiStrategy;
use crate::engines::headless_strategy::HeadlessStrategy;
use crate::engines::page_loader::PageLoader;
use crate::engines::page_records::PageRecordBuilder;
use crate::engines::static_strategy::StaticStrategy;
use crate::engines::traits::{EndpointProbe, EngineError, FetchStrategy};

/// 抓取策略工厂
///
/// 进程启动时按配置构造一次，之后按执行计划返回共享的策略实例
#[derive(Clone)]
pub struct StrategyFactory {
    static_strategy: Arc<dyn FetchStrategy>,
    headless_strategy: Arc<dyn FetchStrategy>,
    api_strategy: Arc<dyn FetchStrategy>,
}

impl StrategyFactory {
    pub fn new(
        static_strategy: Arc<dyn FetchStrategy>,
        headless_strategy: Arc<dyn FetchStrategy>,
        api_strategy: Arc<dyn FetchStrategy>,
    ) -> Self {
        Self {
            static_strategy,
            headless_strategy,
            api_strategy,
        }
    }

    /// 根据配置组装全部策略
    ///
    /// # 参数
    ///
    /// * `settings` - 全局配置
    /// * `loader` - 共享的页面加载器
    /// * `probe` - 接口探测器，API策略在没有已知接口时使用
    pub fn from_settings(
        settings: &Settings,
        loader: Arc<PageLoader>,
        probe: Arc<dyn EndpointProbe>,
    ) -> Result<Self, EngineError> {
        let records = PageRecordBuilder::new(
            hybrid_extractor(settings)?,
            settings.extraction.max_plain_text_length,
        );
        let api_client = loader.client().clone();
        let safety_margin = settings.browser.safety_margin();

        Ok(Self::new(
            Arc::new(StaticStrategy::new(loader, records.clone(), safety_margin)),
            Arc::new(HeadlessStrategy::new(settings.browser.clone(), records)),
            Arc::new(ApiStrategy::new(api_client, probe, safety_margin)),
        ))
    }

    /// 按执行计划选择策略：API 解析优先，其余按抓取方式
    pub fn create(&self, strategy: &CrawlStrategy) -> Arc<dyn FetchStrategy> {
        if strategy.parser == ParserKind::Api {
            return self.api_strategy.clone();
        }
        match strategy.fetcher {
            Fetcher::Static => self.static_strategy.clone(),
            Fetcher::Headless => self.headless_strategy.clone(),
        }
    }
}

/// 由配置构造混合正文抽取器，未配置远程服务时只有进程内方法
pub fn hybrid_extractor(settings: &Settings) -> Result<HybridContentExtractor, EngineError> {
    let min_len = settings.extraction.min_content_length;
    let remote = match &settings.extraction.remote_service_url {
        Some(url) => {
            let service = RemoteExtractionService::new(
                url.clone(),
                Duration::from_millis(settings.extraction.remote_timeout_ms),
                min_len,
            )?;
            Some(Arc::new(service) as Arc<dyn ContentExtractor>)
        }
        None => None,
    };

    Ok(HybridContentExtractor::new(
        Arc::new(ReadabilityExtractor::new(min_len)),
        remote,
        settings.scoring.clone(),
        min_len,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::endpoint_detector::NoopEndpointProbe;

    fn factory() -> StrategyFactory {
        let settings = Settings::default();
        let loader = Arc::new(PageLoader::new(&settings.http, None).unwrap());
        StrategyFactory::from_settings(&settings, loader, Arc::new(NoopEndpointProbe)).unwrap()
    }

    #[test]
    fn test_factory_selects_by_fetcher_and_parser() {
        let factory = factory();
        let pick = |fetcher, parser| {
            factory
                .create(&CrawlStrategy::new(fetcher, parser, false))
                .name()
        };

        assert_eq!(pick(Fetcher::Static, ParserKind::List), "static");
        assert_eq!(pick(Fetcher::Static, ParserKind::Detail), "static");
        assert_eq!(pick(Fetcher::Headless, ParserKind::Mixed), "headless");
        assert_eq!(pick(Fetcher::Headless, ParserKind::Api), "api");
    }
}
