// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};

use crate::config::settings::HttpSettings;
use crate::domain::models::page::LoadedPage;
use crate::engines::traits::EngineError;
use crate::infrastructure::page_cache::PageCache;
use crate::utils::text_encoding::decode_html;
use crate::utils::url_utils::parse_http_url;

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// HTTP页面加载器
///
/// 两种入口：
/// - [`PageLoader::fetch`]：硬失败，供抓取策略使用，错误原样返回；
/// - [`PageLoader::load`]：软失败，供分析阶段使用，出错时返回空页面。
pub struct PageLoader {
    client: reqwest::Client,
    timeout: Duration,
    cache: Option<Arc<PageCache>>,
}

impl PageLoader {
    /// 创建加载器
    ///
    /// # 参数
    ///
    /// * `settings` - HTTP配置
    /// * `cache` - 可选的页面缓存句柄
    ///
    /// # 返回值
    ///
    /// HTTP客户端无法按配置构建（如 User-Agent 非法）时返回错误
    pub fn new(settings: &HttpSettings, cache: Option<Arc<PageCache>>) -> Result<Self, EngineError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(HTML_ACCEPT));
        if let Ok(value) = HeaderValue::from_str(&settings.accept_language) {
            headers.insert(ACCEPT_LANGUAGE, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            timeout: Duration::from_millis(settings.loader_timeout_ms),
            cache,
        })
    }

    /// 共享的HTTP客户端
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// 抓取页面，非2xx视为错误
    ///
    /// # 参数
    ///
    /// * `url` - 目标URL，仅支持 http/https
    /// * `timeout` - 本次请求的超时
    ///
    /// # 返回值
    ///
    /// * `Ok(LoadedPage)` - 已解码的页面
    /// * `Err(EngineError)` - URL非法、请求失败或状态码非2xx
    pub async fn fetch(&self, url: &str, timeout: Duration) -> Result<LoadedPage, EngineError> {
        let target = parse_http_url(url).map_err(EngineError::InvalidUrl)?;
        let start = Instant::now();

        let response = self.client.get(target).timeout(timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Http {
                status: status.as_u16(),
            });
        }

        let mut response_headers = HashMap::new();
        for (k, v) in response.headers() {
            if let Ok(v_str) = v.to_str() {
                response_headers.insert(k.as_str().to_lowercase(), v_str.to_string());
            }
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await?;
        let raw_markup = decode_html(&bytes, content_type.as_deref());

        Ok(LoadedPage {
            url: url.to_string(),
            raw_markup,
            response_headers,
            status_code: status.as_u16(),
            load_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// 加载初始HTML用于分析
    ///
    /// 任何错误都记录警告并返回空页面，后续分析会得到空信号而不是失败
    pub async fn load(&self, url: &str) -> LoadedPage {
        if let Some(page) = self.cache.as_ref().and_then(|cache| cache.get(url)) {
            tracing::debug!(url, "Page cache hit");
            return page;
        }

        let start = Instant::now();
        match self.fetch(url, self.timeout).await {
            Ok(page) => {
                tracing::info!(
                    url,
                    status = page.status_code,
                    length = page.raw_markup.len(),
                    load_time_ms = page.load_time_ms,
                    "Page loaded"
                );
                if let Some(cache) = &self.cache {
                    cache.put(&page);
                }
                page
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "Failed to load page, continuing with empty markup");
                LoadedPage::empty(url, start.elapsed().as_millis() as u64)
            }
        }
    }
}
