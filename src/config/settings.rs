// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 每个分组都有默认值，库在没有配置文件时也可直接使用
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP 加载配置
    pub http: HttpSettings,
    /// 无头浏览器配置
    pub browser: BrowserSettings,
    /// 内容抽取配置
    pub extraction: ExtractionSettings,
    /// 零样本分类配置
    pub classification: ClassificationSettings,
    /// 启发式评分权重
    pub scoring: ScoringSettings,
    /// 页面缓存配置
    pub cache: CacheSettings,
}

/// HTTP 加载配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// 请求使用的 User-Agent
    pub user_agent: String,
    /// Accept-Language 请求头
    pub accept_language: String,
    /// 初始页面加载超时（毫秒）
    pub loader_timeout_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            accept_language: "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
            loader_timeout_ms: 8000,
        }
    }
}

/// 无头浏览器配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// 远程调试地址，设置后连接已有浏览器而非启动新进程
    pub remote_debugging_url: Option<String>,
    /// 导航完成后的额外等待时间（毫秒）
    pub settle_delay_ms: u64,
    /// 接口探测的总超时（毫秒）
    pub probe_timeout_ms: u64,
    /// 内部调用相对外部预算的安全余量（毫秒）
    pub safety_margin_ms: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            remote_debugging_url: None,
            settle_delay_ms: 2000,
            probe_timeout_ms: 10_000,
            safety_margin_ms: 5000,
        }
    }
}

impl BrowserSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn safety_margin(&self) -> Duration {
        Duration::from_millis(self.safety_margin_ms)
    }
}

/// 内容抽取配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// 远程抽取服务地址，未设置时远程结果视为缺失
    pub remote_service_url: Option<String>,
    /// 远程抽取超时（毫秒）
    pub remote_timeout_ms: u64,
    /// 有效正文的最小长度
    pub min_content_length: usize,
    /// 纯文本回退的最大长度
    pub max_plain_text_length: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            remote_service_url: None,
            remote_timeout_ms: 10_000,
            min_content_length: 50,
            max_plain_text_length: 5000,
        }
    }
}

/// 零样本分类配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassificationSettings {
    /// 分类服务地址，未设置时不调用
    pub zero_shot_url: Option<String>,
    /// 分类请求超时（毫秒）
    pub zero_shot_timeout_ms: u64,
}

impl Default for ClassificationSettings {
    fn default() -> Self {
        Self {
            zero_shot_url: None,
            zero_shot_timeout_ms: 5000,
        }
    }
}

/// 启发式评分权重
///
/// 这些常量来自经验，均可通过配置覆盖
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    pub script_bonus: f64,
    pub short_content_bonus: f64,
    pub inline_data_penalty: f64,
    pub script_count_threshold: usize,
    pub short_content_threshold: usize,
    /// 本地抽取结果较短时的置信度折扣
    pub readability_discount: f64,
    pub remote_long_score: f64,
    pub remote_short_score: f64,
    /// 仲裁时要求的长度比例
    pub length_ratio: f64,
    pub long_content_threshold: usize,
    pub quality_title_weight: f64,
    pub quality_url_weight: f64,
    pub quality_date_weight: f64,
    pub quality_content_weight: f64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            script_bonus: 0.4,
            short_content_bonus: 0.4,
            inline_data_penalty: 0.2,
            script_count_threshold: 10,
            short_content_threshold: 5000,
            readability_discount: 0.7,
            remote_long_score: 0.85,
            remote_short_score: 0.7,
            length_ratio: 0.8,
            long_content_threshold: 200,
            quality_title_weight: 0.3,
            quality_url_weight: 0.2,
            quality_date_weight: 0.2,
            quality_content_weight: 0.3,
        }
    }
}

/// 页面缓存配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// 是否启用缓存
    pub enabled: bool,
    /// 条目存活时间（秒）
    pub ttl_secs: u64,
    /// 最大条目数
    pub max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_secs: 300,
            max_entries: 256,
        }
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载 `config/default`、`config/{APP_ENVIRONMENT}` 和 `PAGESCOUT__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("PAGESCOUT").separator("__"));

        builder.build()?.try_deserialize()
    }
}
