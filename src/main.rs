// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use anyhow::Context;
use pagescout::config::settings::Settings;
use pagescout::domain::models::page_config::PageConfig;
use pagescout::engines::collector::DynamicCollector;
use pagescout::infrastructure::page_cache::PageCache;
use pagescout::utils::telemetry;
use tracing::info;

const USAGE: &str = "usage: pagescout [--plan] <url> [source-name]";

/// 主函数
///
/// 对单个URL运行采集管线并把结果以JSON打印到标准输出。
/// `--plan` 只输出页面理解结果，不执行抓取。
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_telemetry();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let plan_only = match args.iter().position(|a| a == "--plan") {
        Some(index) => {
            args.remove(index);
            true
        }
        None => false,
    };
    let mut args = args.into_iter();
    let url = args.next().context(USAGE)?;
    let config = args.next().map(|source| PageConfig::for_source(&source));

    let settings = Settings::new().context("failed to load settings")?;
    let cache = PageCache::from_settings(&settings.cache).map(Arc::new);
    let collector =
        DynamicCollector::new(&settings, cache).context("failed to build collector")?;
    info!(url = %url, plan_only, "Starting pagescout");

    let output = if plan_only {
        let understanding = collector.understand(&url, config.as_ref()).await;
        serde_json::to_string_pretty(&understanding)?
    } else {
        let records = collector.collect_with_retry(&url, config.as_ref()).await?;
        serde_json::to_string_pretty(&records)?
    };
    println!("{output}");
    Ok(())
}
