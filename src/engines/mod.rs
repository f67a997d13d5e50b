// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 抓取引擎
//!
//! 页面加载、无头浏览器会话、接口探测、三种抓取策略以及通用采集管线。

pub mod api_strategy;
pub mod browser;
pub mod collector;
pub mod endpoint_detector;
pub mod headless_strategy;
pub mod page_loader;
pub mod page_records;
pub mod static_strategy;
pub mod strategy_factory;
pub mod traits;
