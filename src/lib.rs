// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 分层加载默认值、配置文件与环境变量
pub mod config;

/// 领域模块
///
/// 页面理解相关的值对象与纯分析服务
pub mod domain;

/// 引擎模块
///
/// 页面加载、浏览器会话、抓取策略与采集管线
pub mod engines;

/// 基础设施模块
///
/// 页面缓存与可选的外部分类服务
pub mod infrastructure;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

pub use engines::collector::{DynamicCollector, PageUnderstanding};
pub use engines::traits::EngineError;
