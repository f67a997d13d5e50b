// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了页面理解流程中的值对象，包括：
/// - 页面（page）：加载结果、结构信号、分析结果与页面画像
/// - 内容（content）：内容块、字段与抽取条目
/// - 策略（strategy）：抓取与解析的执行计划
/// - 来源配置（page_config）：人工覆盖与自定义选择器
/// - 结构化内容（structured）：导航、头部、主内容等区域
/// - 正文抽取（extraction）：单一方法与仲裁后的正文
/// - 原始记录（record）：交给下游的记录
///
/// 所有模型都只在单次采集尝试内创建和消费，不跨请求共享。
pub mod content;
pub mod extraction;
pub mod page;
pub mod page_config;
pub mod record;
pub mod strategy;
pub mod structured;
