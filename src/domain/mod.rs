// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含页面理解的核心逻辑，包括：
/// - 领域模型（models）：页面、内容块、策略与记录等值对象
/// - 服务（services）：信号分析、分类、内容块检测与正文抽取
///
/// 领域层不依赖浏览器或网络实现，所有 I/O 都在 engines 层完成。
pub mod models;
pub mod services;
