// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理HTTP加载、浏览器、内容抽取、评分权重和缓存等配置
pub mod settings;
