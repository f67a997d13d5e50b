// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
/// 包括日志初始化、文本解码、重试策略、URL与日期处理等
pub mod date_utils;
pub mod html;
pub mod retry_policy;
pub mod telemetry;
pub mod text_encoding;
pub mod timeouts;
pub mod url_utils;
