// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含进程级的显式句柄与可选的外部能力：
/// - 页面缓存（page_cache）：带TTL和容量上限的已加载页面缓存
/// - 零样本分类（zero_shot）：远程分类服务，失败时降级
///
/// 句柄在进程启动时构造一次，通过参数传递，不使用全局单例。
pub mod page_cache;
pub mod zero_shot;
