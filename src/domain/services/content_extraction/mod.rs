// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 整页正文抽取
//!
//! 两种相互独立的抽取方法并发执行，再按长度与标题质量仲裁：
//! 进程内的 DOM 启发式抽取 ([`ReadabilityExtractor`]) 与可选的远程抽取服务
//! ([`RemoteExtractionService`])。任一方法失败都视为缺席，不会向上传播错误。

pub mod hybrid;
pub mod readability;
pub mod remote;

use async_trait::async_trait;

use crate::domain::models::extraction::ExtractedContent;

pub use hybrid::{arbitrate, HybridContentExtractor};
pub use readability::ReadabilityExtractor;
pub use remote::RemoteExtractionService;

/// 整页正文抽取方法
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// 从整页HTML中抽取正文
    ///
    /// # 参数
    ///
    /// * `markup` - 页面HTML
    /// * `url` - 页面地址，用于日志及远程服务
    ///
    /// # 返回值
    ///
    /// 抽取失败或正文过短时返回 `None`
    async fn extract(&self, markup: &str, url: &str) -> Option<ExtractedContent>;

    /// 方法名称
    fn name(&self) -> &'static str;
}
