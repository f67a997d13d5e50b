// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use super::ContentExtractor;
use crate::config::settings::ScoringSettings;
use crate::domain::models::extraction::{BestContent, ExtractedContent, ExtractionMethod};

const UNTITLED: &str = "Untitled";
/// 被认为有意义的标题最短长度（不含）
const MIN_TITLE_LEN: usize = 5;

/// 混合正文抽取器
///
/// 进程内抽取与远程服务并发执行（恰好两个任务），再由 [`arbitrate`] 选出结果。
/// 未配置远程服务时远程一侧总是缺席。
#[derive(Clone)]
pub struct HybridContentExtractor {
    readability: Arc<dyn ContentExtractor>,
    remote: Option<Arc<dyn ContentExtractor>>,
    scoring: ScoringSettings,
    min_content_length: usize,
}

impl HybridContentExtractor {
    pub fn new(
        readability: Arc<dyn ContentExtractor>,
        remote: Option<Arc<dyn ContentExtractor>>,
        scoring: ScoringSettings,
        min_content_length: usize,
    ) -> Self {
        Self {
            readability,
            remote,
            scoring,
            min_content_length,
        }
    }

    /// 并发执行两种抽取方法并仲裁
    ///
    /// # 参数
    ///
    /// * `markup` - 页面HTML
    /// * `url` - 页面地址
    /// * `time_limit` - 两种方法各自的时间上限，超时的一方视为缺席
    ///
    /// # 返回值
    ///
    /// 两种方法都失败，或胜出结果正文不足最短长度时返回 `None`
    pub async fn extract(&self, markup: &str, url: &str, time_limit: Duration) -> Option<BestContent> {
        tracing::debug!(url, ?time_limit, "Starting hybrid content extraction");

        let primary = within(time_limit, self.readability.as_ref(), markup, url);
        let secondary = async {
            match &self.remote {
                Some(remote) => within(time_limit, remote.as_ref(), markup, url).await,
                None => None,
            }
        };
        let (primary, secondary) = tokio::join!(primary, secondary);

        tracing::debug!(
            url,
            readability_success = primary.is_some(),
            remote_success = secondary.is_some(),
            readability_length = primary.as_ref().map_or(0, ExtractedContent::content_len),
            remote_length = secondary.as_ref().map_or(0, ExtractedContent::content_len),
            "Hybrid extraction results"
        );

        let best = arbitrate(primary, secondary, &self.scoring, self.min_content_length);
        if let Some(best) = &best {
            tracing::info!(url, method = ?best.method, confidence = best.confidence, "Selected best content");
        }
        best
    }
}

async fn within(
    time_limit: Duration,
    extractor: &dyn ContentExtractor,
    markup: &str,
    url: &str,
) -> Option<ExtractedContent> {
    match tokio::time::timeout(time_limit, extractor.extract(markup, url)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(url, method = extractor.name(), ?time_limit, "Content extraction timed out");
            None
        }
    }
}

/// 仲裁两种方法的结果
///
/// - 只有一方成功时直接采用；
/// - 双方都成功时按调整后的分数、长度比例和标题长度选择，默认偏向进程内结果；
/// - 胜出方缺失的作者和发布日期可由另一方补齐。
///
/// # 参数
///
/// * `readability` - 进程内抽取结果
/// * `remote` - 远程服务抽取结果
/// * `scoring` - 仲裁权重
/// * `min_content_length` - 正文最短长度
pub fn arbitrate(
    readability: Option<ExtractedContent>,
    remote: Option<ExtractedContent>,
    scoring: &ScoringSettings,
    min_content_length: usize,
) -> Option<BestContent> {
    let usable = |c: &ExtractedContent| c.content_len() >= min_content_length;
    let readability = readability.filter(usable);
    let remote = remote.filter(usable);

    let best = match (readability, remote) {
        (None, None) => return None,
        (Some(r), None) => {
            let confidence = r.confidence;
            finish(r, None, ExtractionMethod::Readability, confidence)
        }
        (None, Some(m)) => {
            let confidence = remote_score(&m, scoring);
            finish(m, None, ExtractionMethod::Remote, confidence)
        }
        (Some(r), Some(m)) => {
            let r_score = readability_score(&r, scoring);
            let m_score = remote_score(&m, scoring);
            let (r_len, m_len) = (r.content_len() as f64, m.content_len() as f64);

            let readability_better =
                r_len >= m_len * scoring.length_ratio && r.title_len() > MIN_TITLE_LEN;
            let remote_better =
                m_len >= r_len * scoring.length_ratio && m.title_len() > MIN_TITLE_LEN;

            if readability_better && r_score >= m_score {
                finish(r, Some(m), ExtractionMethod::Hybrid, r_score.max(m_score))
            } else if remote_better {
                finish(m, Some(r), ExtractionMethod::Hybrid, r_score.max(m_score))
            } else {
                finish(r, Some(m), ExtractionMethod::Hybrid, r_score)
            }
        }
    };

    (best.content.trim().chars().count() >= min_content_length).then_some(best)
}

/// 进程内结果的调整分数：正文不够长时打折
fn readability_score(content: &ExtractedContent, scoring: &ScoringSettings) -> f64 {
    if content.content_len() > scoring.long_content_threshold {
        content.confidence
    } else {
        content.confidence * scoring.readability_discount
    }
}

fn remote_score(content: &ExtractedContent, scoring: &ScoringSettings) -> f64 {
    if content.content_len() > scoring.long_content_threshold {
        scoring.remote_long_score
    } else {
        scoring.remote_short_score
    }
}

/// 组装最终结果，并用另一方补齐缺失的元数据
fn finish(
    chosen: ExtractedContent,
    other: Option<ExtractedContent>,
    method: ExtractionMethod,
    confidence: f64,
) -> BestContent {
    let (other_title, other_author, other_date) = match other {
        Some(o) => (Some(o.title), o.author, o.published_date),
        None => (None, None, None),
    };

    let title = Some(chosen.title)
        .filter(|t| !t.trim().is_empty())
        .or(other_title.filter(|t| !t.trim().is_empty()))
        .unwrap_or_else(|| UNTITLED.to_string());

    BestContent {
        title,
        content: chosen.content,
        author: chosen.author.or(other_author),
        published_date: chosen.published_date.or(other_date),
        method,
        confidence,
    }
}
