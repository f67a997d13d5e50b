// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::settings::ScoringSettings;
use crate::domain::models::record::RawRecord;
use crate::utils::html::char_len;

static DATE_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}[.\-/]\d{1,2}[.\-/]\d{1,2}").unwrap());

/// 评估一条记录的数据质量
///
/// 标题、URL、日期和正文各占一部分权重，结果归一化到 [0,1]。
///
/// # 参数
///
/// * `title` - 标题
/// * `url` - 记录地址
/// * `date` - 日期字符串
/// * `content` - 正文文本
/// * `weights` - 各项权重
///
/// # 返回值
///
/// 质量分数，权重总和为0时返回0
pub fn evaluate_quality(
    title: &str,
    url: &str,
    date: &str,
    content: &str,
    weights: &ScoringSettings,
) -> f64 {
    let max_score = weights.quality_title_weight
        + weights.quality_url_weight
        + weights.quality_date_weight
        + weights.quality_content_weight;
    if max_score <= 0.0 {
        return 0.0;
    }

    let mut score = 0.0;

    let title_len = char_len(title.trim());
    if title_len > 5 {
        score += weights.quality_title_weight;
    } else if title_len > 0 {
        score += weights.quality_title_weight / 2.0;
    }

    if url.starts_with("http") {
        score += weights.quality_url_weight;
    }

    if DATE_LIKE.is_match(date) {
        score += weights.quality_date_weight;
    } else if !date.trim().is_empty() {
        score += weights.quality_date_weight / 2.0;
    }

    let content_len = char_len(content.trim());
    if content_len > 100 {
        score += weights.quality_content_weight;
    } else if content_len > 50 {
        score += weights.quality_content_weight * 2.0 / 3.0;
    } else if content_len > 0 {
        score += weights.quality_content_weight / 3.0;
    }

    score / max_score
}

/// 记录的质量分数
pub fn record_quality(record: &RawRecord, weights: &ScoringSettings) -> f64 {
    evaluate_quality(
        &record.title,
        &record.url,
        &record.date,
        &record.content.as_text(),
        weights,
    )
}

/// 一组记录的平均质量，空集合返回 `None`
pub fn mean_quality(records: &[RawRecord], weights: &ScoringSettings) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let total: f64 = records.iter().map(|r| record_quality(r, weights)).sum();
    Some(total / records.len() as f64)
}
