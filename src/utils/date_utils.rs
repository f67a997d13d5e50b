// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static FULL_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})[.\-/](\d{1,2})[.\-/](\d{1,2})").unwrap());
static SHORT_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{2})[.\-/](\d{1,2})[.\-/](\d{1,2})").unwrap());

/// 将页面上的日期文本转换为 ISO-8601 字符串
///
/// 支持 RFC 3339、`YYYY.MM.DD` / `YYYY-MM-DD` / `YYYY/MM/DD` 及两位年份形式。
/// 无法识别时返回 `None`。
pub fn to_iso8601(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).to_rfc3339());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc().to_rfc3339());
    }

    let date = FULL_DATE
        .captures(raw)
        .and_then(|c| ymd(c[1].parse().ok()?, &c[2], &c[3]))
        .or_else(|| {
            SHORT_DATE
                .captures(raw)
                .and_then(|c| ymd(2000 + c[1].parse::<i32>().ok()?, &c[2], &c[3]))
        })?;

    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().to_rfc3339())
}

/// 日期文本转 ISO-8601，失败时使用当前时间
pub fn to_iso8601_or_now(raw: Option<&str>) -> String {
    raw.and_then(to_iso8601)
        .unwrap_or_else(|| Utc::now().to_rfc3339())
}

fn ymd(year: i32, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}
