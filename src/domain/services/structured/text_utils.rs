// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::models::structured::RankChange;
use crate::utils::html::{char_len, normalize_text, truncate_chars};

static PRICE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\d,]+원").unwrap());
static PRICE_SPACED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\d,]+\s*원").unwrap());
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^__PRICE_(\d+)__$").unwrap());
static DIGIT_THEN_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)([가-힣a-zA-Z])").unwrap());
static WORD_THEN_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"([가-힣a-zA-Z])(\d+)").unwrap());
static WORD_THEN_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([가-힣a-zA-Z])([,，.。!！?？])").unwrap());
static PUNCT_THEN_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([,，.。!！?？])([가-힣a-zA-Z])").unwrap());
static HANGUL_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[가-힣]+").unwrap());
static DELIVERY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)배송비\s*([\d,]+원|무료|FREE)").unwrap());

static RANK_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(\d+)\s*위",
        r"랭킹\s*(\d+)",
        r"(\d+)\s*위랭킹",
        r"#(\d+)",
        r"순위\s*(\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// 变化方向：(方向, 关键词模式, 变化量模式)
static CHANGE_PATTERNS: Lazy<Vec<(RankChange, Regex, Option<Regex>)>> = Lazy::new(|| {
    vec![
        (
            RankChange::Up,
            Regex::new(r"상승|\bUP\b|\bup\b|(?:^|\s)\+\d").unwrap(),
            Some(Regex::new(r"(?i)(\d+)\s*(?:단계|단|위|step)?\s*(?:상승|up)|(?:^|\s)\+\s*(\d+)").unwrap()),
        ),
        (
            RankChange::Down,
            Regex::new(r"하락|\bDOWN\b|\bdown\b|(?:^|\s)-\d").unwrap(),
            Some(Regex::new(r"(?i)(\d+)\s*(?:단계|단|위|step)?\s*(?:하락|down)|(?:^|\s)-\s*(\d+)").unwrap()),
        ),
        (RankChange::Stable, Regex::new(r"(?i)유지|\bstable\b").unwrap(), None),
        (
            RankChange::Soar,
            Regex::new(r"(?i)급등|\bsoar\b").unwrap(),
            Some(Regex::new(r"(\d+)\s*(?:단계|단|위)?\s*급등").unwrap()),
        ),
        (RankChange::New, Regex::new(r"신규|\bNEW\b|\bnew\b").unwrap(), None),
    ]
});

static RANK_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\s*위").unwrap());
static RANKING_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"랭킹\s*\d+").unwrap());
static CHANGE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"상승|하락|유지|급등|신규").unwrap());

/// 有效排名上限
const MAX_RANK: u32 = 1000;
/// 令牌长度范围 [2, 100)
const MIN_TOKEN_CHARS: usize = 2;
const MAX_TOKEN_CHARS: usize = 100;

/// 价格信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceInfo {
    pub price: Option<String>,
    pub discount_price: Option<String>,
    pub delivery_fee: Option<String>,
}

/// 排名信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankInfo {
    pub rank: Option<u32>,
    pub change: Option<RankChange>,
    pub change_amount: Option<u32>,
}

/// 按顺序去重
pub fn dedupe(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// 将缺少分隔符的连写文本拆分为语义单元
///
/// 例如 `39,000원배송비4,000원` → `["39,000원", "배송비", "4,000원"]`
pub fn split_tokens(text: &str) -> Vec<String> {
    let mut prices: Vec<String> = Vec::new();
    let protected = PRICE.replace_all(text, |caps: &regex::Captures<'_>| {
        prices.push(caps[0].to_string());
        format!(" __PRICE_{}__ ", prices.len() - 1)
    });

    let spaced = DIGIT_THEN_WORD.replace_all(&protected, "$1 $2");
    let spaced = WORD_THEN_DIGIT.replace_all(&spaced, "$1 $2");
    let spaced = WORD_THEN_PUNCT.replace_all(&spaced, "$1 $2");
    let spaced = PUNCT_THEN_WORD.replace_all(&spaced, "$1 $2");

    let mut tokens: Vec<String> = Vec::new();
    for part in spaced.split_whitespace() {
        if let Some(caps) = PLACEHOLDER.captures(part) {
            if let Some(price) = caps[1].parse::<usize>().ok().and_then(|i| prices.get(i)) {
                tokens.push(price.clone());
            }
            continue;
        }

        for run in HANGUL_RUN.find_iter(part) {
            chunk_hangul(run.as_str(), &mut tokens);
        }

        let rest = HANGUL_RUN.replace_all(part, " ");
        tokens.extend(rest.split_whitespace().map(str::to_string));
    }

    dedupe(tokens.into_iter().filter(|t| {
        let len = char_len(t);
        (MIN_TOKEN_CHARS..MAX_TOKEN_CHARS).contains(&len)
    }))
}

/// 长韩文串按 4/3/2 字贪心切分，剩余单字并入前一个令牌
fn chunk_hangul(run: &str, tokens: &mut Vec<String>) {
    let chars: Vec<char> = run.chars().collect();
    if chars.len() <= 4 {
        tokens.push(run.to_string());
        return;
    }

    let mut rest = chars.as_slice();
    while !rest.is_empty() {
        let take = match rest.len() {
            n if n >= 4 => 4,
            3 => 3,
            2 => 2,
            _ => {
                if let Some(last) = tokens.last_mut() {
                    last.extend(rest.iter());
                }
                break;
            }
        };
        tokens.push(rest[..take].iter().collect());
        rest = &rest[take..];
    }
}

/// 提取价格、折扣价与运费
pub fn extract_price(text: &str) -> PriceInfo {
    let mut prices = PRICE_SPACED
        .find_iter(text)
        .map(|m| m.as_str().split_whitespace().collect::<String>());

    PriceInfo {
        price: prices.next(),
        discount_price: prices.next(),
        delivery_fee: DELIVERY.captures(text).map(|c| c[1].to_string()),
    }
}

/// 提取排名与变化
pub fn extract_rank(text: &str) -> RankInfo {
    let rank = RANK_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|c| c[1].parse::<u32>().ok())
            .filter(|n| (1..=MAX_RANK).contains(n))
    });

    let mut info = RankInfo {
        rank,
        ..RankInfo::default()
    };

    if let Some((change, _, amount)) = CHANGE_PATTERNS.iter().find(|(_, kw, _)| kw.is_match(text)) {
        info.change = Some(*change);
        info.change_amount = amount.as_ref().and_then(|re| {
            let caps = re.captures(text)?;
            caps.get(1).or_else(|| caps.get(2))?.as_str().parse().ok()
        });
    }

    info
}

/// 去掉排名和变化标记，得到干净标题
pub fn strip_rank_markers(text: &str) -> String {
    let text = RANK_MARKER.replace_all(text, "");
    let text = RANKING_MARKER.replace_all(&text, "");
    let text = CHANGE_MARKER.replace_all(&text, "");
    normalize_text(&text)
}

/// 去掉价格片段
pub fn strip_prices(text: &str) -> String {
    normalize_text(&PRICE.replace_all(text, ""))
}

/// 截断到最多 `max` 个字符
pub fn clip(text: &str, max: usize) -> String {
    truncate_chars(text, max)
}
