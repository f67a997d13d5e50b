// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::Html;

use crate::domain::models::content::SemanticType;
use crate::domain::models::page::{PageAnalysis, PageProfile, PageRole};
use crate::utils::html::css;

/// 角色关键词：(语义类型, URL关键词, 页面关键词)
const ROLE_KEYWORDS: [(SemanticType, &[&str], &[&str]); 3] = [
    (SemanticType::Notice, &["notice", "공지"], &["공지"]),
    (SemanticType::Recruit, &["recruit", "채용"], &["채용"]),
    (SemanticType::Event, &["event", "행사"], &["행사"]),
];

/// URL中暗示详情页的片段
const DETAIL_URL_HINTS: [&str; 3] = ["view", "detail", "read"];

/// 页面分类器
///
/// 尽力而为的启发式分类，分错时可通过来源配置覆盖
pub struct PageClassifier;

impl PageClassifier {
    /// 生成页面画像
    ///
    /// 渲染方式与数据获取方式直接取自分析结果，只有角色需要推断
    pub fn classify(url: &str, markup: &str, analysis: &PageAnalysis) -> PageProfile {
        PageProfile {
            rendering_type: analysis.rendering_type,
            data_access_type: analysis.data_access_type,
            page_role: Self::infer_role(url, markup),
        }
    }

    /// 推断页面角色
    ///
    /// 1. 关键词命中：有表格行为列表页，否则为详情页
    /// 2. 详情页特征命中：默认 DETAIL_NOTICE
    /// 3. 其他：STATIC_PAGE
    pub fn infer_role(url: &str, markup: &str) -> PageRole {
        let lower_url = url.to_lowercase();
        let lower_markup = markup.to_lowercase();
        let document = Html::parse_document(markup);

        let keyword_hit = ROLE_KEYWORDS.iter().find(|(_, url_words, markup_words)| {
            url_words.iter().any(|w| lower_url.contains(w))
                || markup_words.iter().any(|w| lower_markup.contains(w))
        });

        if let Some((semantic, _, _)) = keyword_hit {
            let has_rows = document.select(&css("table tbody tr")).next().is_some();
            return PageRole::for_semantic(*semantic, has_rows);
        }

        let looks_like_detail = DETAIL_URL_HINTS.iter().any(|h| lower_url.contains(h))
            || document.select(&css("article")).count() == 1
            || document.select(&css(".article-content")).next().is_some();

        if looks_like_detail {
            PageRole::DetailNotice
        } else {
            PageRole::StaticPage
        }
    }
}
