// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};

use super::item_extractors::{extract_products, extract_ranking_items, extract_rankings};
use super::section_detector::detect_section_type;
use super::selectors;
use super::text_utils::{clip, dedupe, split_tokens};
use crate::domain::models::structured::{
    FooterInfo, HeaderInfo, MainContent, SearchInfo, Section, SectionType,
};
use crate::utils::html::{
    char_len, css, element_text, next_element_sibling, normalize_text, parent_element, SearchScope,
};

static MENU_TEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)홈|메인|home|main").unwrap());
static MENU_HREF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)서비스|service").unwrap());

const MAX_SERVICES: usize = 15;
const MAX_MENU: usize = 10;
const MAX_KEYWORDS: usize = 30;
const MAX_SECTIONS: usize = 20;
const MAX_SECTION_ITEMS: usize = 30;

/// 页脚公司信息：(键, 关键词)
const COMPANY_INFO_KEYS: [(&str, &[&str]); 3] = [
    ("address", &["주소", "Address"]),
    ("phone", &["전화", "Tel", "Phone"]),
    ("email", &["이메일", "Email"]),
];

/// 从一组区域选择器中收集短文本
///
/// 有链接或按钮时逐个取其文本，否则对整段文本分词
pub fn extract_section_text(document: &Html, candidates: &[&str]) -> Vec<String> {
    let clickable = css("a, button");
    let mut texts = Vec::new();

    for candidate in candidates {
        for element in document.select(&css(candidate)) {
            let links: Vec<_> = element.select(&clickable).collect();
            if links.is_empty() {
                let text = normalize_text(&element_text(element));
                if !text.is_empty() {
                    texts.extend(split_tokens(&text));
                }
            } else {
                texts.extend(
                    links
                        .into_iter()
                        .map(|l| normalize_text(&element_text(l)))
                        .filter(|t| !t.is_empty() && char_len(t) < 100),
                );
            }
        }
    }

    dedupe(texts)
}

/// 头部：品牌与顶部链接
pub fn extract_header(document: &Html) -> Option<HeaderInfo> {
    let brand = selectors::BRAND.iter().find_map(|candidate| {
        let el = document.select(&css(candidate)).next()?;
        let text = normalize_text(&element_text(el));
        (!text.is_empty() && char_len(&text) < 50).then_some(text)
    });

    let header_container = document.select(&css(selectors::HEADER_CONTAINER)).next();
    let container = match header_container {
        Some(el) => el,
        None => document.select(&css("body")).next()?,
    };

    let nav_ancestor = css(selectors::HEADER_LINK_ANCESTORS);
    let mut services = Vec::new();
    let mut menu = Vec::new();

    for link in container.select(&css("a")) {
        let in_nav = link
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| nav_ancestor.matches(&a));
        if header_container.is_none() && !in_nav {
            continue;
        }

        let text = normalize_text(&element_text(link));
        if text.is_empty() || char_len(&text) >= 50 {
            continue;
        }
        let href = link.value().attr("href").unwrap_or("");
        if MENU_TEXT.is_match(&text) || MENU_HREF.is_match(href) {
            menu.push(text);
        } else {
            services.push(text);
        }
    }

    // 没有链接时把头部文本拆成服务名
    if header_container.is_some() && services.is_empty() && menu.is_empty() {
        let text = normalize_text(&element_text(container));
        services.extend(split_tokens(&text).into_iter().filter(|t| char_len(t) < 30));
    }

    let mut services = dedupe(services);
    services.truncate(MAX_SERVICES);
    let mut menu = dedupe(menu);
    menu.truncate(MAX_MENU);

    if brand.is_none() && services.is_empty() && menu.is_empty() {
        return None;
    }
    Some(HeaderInfo {
        brand,
        services,
        menu,
    })
}

/// 搜索区域：区域文本、热门关键词和关键词排名
pub fn extract_search(document: &Html) -> Option<SearchInfo> {
    let container = document.select(&css(selectors::SEARCH)).next()?;

    let area = Some(normalize_text(&element_text(container))).filter(|t| !t.is_empty());

    let keyword_sel = css(selectors::KEYWORD);
    let keywords = document
        .select(&keyword_sel)
        .map(|el| normalize_text(&element_text(el)))
        .filter(|t| !t.is_empty() && char_len(t) < 100)
        .flat_map(|t| split_tokens(&t));
    let mut keywords = dedupe(keywords);
    keywords.truncate(MAX_KEYWORDS);

    let keyword_rankings = extract_rankings(SearchScope::Element(container));

    if area.is_none() && keywords.is_empty() && keyword_rankings.is_empty() {
        return None;
    }
    Some(SearchInfo {
        area,
        keywords,
        keyword_rankings,
    })
}

/// 主内容：按标题切分为分区
pub fn extract_main_content(document: &Html) -> Option<MainContent> {
    let main = selectors::MAIN
        .iter()
        .find_map(|candidate| document.select(&css(candidate)).next())
        .or_else(|| document.select(&css("body")).next())?;

    let mut sections = sections_by_heading(main);
    if sections.is_empty() {
        sections = sections_by_block(main);
    }
    if sections.is_empty() {
        return None;
    }
    sections.truncate(MAX_SECTIONS);

    let title = main
        .select(&css("h1"))
        .next()
        .map(|h| normalize_text(&element_text(h)))
        .filter(|t| !t.is_empty() && char_len(t) < 200);

    Some(MainContent { title, sections })
}

fn sections_by_heading(main: ElementRef<'_>) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut seen = HashSet::new();

    for heading in main.select(&css(selectors::SECTION_HEADING)) {
        let name = normalize_text(&element_text(heading));
        let len = char_len(&name);
        if !(2..=150).contains(&len) || !seen.insert(clip(&name, 50)) {
            continue;
        }

        // 分区容器：下一个兄弟元素 → 父元素的下一个兄弟 → 父元素
        let parent = parent_element(heading);
        let container = next_element_sibling(heading)
            .or_else(|| parent.and_then(next_element_sibling))
            .or(parent);
        let Some(container) = container else {
            continue;
        };

        let section_type = detect_section_type(container, &name);
        let section = fill_section(name, section_type, container, true);
        if !section.is_empty() {
            sections.push(section);
        }
    }

    sections
}

/// 没有标题时，以 section/article 块为单位
fn sections_by_block(main: ElementRef<'_>) -> Vec<Section> {
    main.select(&css(selectors::SECTION_BLOCK))
        .filter_map(|block| {
            let text = normalize_text(&element_text(block));
            if char_len(&text) < 20 {
                return None;
            }
            let section_type = detect_section_type(block, &text);
            let section = fill_section(clip(&text, 50), section_type, block, false);
            (!section.is_empty()).then_some(section)
        })
        .collect()
}

/// 按分区类型填充内容
///
/// 排名和商品分区交给专门的抽取器，其余分区收集文本令牌
fn fill_section(
    name: String,
    section_type: SectionType,
    container: ElementRef<'_>,
    prefer_list_items: bool,
) -> Section {
    let mut section = Section {
        name,
        section_type,
        items: Vec::new(),
        products: Vec::new(),
        rankings: Vec::new(),
    };

    match section_type {
        SectionType::Ranking => {
            section.rankings = extract_rankings(SearchScope::Element(container));
            if section.rankings.is_empty() {
                section.rankings = extract_ranking_items(container);
            }
        }
        SectionType::Product => section.products = extract_products(SearchScope::Element(container)),
        _ => {}
    }
    if !section.rankings.is_empty() || !section.products.is_empty() {
        return section;
    }

    let list_items: Vec<_> = if prefer_list_items {
        container.select(&css(selectors::SECTION_LIST_ITEM)).collect()
    } else {
        Vec::new()
    };

    let items: Vec<String> = if list_items.is_empty() {
        let text = normalize_text(&element_text(container));
        if char_len(&text) > 5 {
            split_tokens(&text)
        } else {
            Vec::new()
        }
    } else {
        list_items
            .into_iter()
            .map(|li| normalize_text(&element_text(li)))
            .filter(|t| (3..300).contains(&char_len(t)))
            .flat_map(|t| {
                let tokens = split_tokens(&t);
                if tokens.is_empty() {
                    vec![t]
                } else {
                    tokens
                }
            })
            .collect()
    };

    section.items = dedupe(items);
    section.items.truncate(MAX_SECTION_ITEMS);
    section
}

/// 页脚：链接、版权与公司信息
pub fn extract_footer(document: &Html) -> Option<FooterInfo> {
    let container = document.select(&css(selectors::FOOTER)).next()?;

    let links = dedupe(
        container
            .select(&css("a"))
            .map(|a| normalize_text(&element_text(a)))
            .filter(|t| !t.is_empty() && char_len(t) < 50),
    );

    let copyright_text: String = container
        .select(&css("[class*=\"copyright\"], .copyright"))
        .map(element_text)
        .collect::<Vec<_>>()
        .join(" ");
    let copyright = Some(normalize_text(&copyright_text)).filter(|t| !t.is_empty());

    let mut company_info = BTreeMap::new();
    for el in container.select(&css("p, div")) {
        let text = normalize_text(&element_text(el));
        if let Some((key, _)) = COMPANY_INFO_KEYS
            .iter()
            .find(|(_, words)| words.iter().any(|w| text.contains(w)))
        {
            company_info.insert(key.to_string(), text);
        }
    }

    if links.is_empty() && copyright.is_none() && company_info.is_empty() {
        return None;
    }
    Some(FooterInfo {
        links,
        copyright,
        company_info,
    })
}
