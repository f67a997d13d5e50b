// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;

use scraper::{ElementRef, Selector};

use super::selectors;
use super::text_utils::{clip, extract_price, extract_rank, strip_prices, strip_rank_markers};
use crate::domain::models::structured::{ProductItem, RankingItem};
use crate::utils::html::{char_len, css, element_text, normalize_text, SearchScope};

/// 每类条目的输出上限
const MAX_ITEMS: usize = 50;
/// 商品去重键长度
const DEDUPE_PREFIX_CHARS: usize = 50;
const MAX_TITLE_CHARS: usize = 100;

/// 提取商品条目
///
/// # 参数
///
/// * `scope` - 搜索范围（整页或某个分区）
///
/// # 返回值
///
/// 最多50个商品，按候选选择器和文档顺序排列
pub fn extract_products(scope: SearchScope<'_>) -> Vec<ProductItem> {
    let mut products = Vec::new();
    let mut seen = HashSet::new();
    let title_selectors: Vec<Selector> = selectors::TITLE.iter().map(|s| css(s)).collect();
    let img = css("img");
    let link = css("a[href]");
    let category = css(selectors::CATEGORY);

    for candidate in selectors::PRODUCT {
        for element in scope.find(&css(candidate)) {
            let text = normalize_text(&element_text(element));
            let len = char_len(&text);
            if !(10..1000).contains(&len) {
                continue;
            }
            if !seen.insert(clip(&text, DEDUPE_PREFIX_CHARS)) {
                continue;
            }

            let title = first_title(element, &title_selectors, |t| {
                let t = clip(t, MAX_TITLE_CHARS);
                (char_len(&t) > 3).then_some(t)
            })
            .or_else(|| {
                let without_price = strip_prices(&text);
                let n = char_len(&without_price);
                (n > 3 && n < MAX_TITLE_CHARS).then_some(without_price)
            });

            let price = extract_price(&text);
            if title.is_none() && price.price.is_none() {
                continue;
            }

            let image = element.select(&img).next();
            let image_url = image.and_then(|i| {
                let v = i.value();
                v.attr("src")
                    .or_else(|| v.attr("data-src"))
                    .or_else(|| v.attr("data-lazy-src"))
                    .map(str::to_string)
            });
            let detail_url = element
                .select(&link)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(str::to_string);

            products.push(ProductItem {
                title: Some(title.unwrap_or_else(|| clip(&text, DEDUPE_PREFIX_CHARS))),
                price: price.price,
                discount_price: price.discount_price,
                delivery_fee: price.delivery_fee,
                rank: extract_rank(&text).rank,
                category: category_of(element, &category),
                image_url,
                detail_url,
            });
        }
    }

    products.truncate(MAX_ITEMS);
    products
}

/// 提取排名条目
///
/// 必须能解析出排名才会保留，按排名去重后升序排列，最多50个
pub fn extract_rankings(scope: SearchScope<'_>) -> Vec<RankingItem> {
    let mut collector = RankingCollector::new();
    for candidate in selectors::RANKING {
        for container in self_and_descendants(scope, &css(candidate)) {
            collector.collect(container);
        }
    }
    collector.finish()
}

/// 把给定元素直接当作排名容器提取条目
///
/// 用于标题已表明是排名、但容器本身没有排名类名的分区
pub fn extract_ranking_items(container: ElementRef<'_>) -> Vec<RankingItem> {
    let mut collector = RankingCollector::new();
    collector.collect(container);
    collector.finish()
}

struct RankingCollector {
    rankings: Vec<RankingItem>,
    seen: HashSet<u32>,
    title_selectors: Vec<Selector>,
    item_selectors: Vec<Selector>,
    category: Selector,
}

impl RankingCollector {
    fn new() -> Self {
        Self {
            rankings: Vec::new(),
            seen: HashSet::new(),
            title_selectors: selectors::TITLE.iter().map(|s| css(s)).collect(),
            item_selectors: selectors::RANKING_ITEM.iter().map(|s| css(s)).collect(),
            category: css(selectors::CATEGORY),
        }
    }

    fn collect(&mut self, container: ElementRef<'_>) {
        for item_selector in &self.item_selectors {
            for element in container.select(item_selector) {
                let text = normalize_text(&element_text(element));
                if !(5..=500).contains(&char_len(&text)) {
                    continue;
                }

                let info = extract_rank(&text);
                let Some(rank) = info.rank else {
                    continue;
                };
                if self.seen.contains(&rank) {
                    continue;
                }

                let title = first_title(element, &self.title_selectors, |t| {
                    let cleaned = strip_rank_markers(t);
                    let n = char_len(&cleaned);
                    (n > 2 && n < 200).then_some(cleaned)
                })
                .unwrap_or_else(|| clip(&strip_prices(&strip_rank_markers(&text)), MAX_TITLE_CHARS));

                if char_len(&title) <= 2 {
                    continue;
                }
                self.seen.insert(rank);

                self.rankings.push(RankingItem {
                    rank,
                    title,
                    change: info.change,
                    change_amount: info.change_amount,
                    category: category_of(element, &self.category),
                    products: extract_products(SearchScope::Element(element)),
                });
            }
        }
    }

    fn finish(mut self) -> Vec<RankingItem> {
        self.rankings.sort_by_key(|r| r.rank);
        self.rankings.truncate(MAX_ITEMS);
        self.rankings
    }
}

/// 按候选标题选择器查找第一个被 `accept` 接受的标题
fn first_title(
    element: ElementRef<'_>,
    title_selectors: &[Selector],
    accept: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    title_selectors.iter().find_map(|sel| {
        let found = element.select(sel).next()?;
        accept(&normalize_text(&element_text(found)))
    })
}

fn category_of(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|c| normalize_text(&element_text(c)))
        .filter(|c| !c.is_empty())
}

/// 范围元素自身匹配时也作为容器
fn self_and_descendants<'a>(scope: SearchScope<'a>, selector: &Selector) -> Vec<ElementRef<'a>> {
    let mut found = Vec::new();
    if let SearchScope::Element(el) = scope {
        if selector.matches(&el) {
            found.push(el);
        }
    }
    found.extend(scope.find(selector));
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::structured::RankChange;
    use scraper::Html;

    #[test]
    fn test_ranking_list_sorted_and_clean() {
        let doc = Html::parse_document(
            "<div class=\"ranking\"><ul>\
             <li>2위 상품B 하락</li>\
             <li>1위 상품A 상승 39,000원</li>\
             </ul></div>",
        );
        let rankings = extract_rankings(SearchScope::Document(&doc));
        assert_eq!(rankings.len(), 2);
        assert_eq!(rankings[0].rank, 1);
        assert_eq!(rankings[0].title, "상품A");
        assert_eq!(rankings[0].change, Some(RankChange::Up));
        assert_eq!(rankings[1].rank, 2);
        assert_eq!(rankings[1].title, "상품B");
        assert_eq!(rankings[1].change, Some(RankChange::Down));
    }

    #[test]
    fn test_ranking_requires_rank_number() {
        let doc = Html::parse_document("<ol class=\"rank-list\"><li>그냥 텍스트 항목</li></ol>");
        assert!(extract_rankings(SearchScope::Document(&doc)).is_empty());
    }

    #[test]
    fn test_ranking_scope_element_itself_is_container() {
        let doc = Html::parse_document("<ul class=\"ranking\"><li>1위 키워드하나</li><li>2위 키워드둘</li></ul>");
        let ul = doc.select(&css("ul")).next().unwrap();
        let rankings = extract_rankings(SearchScope::Element(ul));
        assert_eq!(rankings.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_ranking_items_from_plain_container() {
        let doc = Html::parse_document("<ol><li>3위 검색어셋</li><li>1위 검색어하나</li></ol>");
        let ol = doc.select(&css("ol")).next().unwrap();
        assert!(extract_rankings(SearchScope::Element(ol)).is_empty());
        let items = extract_ranking_items(ol);
        assert_eq!(items.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_products_extracted_and_deduped() {
        let doc = Html::parse_document(
            "<div>\
             <div class=\"product-card\" data-product-id=\"1\"><h3>무선 이어폰 프로</h3><span>49,000원</span><span>배송비 3,000원</span>\
               <img data-src=\"/img/1.jpg\"><a href=\"/p/1\">보기</a></div>\
             <div class=\"product-card\"><span class=\"price\">12,000원</span><span>특가 상품</span></div>\
             <div class=\"product-card\">short</div>\
             </div>",
        );
        let products = extract_products(SearchScope::Document(&doc));
        assert_eq!(products.len(), 2);

        let first = &products[0];
        assert_eq!(first.title.as_deref(), Some("무선 이어폰 프로"));
        assert_eq!(first.price.as_deref(), Some("49,000원"));
        assert_eq!(first.delivery_fee.as_deref(), Some("3,000원"));
        assert_eq!(first.image_url.as_deref(), Some("/img/1.jpg"));
        assert_eq!(first.detail_url.as_deref(), Some("/p/1"));

        let second = &products[1];
        assert_eq!(second.price.as_deref(), Some("12,000원"));
        assert_eq!(second.title.as_deref(), Some("특가 상품"));
    }
}
