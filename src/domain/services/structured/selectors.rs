// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 结构化区域使用的候选选择器

pub const NAVIGATION: &[&str] = &["nav", "[role=\"navigation\"]", ".nav", ".navigation", ".menu", ".gnb"];
pub const HEADER_CONTAINER: &str = "header, .header, [role=\"banner\"]";
pub const MAIN: &[&str] = &["main", "[role=\"main\"]", ".main", ".content", "#content", ".container"];
pub const SIDEBAR: &[&str] = &["aside", "[role=\"complementary\"]", ".sidebar", ".side", ".side-menu"];
pub const FOOTER: &str = "footer, [role=\"contentinfo\"], .footer, .bottom";
pub const SEARCH: &str = ".search, #search, [role=\"search\"], .search-area, .search-layer";

/// 头部链接允许出现的导航类祖先
pub const HEADER_LINK_ANCESTORS: &str = "header, .header, nav, .nav, .gnb, [role=\"navigation\"]";

pub const PRODUCT: &[&str] = &[
    "[class*=\"product\"]",
    "[class*=\"goods\"]",
    "[class*=\"item\"]:not([class*=\"list-item\"]):not([class*=\"menu-item\"])",
    "li[class*=\"product\"]",
    "li[class*=\"goods\"]",
    ".goods-item",
    "[data-product-id]",
    "[data-goods-no]",
];

pub const RANKING: &[&str] = &[
    "[class*=\"rank\"]",
    "[class*=\"ranking\"]",
    ".rank",
    ".ranking",
    "[class*=\"keyword\"]",
    "[class*=\"best\"]",
];

pub const TITLE: &[&str] = &[
    "h3",
    "h4",
    "h5",
    ".title",
    "[class*=\"title\"]",
    "a[href]",
    ".name",
    "[class*=\"name\"]",
    ".product-name",
    "[class*=\"product-name\"]",
];

pub const RANKING_ITEM: &[&str] = &[
    "li",
    ".item",
    "[class*=\"item\"]",
    "tr",
    "div[class*=\"rank\"]",
    "div[class*=\"item\"]",
];

pub const KEYWORD: &str = ".keyword, [class*=\"keyword\"], .rank, [class*=\"rank\"], .trending, [class*=\"trending\"]";

pub const BRAND: &[&str] = &[".logo", ".brand", "h1", "h1 a", "[class*=\"logo\"]", "[class*=\"brand\"]"];

pub const CATEGORY: &str = "[class*=\"category\"], [class*=\"cat\"]";

pub const SECTION_HEADING: &str =
    "h1, h2, h3, h4, h5, h6, .section-title, [class*=\"section-title\"], [class*=\"title\"]";

pub const SECTION_BLOCK: &str = "section, .section, [class*=\"section\"], article, .article";

pub const SECTION_LIST_ITEM: &str = "li, .item, [class*=\"item\"]";
