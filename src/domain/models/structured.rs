// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 商品条目
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_fee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_url: Option<String>,
}

/// 排名变化方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankChange {
    Up,
    Down,
    Stable,
    Soar,
    New,
}

impl RankChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankChange::Up => "up",
            RankChange::Down => "down",
            RankChange::Stable => "stable",
            RankChange::Soar => "soar",
            RankChange::New => "new",
        }
    }
}

/// 排名条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingItem {
    pub rank: u32,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<RankChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_amount: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<ProductItem>,
}

/// 分区类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    List,
    Ranking,
    Product,
    Article,
    Table,
    Text,
}

/// 主内容中的一个分区
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub name: String,
    #[serde(rename = "type")]
    pub section_type: SectionType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<ProductItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rankings: Vec<RankingItem>,
}

impl Section {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.products.is_empty() && self.rankings.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub menu: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keyword_rankings: Vec<RankingItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarBlock {
    pub title: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterInfo {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub company_info: BTreeMap<String, String>,
}

/// 页面的结构化内容
///
/// 每个区域只有在提取到数据时才出现
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredContent {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub navigation: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<HeaderInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_content: Option<MainContent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sidebar: Vec<SidebarBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<FooterInfo>,
}

impl StructuredContent {
    /// 是否至少包含一个区域
    pub fn has_sections(&self) -> bool {
        !self.navigation.is_empty()
            || self.header.is_some()
            || self.search.is_some()
            || self.main_content.is_some()
            || !self.sidebar.is_empty()
            || self.footer.is_some()
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, indent: &str, items: &[String]) -> fmt::Result {
    for item in items {
        writeln!(f, "{indent}- {item}")?;
    }
    Ok(())
}

impl fmt::Display for StructuredContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.navigation.is_empty() {
            writeln!(f, "## Navigation")?;
            write_list(f, "", &self.navigation)?;
            writeln!(f)?;
        }

        if let Some(header) = &self.header {
            writeln!(f, "## Header")?;
            if let Some(brand) = &header.brand {
                writeln!(f, "Brand: {brand}")?;
            }
            if !header.services.is_empty() {
                writeln!(f, "Services:")?;
                write_list(f, "  ", &header.services)?;
            }
            if !header.menu.is_empty() {
                writeln!(f, "Menu:")?;
                write_list(f, "  ", &header.menu)?;
            }
            writeln!(f)?;
        }

        if let Some(search) = &self.search {
            writeln!(f, "## Search")?;
            if let Some(area) = &search.area {
                writeln!(f, "Area: {area}")?;
            }
            if !search.keywords.is_empty() {
                writeln!(f, "Keywords:")?;
                write_list(f, "  ", &search.keywords)?;
            }
            for ranking in &search.keyword_rankings {
                writeln!(f, "  #{} {}", ranking.rank, ranking.title)?;
            }
            writeln!(f)?;
        }

        if let Some(main) = &self.main_content {
            writeln!(f, "## Main")?;
            if let Some(title) = &main.title {
                writeln!(f, "Title: {title}")?;
            }
            for section in &main.sections {
                writeln!(f, "### {}", section.name)?;
                write_list(f, "  ", &section.items)?;
                for product in &section.products {
                    writeln!(f, "  - {}", product.title.as_deref().unwrap_or("Untitled"))?;
                    if let Some(price) = &product.price {
                        writeln!(f, "    Price: {price}")?;
                    }
                    if let Some(fee) = &product.delivery_fee {
                        writeln!(f, "    Delivery: {fee}")?;
                    }
                }
                for ranking in &section.rankings {
                    writeln!(f, "  #{} {}", ranking.rank, ranking.title)?;
                    if let Some(change) = ranking.change {
                        writeln!(f, "    Change: {}", change.as_str())?;
                    }
                }
                writeln!(f)?;
            }
        }

        for block in &self.sidebar {
            writeln!(f, "## {}", block.title)?;
            write_list(f, "  ", &block.items)?;
            writeln!(f)?;
        }

        if let Some(footer) = &self.footer {
            writeln!(f, "## Footer")?;
            if !footer.links.is_empty() {
                writeln!(f, "Links:")?;
                write_list(f, "  ", &footer.links)?;
            }
            if let Some(copyright) = &footer.copyright {
                writeln!(f, "Copyright: {copyright}")?;
            }
            for (key, value) in &footer.company_info {
                writeln!(f, "  {key}: {value}")?;
            }
        }

        Ok(())
    }
}
