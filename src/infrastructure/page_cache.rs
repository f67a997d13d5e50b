// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::config::settings::CacheSettings;
use crate::domain::models::page::LoadedPage;

/// 缓存条目
#[derive(Debug, Clone)]
struct CacheEntry {
    page: LoadedPage,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// 缓存统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    pub evictions: u64,
}

/// 已加载页面的内存缓存
///
/// 进程启动时构造一次，通过参数显式传递给加载器，不使用全局单例。
/// 条目按URL存放，带TTL，超过容量时淘汰最早写入的条目。
#[derive(Debug)]
pub struct PageCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
    evictions: AtomicU64,
}

impl PageCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            stores: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// 根据配置创建缓存，未启用时返回 `None`
    pub fn from_settings(settings: &CacheSettings) -> Option<Self> {
        settings.enabled.then(|| {
            Self::new(Duration::from_secs(settings.ttl_secs), settings.max_entries)
        })
    }

    /// 读取未过期的页面
    pub fn get(&self, url: &str) -> Option<LoadedPage> {
        let expired = match self.entries.get(url) {
            Some(entry) if !entry.is_expired() => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.page.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(url);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// 写入页面，失败的加载（状态码为0）不缓存
    pub fn put(&self, page: &LoadedPage) {
        if page.status_code == 0 {
            return;
        }
        self.entries.insert(
            page.url.clone(),
            CacheEntry {
                page: page.clone(),
                created_at: Instant::now(),
                ttl: self.ttl,
            },
        );
        self.stores.fetch_add(1, Ordering::Relaxed);
        self.evict_if_needed();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    fn evict_if_needed(&self) {
        let current = self.entries.len();
        if current <= self.max_entries {
            return;
        }

        // 先清理过期条目，再按写入时间淘汰
        self.entries.retain(|_, entry| !entry.is_expired());
        let overflow = self.entries.len().saturating_sub(self.max_entries);
        if overflow > 0 {
            let mut by_age: Vec<(String, Instant)> = self
                .entries
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().created_at))
                .collect();
            by_age.sort_by_key(|(_, created_at)| *created_at);
            for (key, _) in by_age.into_iter().take(overflow) {
                self.entries.remove(&key);
            }
        }

        let evicted = current.saturating_sub(self.entries.len());
        self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
        debug!(evicted, "Evicted entries from page cache");
    }
}
