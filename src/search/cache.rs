// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! TTL cache for web search results
//!
//! Keys are the lower-cased, whitespace-collapsed query plus the requested
//! result count, so "Lost  Card" and "lost card" share an entry.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use super::types::SearchResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    query: String,
    num_results: usize,
}

impl CacheKey {
    fn new(query: &str, num_results: usize) -> Self {
        Self {
            query: query
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase(),
            num_results,
        }
    }
}

struct CachedEntry {
    results: Vec<SearchResult>,
    provider: &'static str,
    inserted_at: Instant,
}

/// A cache hit
#[derive(Debug, Clone)]
pub struct CachedResults {
    pub results: Vec<SearchResult>,
    pub provider: &'static str,
}

pub struct SearchCache {
    entries: RwLock<HashMap<CacheKey, CachedEntry>>,
    ttl: Duration,
    max_entries: usize,
}

impl SearchCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Fresh results for this query, `None` on miss or expiry
    pub fn get(&self, query: &str, num_results: usize) -> Option<CachedResults> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(&CacheKey::new(query, num_results))?;

        if entry.inserted_at.elapsed() > self.ttl {
            return None;
        }

        Some(CachedResults {
            results: entry.results.clone(),
            provider: entry.provider,
        })
    }

    pub fn insert(
        &self,
        query: &str,
        num_results: usize,
        results: &[SearchResult],
        provider: &'static str,
    ) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let ttl = self.ttl;
        entries.retain(|_, e| e.inserted_at.elapsed() <= ttl);

        if entries.len() >= self.max_entries {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            CacheKey::new(query, num_results),
            CachedEntry {
                results: results.to_vec(),
                provider,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
