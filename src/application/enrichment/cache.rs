use std::{borrow::Borrow, hash::Hash};

use dashmap::DashMap;
use time::{Duration, OffsetDateTime};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<V> {
    pub value: V,
    pub fetched_at: OffsetDateTime,
}

impl<V> CacheEntry<V> {
    pub fn is_fresh(&self, now: OffsetDateTime, ttl: Duration) -> bool {
        now - self.fetched_at < ttl
    }
}

/// Key → last successful observation. Entries are replaced on refresh and never
/// removed; concurrent refreshes of one key are last-writer-wins.
#[derive(Debug)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, CacheEntry<V>>,
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for `key` if it was fetched less than `ttl` before `now`.
    pub fn fresh<Q>(&self, key: &Q, now: OffsetDateTime, ttl: Duration) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries
            .get(key)
            .filter(|entry| entry.is_fresh(now, ttl))
            .map(|entry| entry.value.clone())
    }

    /// Last stored value for `key`, however old.
    pub fn latest<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn entry<Q>(&self, key: &Q) -> Option<CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|entry| entry.clone())
    }

    pub fn store(&self, key: K, value: V, fetched_at: OffsetDateTime) {
        self.entries.insert(key, CacheEntry { value, fetched_at });
    }
}
