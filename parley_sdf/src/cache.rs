// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Budgeted LRU cache of render blobs.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};
use hashbrown::HashMap;

use crate::blob::{BlobId, BlobRun, RenderBlob, SharedBlob};
use crate::error::ConfigError;
use crate::pool::MemoryPool;
use crate::text::{TextRunSource, count_glyphs};

/// Configuration of a [`BlobCache`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BlobCacheConfig {
    /// Pool size in bytes above which least recently used blobs are evicted.
    pub budget: usize,
    /// Size of the memory pool's first block.
    pub pre_alloc_size: usize,
    /// Minimum size of every further memory pool block.
    pub min_growth_size: usize,
}

impl BlobCacheConfig {
    /// Default budget: 1 MiB.
    pub const DEFAULT_BUDGET: usize = 1 << 20;
    /// Default first block size. Large enough for the biggest text blobs seen in practice.
    pub const DEFAULT_PRE_ALLOC_SIZE: usize = 1 << 17;
    /// Default growth block size.
    pub const DEFAULT_MIN_GROWTH_SIZE: usize = 1 << 17;

    /// Checks that the configuration can be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.budget == 0 {
            return Err(ConfigError::ZeroBudget);
        }
        if self.min_growth_size == 0 {
            return Err(ConfigError::ZeroGrowth);
        }
        Ok(())
    }
}

impl Default for BlobCacheConfig {
    fn default() -> Self {
        Self {
            budget: Self::DEFAULT_BUDGET,
            pre_alloc_size: Self::DEFAULT_PRE_ALLOC_SIZE,
            min_growth_size: Self::DEFAULT_MIN_GROWTH_SIZE,
        }
    }
}

/// Caches [`RenderBlob`]s by text blob identifier, keeping the pool they are allocated from
/// within a byte budget.
///
/// Entries are kept in most recently used order. Adding an entry that pushes the pool over
/// budget evicts entries from the least recently used end until the pool fits again. The entry
/// just added is never evicted, even when it alone exceeds the budget.
///
/// Evicting an entry only drops the cache's reference; draws still holding the blob keep it
/// (and its pool storage) alive.
pub struct BlobCache {
    config: BlobCacheConfig,
    pool: MemoryPool,
    index: HashMap<BlobId, usize>,
    slots: Vec<Slot>,
    free_slots: Vec<usize>,
    /// Most recently used.
    head: Option<usize>,
    /// Least recently used.
    tail: Option<usize>,
    cache_hits: u64,
    cache_misses: u64,
}

#[derive(Clone, Copy, Default)]
struct Link {
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Default)]
struct Slot {
    entry: Option<(BlobId, SharedBlob)>,
    link: Link,
}

impl BlobCache {
    /// Creates a cache with the default configuration.
    pub fn new() -> Self {
        Self::with_valid_config(BlobCacheConfig::default())
    }

    /// Creates a cache with the given configuration.
    pub fn with_config(config: BlobCacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: BlobCacheConfig) -> Self {
        Self {
            config,
            pool: MemoryPool::new(config.pre_alloc_size, config.min_growth_size),
            index: HashMap::new(),
            slots: Vec::new(),
            free_slots: Vec::new(),
            head: None,
            tail: None,
            cache_hits: 0,
            cache_misses: 0,
        }
    }

    /// Creates a blob that is not cached, sized for `glyph_count` glyphs in `run_count` runs
    /// with vertices of up to `max_vertex_stride` bytes.
    ///
    /// The blob's storage still counts towards the pool size while it is alive.
    pub fn create_blob(
        &self,
        glyph_count: usize,
        run_count: usize,
        max_vertex_stride: usize,
    ) -> SharedBlob {
        RenderBlob::new(&self.pool, glyph_count, run_count, max_vertex_stride).into_shared()
    }

    /// Creates a blob sized for `source`, keyed by its identifier, and adds it to the cache.
    pub fn create_cached_blob<S: TextRunSource + ?Sized>(
        &mut self,
        source: &S,
        max_vertex_stride: usize,
    ) -> SharedBlob {
        let counts = count_glyphs(source);
        let mut blob = RenderBlob::new(&self.pool, counts.glyphs, counts.runs, max_vertex_stride);
        blob.set_id(source.unique_id());
        let mut glyph_start = 0;
        for (run, glyph_count) in blob.runs_mut().iter_mut().zip(source.run_glyph_counts()) {
            *run = BlobRun {
                glyph_start,
                glyph_count,
                distance_field: true,
            };
            glyph_start += glyph_count;
        }
        let blob = blob.into_shared();
        self.add(Rc::clone(&blob));
        blob
    }

    /// Looks up the blob cached for `id`. Does not change the recency order.
    pub fn find(&mut self, id: BlobId) -> Option<SharedBlob> {
        match self.index.get(&id) {
            Some(&slot) => {
                self.cache_hits += 1;
                self.slots[slot].entry.as_ref().map(|(_, blob)| Rc::clone(blob))
            }
            None => {
                self.cache_misses += 1;
                None
            }
        }
    }

    /// Whether a blob is cached for `id`.
    pub fn contains(&self, id: BlobId) -> bool {
        self.index.contains_key(&id)
    }

    /// Adds `blob` as the most recently used entry, then evicts least recently used entries
    /// while the pool is over budget.
    ///
    /// The blob must have an identifier. Adding a blob under an identifier that is already
    /// cached replaces the previous entry.
    pub fn add(&mut self, blob: SharedBlob) {
        let id = blob.borrow().id();
        debug_assert!(id.is_some(), "only blobs with an identifier can be cached");
        let Some(id) = id else {
            return;
        };
        if let Some(&previous) = self.index.get(&id) {
            debug_assert!(false, "blob {id:?} is already cached");
            self.release_slot(previous);
        }

        let slot = self.occupy_slot(id, blob);
        self.link_at_head(slot);
        self.index.insert(id, slot);

        while self.pool.size() > self.config.budget {
            let Some(lru) = self.tail else {
                break;
            };
            if lru == slot {
                log::debug!(
                    "blob {id:?} alone exceeds the budget ({} > {} bytes)",
                    self.pool.size(),
                    self.config.budget
                );
                break;
            }
            self.release_slot(lru);
        }
    }

    /// Removes `blob` from the cache, dropping the cache's reference.
    ///
    /// References held elsewhere stay valid.
    pub fn remove(&mut self, blob: &SharedBlob) {
        let slot = self.slot_of(blob);
        debug_assert!(slot.is_some(), "removed a blob that is not cached");
        if let Some(slot) = slot {
            self.release_slot(slot);
        }
    }

    /// Marks `blob` as the most recently used entry.
    pub fn make_mru(&mut self, blob: &SharedBlob) {
        let slot = self.slot_of(blob);
        debug_assert!(slot.is_some(), "promoted a blob that is not cached");
        let Some(slot) = slot else {
            return;
        };
        if self.head == Some(slot) {
            return;
        }
        self.unlink(slot);
        self.link_at_head(slot);
    }

    /// Identifiers of the cached blobs, from most to least recently used.
    pub fn ids_mru(&self) -> impl Iterator<Item = BlobId> + '_ {
        core::iter::successors(self.head, |&slot| self.slots[slot].link.next)
            .filter_map(|slot| self.slots[slot].entry.as_ref().map(|(id, _)| *id))
    }

    /// Drops every cached blob.
    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.free_slots.clear();
        self.head = None;
        self.tail = None;
    }

    /// Number of cached blobs.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the cache is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Bytes currently allocated from the pool, by cached and uncached blobs alike.
    pub fn pool_size(&self) -> usize {
        self.pool.size()
    }

    /// The byte budget.
    pub fn budget(&self) -> usize {
        self.config.budget
    }

    /// The configuration the cache was created with.
    pub fn config(&self) -> &BlobCacheConfig {
        &self.config
    }

    /// Number of successful lookups since the last `clear_stats()`.
    #[inline]
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits
    }

    /// Number of failed lookups since the last `clear_stats()`.
    #[inline]
    pub fn cache_misses(&self) -> u64 {
        self.cache_misses
    }

    /// Clear lookup statistics without clearing the cache itself.
    pub fn clear_stats(&mut self) {
        self.cache_hits = 0;
        self.cache_misses = 0;
    }

    fn slot_of(&self, blob: &SharedBlob) -> Option<usize> {
        let id = blob.borrow().id()?;
        let slot = *self.index.get(&id)?;
        debug_assert!(
            self.slots[slot]
                .entry
                .as_ref()
                .is_some_and(|(_, cached)| Rc::ptr_eq(cached, blob)),
            "blob {id:?} changed identity while cached"
        );
        Some(slot)
    }

    fn occupy_slot(&mut self, id: BlobId, blob: SharedBlob) -> usize {
        let slot = match self.free_slots.pop() {
            Some(slot) => slot,
            None => {
                self.slots.push(Slot::default());
                self.slots.len() - 1
            }
        };
        self.slots[slot].entry = Some((id, blob));
        slot
    }

    /// Unindexes, unlinks and empties `slot`, dropping the cache's reference to its blob.
    fn release_slot(&mut self, slot: usize) {
        self.unlink(slot);
        if let Some((id, blob)) = self.slots[slot].entry.take() {
            self.index.remove(&id);
            log::debug!(
                "releasing blob {id:?} ({} bytes, {} other references)",
                blob.borrow().storage_size(),
                Rc::strong_count(&blob) - 1
            );
        }
        self.free_slots.push(slot);
    }

    fn link_at_head(&mut self, slot: usize) {
        self.slots[slot].link = Link {
            prev: None,
            next: self.head,
        };
        match self.head {
            Some(head) => self.slots[head].link.prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
    }

    fn unlink(&mut self, slot: usize) {
        let Link { prev, next } = self.slots[slot].link;
        match prev {
            Some(prev) => self.slots[prev].link.next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.slots[next].link.prev = prev,
            None => self.tail = prev,
        }
        self.slots[slot].link = Link::default();
    }
}

impl Default for BlobCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for BlobCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BlobCache")
            .field("len", &self.index.len())
            .field("pool_size", &self.pool.size())
            .field("budget", &self.config.budget)
            .field("cache_hits", &self.cache_hits)
            .field("cache_misses", &self.cache_misses)
            .finish_non_exhaustive()
    }
}
