//! Single-flight metadata cache.
//!
//! Keys are (item id, canonical field set). A slot is either the in-flight
//! fetch itself or its resolved value. At most one fetch per key is ever
//! outstanding; later callers await the same shared future and resolve to
//! the same `Arc`. Failures are never cached.
//!
//! A fetch settles its own slot as it completes, before any waiter sees the
//! outcome, so whether anyone is still waiting makes no difference.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use crate::error::FetchError;
use crate::metadata::model::ItemMetadata;

/// Outcome of one fetch, shared by every waiter.
pub type FetchOutcome = Result<Arc<ItemMetadata>, FetchError>;

/// A fetch that any number of callers can await.
pub type SharedFetch = Shared<BoxFuture<'static, FetchOutcome>>;

/// Cache key: item id plus order-independent field signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    item_id: String,
    fields: String,
}

impl CacheKey {
    pub fn new<S: AsRef<str>>(item_id: &str, fields: &[S]) -> Self {
        let canonical: BTreeSet<&str> = fields.iter().map(|f| f.as_ref()).collect();
        Self {
            item_id: item_id.to_string(),
            fields: canonical.into_iter().collect::<Vec<_>>().join(","),
        }
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.item_id, self.fields)
    }
}

enum Slot {
    /// `generation` tells this fetch apart from a forced refresh that
    /// replaced it under the same key.
    Pending {
        generation: u64,
        fetch: SharedFetch,
    },
    Ready(Arc<ItemMetadata>),
}

type Slots = Mutex<HashMap<CacheKey, Slot>>;

/// A cache entry as seen by a caller.
pub enum Entry {
    Ready(Arc<ItemMetadata>),
    Pending(SharedFetch),
}

/// In-memory cache owned by the fetcher for the life of the process.
#[derive(Default)]
pub struct MetadataCache {
    slots: Arc<Slots>,
    generations: AtomicU64,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, key: &CacheKey) -> Option<Entry> {
        match self.slots.lock().get(key)? {
            Slot::Ready(item) => Some(Entry::Ready(Arc::clone(item))),
            Slot::Pending { fetch, .. } => Some(Entry::Pending(fetch.clone())),
        }
    }

    /// Return the slot for `key`, installing the fetch built by `start` if
    /// there is none (or unconditionally when `force` is set).
    ///
    /// Check and install happen under one lock, so two callers can never
    /// both start a fetch for the same key. The installed fetch replaces
    /// its slot with the value on success and removes it on failure.
    pub fn get_or_start<F>(&self, key: &CacheKey, force: bool, start: F) -> Entry
    where
        F: FnOnce() -> BoxFuture<'static, FetchOutcome>,
    {
        let mut slots = self.slots.lock();
        if !force {
            match slots.get(key) {
                Some(Slot::Ready(item)) => return Entry::Ready(Arc::clone(item)),
                Some(Slot::Pending { fetch, .. }) => return Entry::Pending(fetch.clone()),
                None => {}
            }
        }

        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        let inner = start();
        let owner = Arc::downgrade(&self.slots);
        let settle_key = key.clone();
        let fetch = async move {
            let outcome = inner.await;
            settle(&owner, &settle_key, generation, &outcome);
            outcome
        }
        .boxed()
        .shared();

        slots.insert(
            key.clone(),
            Slot::Pending {
                generation,
                fetch: fetch.clone(),
            },
        );
        Entry::Pending(fetch)
    }

    /// Drop every entry for an item, whatever its field set.
    pub fn invalidate_item(&self, item_id: &str) -> usize {
        let mut slots = self.slots.lock();
        let before = slots.len();
        slots.retain(|key, _| key.item_id != item_id);
        before - slots.len()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.slots.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.slots.lock().clear();
    }
}

/// Record the outcome of fetch `generation` for `key`.
///
/// Only touches the slot if it still holds that very fetch; a forced
/// refresh or an invalidation in the meantime wins.
fn settle(owner: &Weak<Slots>, key: &CacheKey, generation: u64, outcome: &FetchOutcome) {
    let Some(slots) = owner.upgrade() else {
        return;
    };
    let mut slots = slots.lock();
    let ours = matches!(
        slots.get(key),
        Some(Slot::Pending { generation: current, .. }) if *current == generation
    );
    if !ours {
        return;
    }
    match outcome {
        Ok(item) => {
            slots.insert(key.clone(), Slot::Ready(Arc::clone(item)));
        }
        Err(_) => {
            slots.remove(key);
        }
    }
}
