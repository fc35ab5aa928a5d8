//! The card document.
//!
//! Holds the host's cards and pushes a `StructuralChange` to subscribers
//! whenever nodes are added or removed. This is the event source the
//! scheduler observes.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::dom::element::CardElement;

const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// Handle to a card within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardRef(usize);

/// One batch of structural mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StructuralChange {
    pub added: usize,
    pub removed: usize,
}

impl StructuralChange {
    pub fn added(count: usize) -> Self {
        Self {
            added: count,
            removed: 0,
        }
    }

    pub fn has_additions(&self) -> bool {
        self.added > 0
    }
}

struct DocumentInner {
    nodes: Mutex<Vec<Option<CardElement>>>,
    changes: broadcast::Sender<StructuralChange>,
}

/// Shared, cloneable handle to the card document.
#[derive(Clone)]
pub struct Document {
    inner: Arc<DocumentInner>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(DocumentInner {
                nodes: Mutex::new(Vec::new()),
                changes,
            }),
        }
    }

    /// Subscribe to structural changes made from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<StructuralChange> {
        self.inner.changes.subscribe()
    }

    pub fn append_card(&self, card: CardElement) -> CardRef {
        let card_ref = {
            let mut nodes = self.inner.nodes.lock();
            nodes.push(Some(card));
            CardRef(nodes.len() - 1)
        };
        self.notify(StructuralChange::added(1));
        card_ref
    }

    /// Insert several cards as one mutation batch.
    pub fn append_cards(&self, cards: Vec<CardElement>) -> Vec<CardRef> {
        let count = cards.len();
        let refs = {
            let mut nodes = self.inner.nodes.lock();
            cards
                .into_iter()
                .map(|card| {
                    nodes.push(Some(card));
                    CardRef(nodes.len() - 1)
                })
                .collect()
        };
        if count > 0 {
            self.notify(StructuralChange::added(count));
        }
        refs
    }

    pub fn remove_card(&self, card_ref: CardRef) -> Option<CardElement> {
        let removed = self
            .inner
            .nodes
            .lock()
            .get_mut(card_ref.0)
            .and_then(Option::take);
        if removed.is_some() {
            self.notify(StructuralChange {
                added: 0,
                removed: 1,
            });
        }
        removed
    }

    /// Report a mutation that happened outside the card list, e.g. the
    /// host inserting a wrapper around a grid.
    pub fn notify(&self, change: StructuralChange) {
        // No subscribers is fine
        let _ = self.inner.changes.send(change);
    }

    /// Every attached card whose `data-type` is a movie.
    pub fn find_movie_cards(&self) -> Vec<CardRef> {
        self.inner
            .nodes
            .lock()
            .iter()
            .enumerate()
            .filter(|(_, node)| node.as_ref().map(CardElement::is_movie).unwrap_or(false))
            .map(|(index, _)| CardRef(index))
            .collect()
    }

    /// Movie cards showing the given item.
    pub fn cards_for_item(&self, item_id: &str) -> Vec<CardRef> {
        self.inner
            .nodes
            .lock()
            .iter()
            .enumerate()
            .filter(|(_, node)| {
                node.as_ref()
                    .map(|card| card.is_movie() && card.item_id() == Some(item_id))
                    .unwrap_or(false)
            })
            .map(|(index, _)| CardRef(index))
            .collect()
    }

    /// Snapshot of a card.
    pub fn card(&self, card_ref: CardRef) -> Option<CardElement> {
        self.inner.nodes.lock().get(card_ref.0)?.clone()
    }

    pub fn with_card<R>(&self, card_ref: CardRef, f: impl FnOnce(&CardElement) -> R) -> Option<R> {
        let nodes = self.inner.nodes.lock();
        nodes.get(card_ref.0)?.as_ref().map(f)
    }

    /// Mutate a card in place. Returns `None` if it has been removed.
    pub fn with_card_mut<R>(
        &self,
        card_ref: CardRef,
        f: impl FnOnce(&mut CardElement) -> R,
    ) -> Option<R> {
        let mut nodes = self.inner.nodes.lock();
        nodes.get_mut(card_ref.0)?.as_mut().map(f)
    }

    /// Apply `f` to every attached card.
    pub fn for_each_card_mut(&self, mut f: impl FnMut(&mut CardElement)) {
        for card in self.inner.nodes.lock().iter_mut().flatten() {
            f(card);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.nodes.lock().iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
