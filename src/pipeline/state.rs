//! Per-item enhancement state.
//!
//! The record the orchestrator decides from. Keyed by item id, so every
//! card showing the same item shares one status and one set of derived
//! attributes. An absent entry means the item has not been processed.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::attributes::Attribute;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardStatus {
    /// Claimed by a pass whose fetch has not settled.
    Pending,
    Enhanced,
    /// Terminal until the next full reset.
    Errored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardRecord {
    pub status: CardStatus,
    pub attributes: Vec<Attribute>,
}

/// Shared card-state registry.
#[derive(Debug, Clone, Default)]
pub struct CardStates {
    records: Arc<Mutex<HashMap<String, CardRecord>>>,
}

impl CardStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, item_id: &str) -> Option<CardStatus> {
        self.records.lock().get(item_id).map(|r| r.status)
    }

    pub fn record(&self, item_id: &str) -> Option<CardRecord> {
        self.records.lock().get(item_id).cloned()
    }

    /// Mark an unprocessed item as pending.
    ///
    /// Returns false if the item already has a record, in which case the
    /// caller must not fetch it.
    pub fn claim(&self, item_id: &str) -> bool {
        let mut records = self.records.lock();
        if records.contains_key(item_id) {
            return false;
        }
        records.insert(
            item_id.to_string(),
            CardRecord {
                status: CardStatus::Pending,
                attributes: Vec::new(),
            },
        );
        true
    }

    pub fn mark_enhanced(&self, item_id: &str, attributes: Vec<Attribute>) {
        self.records.lock().insert(
            item_id.to_string(),
            CardRecord {
                status: CardStatus::Enhanced,
                attributes,
            },
        );
    }

    pub fn mark_errored(&self, item_id: &str) {
        self.records.lock().insert(
            item_id.to_string(),
            CardRecord {
                status: CardStatus::Errored,
                attributes: Vec::new(),
            },
        );
    }

    /// Replace the cached attributes of an enhanced item.
    ///
    /// Leaves the record alone if it is not enhanced, e.g. after a reset
    /// raced with a re-enhancement.
    pub fn refresh_attributes(&self, item_id: &str, attributes: Vec<Attribute>) -> bool {
        match self.records.lock().get_mut(item_id) {
            Some(record) if record.status == CardStatus::Enhanced => {
                record.attributes = attributes;
                true
            }
            _ => false,
        }
    }

    pub fn enhanced_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .records
            .lock()
            .iter()
            .filter(|(_, r)| r.status == CardStatus::Enhanced)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Forget every record.
    pub fn reset(&self) -> usize {
        let mut records = self.records.lock();
        let count = records.len();
        records.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
