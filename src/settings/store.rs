//! In-memory settings with change notification.
//!
//! Persistence itself belongs to the host: it hands this store the JSON blob
//! saved under `STORAGE_KEY` and forwards storage-change events. Listeners
//! fire only when the effective options change.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::error::SettingsError;
use crate::settings::options::DisplayOptions;

/// Key the settings blob is stored under.
pub const STORAGE_KEY: &str = "movieAttributesSettings";

type Listener = Arc<dyn Fn(&DisplayOptions) + Send + Sync>;

#[derive(Default)]
struct Inner {
    current: RwLock<DisplayOptions>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
}

/// Shared handle to the current display options.
#[derive(Clone, Default)]
pub struct SettingsStore {
    inner: Arc<Inner>,
}

/// Keeps a change listener registered until dropped.
pub struct Subscription {
    id: u64,
    store: Weak<Inner>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner.listeners.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DisplayOptions) -> Self {
        let store = Self::default();
        *store.inner.current.write() = options;
        store
    }

    /// Snapshot of the options in force right now.
    pub fn current(&self) -> DisplayOptions {
        *self.inner.current.read()
    }

    /// Apply `change` and notify listeners if anything actually changed.
    pub fn update<F>(&self, change: F) -> bool
    where
        F: FnOnce(&mut DisplayOptions),
    {
        let mut next = self.current();
        change(&mut next);
        self.replace(next)
    }

    /// Install the blob loaded from storage, merged over the defaults.
    pub fn load_json(&self, blob: &str) -> Result<DisplayOptions, SettingsError> {
        let value: Value = serde_json::from_str(blob)?;
        let options = options_from_value(value)?;
        self.replace(options);
        Ok(options)
    }

    /// Handle a storage-change event raised by another context.
    ///
    /// Returns false when the event is for another key or carries no object.
    pub fn apply_storage_change(&self, key: &str, new_value: &Value) -> bool {
        if key != STORAGE_KEY {
            return false;
        }
        match options_from_value(new_value.clone()) {
            Ok(options) => {
                self.replace(options);
                true
            }
            Err(e) => {
                log::warn!("SETTINGS_CHANGE_IGNORED key={} error={}", key, e);
                false
            }
        }
    }

    /// Blob to persist under `STORAGE_KEY`.
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(&self.current())?)
    }

    /// Register a listener called with the new options after each change.
    pub fn on_change<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&DisplayOptions) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));
        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    fn replace(&self, next: DisplayOptions) -> bool {
        {
            let mut current = self.inner.current.write();
            if *current == next {
                return false;
            }
            *current = next;
        }
        log::info!("SETTINGS_CHANGED options={:?}", next);

        // Listeners may read the store, so call them without holding a lock
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(&next);
        }
        true
    }
}

fn options_from_value(value: Value) -> Result<DisplayOptions, SettingsError> {
    if !value.is_object() {
        return Err(SettingsError::NotAnObject);
    }
    Ok(serde_json::from_value(value)?)
}
