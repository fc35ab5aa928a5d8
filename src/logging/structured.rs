//! Log line prefixes.
//!
//! A `LogContext` is an ordered list of `key=value` pairs rendered as
//! `[pass=pass-1a2b3c4d] [item=abc]`. Passes start one and narrow it per
//! item, so every line about a card can be grepped out by either key.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogContext {
    fields: Vec<(&'static str, String)>,
}

impl LogContext {
    /// Context for the pass with the given id.
    pub fn new(pass_id: &str) -> Self {
        Self::default().with("pass", pass_id)
    }

    /// A copy with one more field appended.
    pub fn with(&self, key: &'static str, value: impl fmt::Display) -> Self {
        let mut fields = self.fields.clone();
        fields.push((key, value.to_string()));
        Self { fields }
    }

    pub fn with_item(&self, item_id: &str) -> Self {
        self.with("item", item_id)
    }

    /// Most recent value recorded under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "[{}={}]", key, value)?;
        }
        Ok(())
    }
}

/// Install the `env_logger` backend.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_millis()
        .try_init();
}
