//! Structured logging with pass context.
//!
//! Every log line emitted while enhancing cards carries the pass id and,
//! where it applies, the item id so a card's history can be grepped out.

pub mod structured;

pub use structured::*;
