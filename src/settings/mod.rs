//! User settings.
//!
//! Display toggles and the store that holds the current snapshot and
//! notifies subscribers when it changes.

pub mod options;
pub mod store;

pub use options::*;
pub use store::*;
