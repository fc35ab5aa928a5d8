//! Attribute derivation.
//!
//! Turns item metadata plus display options into the ordered, tagged
//! strings that get injected into a card.

pub mod category;
pub mod derive;
pub mod format;

pub use category::*;
pub use derive::*;
pub use format::*;
