//! Scheduling of enhancement passes off document changes.

pub mod debounce;
pub mod observer;

pub use debounce::*;
pub use observer::*;
