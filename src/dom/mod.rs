//! Host document model.
//!
//! Cards, their text containers and enhancement markers, plus the
//! structural-change stream the scheduler listens to.

pub mod document;
pub mod element;

pub use document::*;
pub use element::*;
