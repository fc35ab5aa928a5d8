//! Card enhancement pipeline.
//!
//! Coordinates, per pass:
//! - Card discovery and de-duplication by item id
//! - Metadata fetch through the shared cache
//! - Attribute derivation
//! - Rendering and terminal state marking
//!
//! plus forced re-enhancement when display settings change.

pub mod context;
pub mod orchestrator;
pub mod reenhance;
pub mod state;

pub use context::*;
pub use orchestrator::*;
pub use reenhance::*;
pub use state::*;
