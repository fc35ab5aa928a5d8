//! Card rendering.
//!
//! Pure mutations of a single card: the attribute block and the optional
//! action buttons.

pub mod block;
pub mod buttons;

pub use block::*;
pub use buttons::*;
