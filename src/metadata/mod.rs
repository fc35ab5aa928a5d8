//! Item metadata: wire model, credentials, the single-flight cache and the
//! fetcher that ties them together.

pub mod cache;
pub mod client;
pub mod credentials;
pub mod model;

pub use cache::*;
pub use client::*;
pub use credentials::*;
pub use model::*;
