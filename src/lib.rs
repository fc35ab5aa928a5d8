//! CardLens Core - movie card enhancement pipeline
//!
//! Enriches media-server movie cards with file-level attributes (size,
//! filename, container, resolution, dynamic range, audio language) fetched
//! from the server's item metadata endpoint. The implementation prioritizes:
//!
//! 1. **Idempotence** - Each card is enhanced at most once until a reset
//! 2. **Isolation** - One card's failure never affects its siblings
//! 3. **Logging** - Every pass and per-card decision logged with context
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `metadata` - Item model, credentials, single-flight cache and fetcher
//! - `attributes` - Metadata to tagged display attributes
//! - `render` - Attribute block and action button injection
//! - `pipeline` - Enhancement pass, card state and re-enhancement
//! - `scheduler` - Debounced passes driven by document changes
//! - `dom` - In-memory card document the pipeline operates on
//! - `settings` - Display toggles and their change notifications
//! - `logging` - Structured logging with pass and item context

use std::sync::Arc;

pub mod attributes;
pub mod config;
pub mod dom;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod pipeline;
pub mod render;
pub mod scheduler;
pub mod settings;

#[cfg(test)]
mod test_support;

pub use config::EnhancerConfig;
pub use error::{FetchError, PassError, SettingsError};
pub use logging::init_logger;

use dom::Document;
use metadata::client::ItemFetcher;
use pipeline::Orchestrator;
use scheduler::{Scheduler, SchedulerHandle};
use settings::{SettingsStore, Subscription};

/// A running enhancer: scheduler plus settings-driven re-enhancement.
///
/// Dropping it stops scheduling just like `shutdown()`.
pub struct Enhancer {
    orchestrator: Orchestrator,
    scheduler: SchedulerHandle,
    settings_subscription: Option<Subscription>,
}

impl Enhancer {
    /// Wire everything up and run the initial pass.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        document: Document,
        fetcher: Arc<ItemFetcher>,
        settings: SettingsStore,
    ) -> Result<Self, FetchError> {
        let base = fetcher.config().api_base()?;
        let orchestrator = Orchestrator::new(document.clone(), Arc::clone(&fetcher), settings.clone());

        // [1] RESET
        orchestrator.reset();

        // [2] SCHEDULE
        let scheduler = Scheduler::start(
            Arc::new(orchestrator.clone()),
            document.subscribe(),
            fetcher.config().debounce(),
        );

        // [3] RE-ENHANCE ON SETTINGS CHANGE
        let runtime = tokio::runtime::Handle::current();
        let re_enhancer = orchestrator.re_enhancer();
        let subscription = settings.on_change(move |_| {
            let re_enhancer = re_enhancer.clone();
            runtime.spawn(async move {
                re_enhancer.run().await;
            });
        });

        log::info!("ENHANCER_STARTED base_url={}", base);
        Ok(Self {
            orchestrator,
            scheduler,
            settings_subscription: Some(subscription),
        })
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn trigger_enhance(&self) {
        self.scheduler.trigger_enhance();
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_connected()
    }

    /// Stop scheduling passes and stop reacting to settings changes.
    pub fn shutdown(&mut self) {
        self.scheduler.disconnect();
        if self.settings_subscription.take().is_some() {
            log::info!("ENHANCER_SHUTDOWN");
        }
    }
}

impl Drop for Enhancer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
