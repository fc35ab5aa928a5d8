//! Change-driven pass scheduling.
//!
//! One pass runs on start. After that, every structural addition (after a
//! yield, so a batched insertion lands first) restarts a quiet window, and
//! one pass runs when the window elapses. `disconnect()` is terminal: no
//! pass starts after it, though a pass already running is left to finish.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};

use crate::dom::StructuralChange;
use crate::error::PassError;

use super::debounce::Debouncer;

/// Something that can run one enhancement pass.
#[async_trait]
pub trait PassRunner: Send + Sync {
    async fn run_pass(&self) -> Result<usize, PassError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassReason {
    Initial,
    Debounced,
}

impl PassReason {
    fn as_str(self) -> &'static str {
        match self {
            PassReason::Initial => "initial",
            PassReason::Debounced => "debounced",
        }
    }
}

pub struct Scheduler;

impl Scheduler {
    /// Run the initial pass and start observing `changes`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        runner: Arc<dyn PassRunner>,
        changes: broadcast::Receiver<StructuralChange>,
        quiet: Duration,
    ) -> SchedulerHandle {
        let connected = Arc::new(AtomicBool::new(true));
        let (stop_tx, stop_rx) = watch::channel(false);
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();

        spawn_pass(&runner, &connected, PassReason::Initial);

        let driver = Driver {
            runner,
            connected: Arc::clone(&connected),
            debouncer: Debouncer::new(quiet),
        };
        tokio::spawn(driver.run(changes, trigger_rx, stop_rx));
        log::info!("SCHEDULER_STARTED quiet_ms={}", quiet.as_millis());

        SchedulerHandle {
            connected,
            stop: stop_tx,
            trigger: trigger_tx,
        }
    }
}

/// Control handle for a running scheduler. Dropping it disconnects.
pub struct SchedulerHandle {
    connected: Arc<AtomicBool>,
    stop: watch::Sender<bool>,
    trigger: mpsc::UnboundedSender<()>,
}

impl SchedulerHandle {
    /// Stop observing and cancel any pending window. Idempotent.
    pub fn disconnect(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            // The driver may already be gone
            let _ = self.stop.send(true);
            log::info!("SCHEDULER_DISCONNECTED");
        }
    }

    /// Schedule a pass through the same debounced path as a DOM change.
    pub fn trigger_enhance(&self) {
        if self.is_connected() {
            let _ = self.trigger.send(());
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.disconnect();
    }
}

struct Driver {
    runner: Arc<dyn PassRunner>,
    connected: Arc<AtomicBool>,
    debouncer: Debouncer,
}

impl Driver {
    async fn run(
        mut self,
        mut changes: broadcast::Receiver<StructuralChange>,
        mut triggers: mpsc::UnboundedReceiver<()>,
        mut stop: watch::Receiver<bool>,
    ) {
        let mut observing = true;
        loop {
            let armed = self.debouncer.is_armed();
            let wake = self
                .debouncer
                .deadline()
                .unwrap_or_else(|| Instant::now() + self.debouncer.quiet());

            tokio::select! {
                biased;
                _ = stop.changed() => break,
                result = changes.recv(), if observing => match result {
                    Ok(change) if change.has_additions() => self.schedule().await,
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        log::debug!("SCHEDULER_LAGGED skipped={}", skipped);
                        self.schedule().await;
                    }
                    Err(RecvError::Closed) => {
                        log::debug!("SCHEDULER_SOURCE_CLOSED");
                        observing = false;
                    }
                },
                Some(()) = triggers.recv() => self.schedule().await,
                _ = sleep_until(wake), if armed => {
                    if self.debouncer.fire(Instant::now()) {
                        spawn_pass(&self.runner, &self.connected, PassReason::Debounced);
                    }
                }
            }
        }
        self.debouncer.cancel();
        log::debug!("SCHEDULER_STOPPED");
    }

    async fn schedule(&mut self) {
        // Let the rest of a batched insertion land first
        tokio::task::yield_now().await;
        self.debouncer.poke(Instant::now());
    }
}

fn spawn_pass(runner: &Arc<dyn PassRunner>, connected: &Arc<AtomicBool>, reason: PassReason) {
    if !connected.load(Ordering::SeqCst) {
        return;
    }
    let runner = Arc::clone(runner);
    let connected = Arc::clone(connected);
    tokio::spawn(async move {
        // Disconnected between scheduling and start
        if !connected.load(Ordering::SeqCst) {
            log::debug!("PASS_SKIPPED reason={} cause=disconnected", reason.as_str());
            return;
        }
        match runner.run_pass().await {
            Ok(rendered) => {
                log::debug!("PASS_DONE reason={} rendered={}", reason.as_str(), rendered)
            }
            Err(e) => log::warn!("PASS_FAILED reason={} error={}", reason.as_str(), e),
        }
    });
}
