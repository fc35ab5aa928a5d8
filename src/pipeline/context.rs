//! Pass context.
//!
//! Every enhancement or re-enhancement pass gets a short id and a start
//! time so its log lines can be correlated.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::logging::structured::LogContext;

/// What triggered a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Scheduled: initial, debounced change, or explicit trigger.
    Enhance,
    /// Settings changed; already-enhanced cards are re-rendered.
    ReEnhance,
}

impl PassKind {
    pub fn prefix(self) -> &'static str {
        match self {
            PassKind::Enhance => "pass",
            PassKind::ReEnhance => "reenhance",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PassContext {
    pub pass_id: String,
    pub kind: PassKind,
    pub started_at: DateTime<Utc>,
}

impl PassContext {
    pub fn new(kind: PassKind) -> Self {
        let pass_id = format!("{}-{}", kind.prefix(), &Uuid::new_v4().to_string()[..8]);
        Self {
            pass_id,
            kind,
            started_at: Utc::now(),
        }
    }

    pub fn log_context(&self) -> LogContext {
        LogContext::new(&self.pass_id)
    }

    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_ids_are_prefixed_and_unique() {
        let a = PassContext::new(PassKind::Enhance);
        let b = PassContext::new(PassKind::Enhance);
        assert!(a.pass_id.starts_with("pass-"));
        assert_eq!(a.pass_id.len(), "pass-".len() + 8);
        assert_ne!(a.pass_id, b.pass_id);

        let r = PassContext::new(PassKind::ReEnhance);
        assert!(r.pass_id.starts_with("reenhance-"));
    }

    #[test]
    fn test_log_context_carries_pass_id() {
        let ctx = PassContext::new(PassKind::Enhance);
        assert_eq!(ctx.log_context().to_string(), format!("[pass={}]", ctx.pass_id));
        assert!(ctx.elapsed_ms() >= 0);
    }
}
