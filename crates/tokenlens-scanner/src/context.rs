use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Out-of-band progress notification emitted after each page of a
/// document-wide scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanProgress {
    pub current: usize,
    pub total: usize,
    pub scope_name: String,
}

/// Receives progress notifications during document-wide scans.
pub trait ProgressSink: Send + Sync {
    fn notify(&self, progress: &ScanProgress);
}

/// Cooperative cancellation for document-wide scans. Checked at each
/// between-page yield point; there is no mid-page abort.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-invocation scan state, threaded through the pipeline instead of
/// living in module-level globals.
#[derive(Clone, Default)]
pub struct ScanContext {
    pub progress: Option<Arc<dyn ProgressSink>>,
    pub cancel: CancelFlag,
}

impl ScanContext {
    pub fn with_progress(sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            progress: Some(sink),
            cancel: CancelFlag::new(),
        }
    }

    pub fn report(&self, progress: &ScanProgress) {
        if let Some(sink) = &self.progress {
            sink.notify(progress);
        }
    }
}
