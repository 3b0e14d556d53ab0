mod components;
mod config;
mod context;
mod scanner;
mod scope;

pub use components::{ComponentScanner, InstanceScan};
pub use config::{GhostPolicy, ScanConfig};
pub use context::{CancelFlag, ProgressSink, ScanContext, ScanProgress};
pub use scanner::{TreeScan, UnboundElement, UnboundKind, UsageScanner};
pub use scope::{format_selection_names, visit_scope_roots, ScanScope};
