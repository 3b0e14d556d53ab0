mod collections;
mod components;
mod coordinator;
mod enricher;
mod filter;
mod grouper;
mod output;
mod policy;

pub use collections::CollectionResolver;
pub use components::LOCAL_LIBRARY_KEY;
pub use coordinator::ScanCoordinator;
pub use enricher::{CollectionEnricher, UNKNOWN_ALIAS};
pub use filter::IgnoreFilter;
pub use grouper::{GroupedVariable, UsageGrouper};
pub use output::{
    CellValue, CollectionData, ComponentLibraryData, ComponentOutput, ComponentRow, ModeCell,
    ScanOutput, VariableRow,
};
pub use policy::{evaluate_edit, EditDecision};
