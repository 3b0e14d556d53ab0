use serde::Serialize;
use tokenlens_document::{Mode, VariableType, VariableValue};
use tokenlens_scanner::UnboundElement;

/// One rendered table cell: a literal passed through for downstream
/// interpretation, or an alias rendered to the referenced variable's name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellValue {
    Literal { value: VariableValue },
    Alias { label: String },
    /// The variable defines no value under this mode.
    Unset,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeCell {
    pub mode_id: String,
    pub value: CellValue,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariableRow {
    pub id: String,
    pub name: String,
    pub resolved_type: VariableType,
    /// Cells aligned with the owning collection's declared mode order.
    pub values: Vec<ModeCell>,
    pub node_ids: Vec<String>,
}

/// A collection with at least one in-scope variable, ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionData {
    pub id: String,
    pub name: String,
    pub modes: Vec<Mode>,
    pub remote: bool,
    /// Remote, and the backing library is no longer enumerable.
    pub is_ghost: bool,
    pub library_name: Option<String>,
    pub variables: Vec<VariableRow>,
}

/// Everything one variable scan returns.
#[derive(Debug, Serialize)]
pub struct ScanOutput {
    pub collections: Vec<CollectionData>,
    pub unbound_elements: Vec<UnboundElement>,
    pub selection_info: Option<String>,
    pub scope_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentRow {
    pub id: String,
    pub name: String,
    pub node_ids: Vec<String>,
}

/// Components used in scope, bucketed by owning library.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentLibraryData {
    pub key: String,
    pub name: String,
    pub remote: bool,
    pub is_ghost: bool,
    pub components: Vec<ComponentRow>,
}

#[derive(Debug, Serialize)]
pub struct ComponentOutput {
    pub libraries: Vec<ComponentLibraryData>,
    pub selection_info: Option<String>,
    pub scope_name: String,
}
