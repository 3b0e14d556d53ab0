use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokenlens_common::Rgba;

/// The value a variable carries under one mode: a literal, or an alias
/// pointing at another variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariableValue {
    Color(Rgba),
    Float { value: f64 },
    Text { value: String },
    Flag { value: bool },
    Alias { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariableType {
    Color,
    Float,
    String,
    Boolean,
}

/// A design token: named, typed, with one value per mode of its collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub id: String,
    pub name: String,
    pub resolved_type: VariableType,
    #[serde(default)]
    pub values_by_mode: HashMap<String, VariableValue>,
    pub collection_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mode {
    pub mode_id: String,
    pub name: String,
}

/// A group of variables sharing the same set of modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableCollection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub modes: Vec<Mode>,
    #[serde(default)]
    pub remote: bool,
    #[serde(default)]
    pub key: String,
}

/// A component definition an instance node points back to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub remote: bool,
    /// Name of the owning shared library, when the component is remote.
    #[serde(default)]
    pub library_name: Option<String>,
}
