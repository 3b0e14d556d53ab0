use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tokenlens_document::{DesignHost, KeyValueStore, Node, Paint};
use tracing::debug;

pub use tokenlens_common::Result;

/// Kinds of by-value suppressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IgnoreValueKind {
    Stroke,
    Fill,
    TextNoStyle,
}

impl FromStr for IgnoreValueKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "stroke" => Ok(IgnoreValueKind::Stroke),
            "fill" => Ok(IgnoreValueKind::Fill),
            "text-no-style" => Ok(IgnoreValueKind::TextNoStyle),
            other => Err(format!(
                "unknown value kind \"{other}\" (expected stroke, fill or text-no-style)"
            )),
        }
    }
}

/// A value-pattern suppression: every current or future unbound element
/// matching this value stays hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoredValue {
    pub value_type: IgnoreValueKind,
    pub value: String,
}

/// Both suppression lists for one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IgnoreLists {
    pub ids: Vec<String>,
    pub values: Vec<IgnoredValue>,
}

/// Display metadata for one by-id suppression, resolved at read time.
#[derive(Debug, Clone, Serialize)]
pub struct IgnoredElementInfo {
    pub id: String,
    pub name: String,
    pub node_type: String,
    pub page: String,
    pub details: Option<String>,
}

/// Aggregate read of both lists with current node metadata attached.
#[derive(Debug, Clone, Serialize)]
pub struct IgnoreSnapshot {
    pub elements: Vec<IgnoredElementInfo>,
    pub values: Vec<IgnoredValue>,
}

/// Per-document suppression lists persisted through the host's key-value
/// storage. Writes happen only on explicit user actions; scans read the
/// lists once at filter time.
pub struct IgnoreStore {
    store: Arc<dyn KeyValueStore>,
}

impl IgnoreStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn elements_key(document_id: &str) -> String {
        format!("ignored-elements/{document_id}")
    }

    fn values_key(document_id: &str) -> String {
        format!("ignored-values/{document_id}")
    }

    pub async fn lists(&self, document_id: &str) -> Result<IgnoreLists> {
        let ids = match self.store.get(&Self::elements_key(document_id)).await? {
            Some(value) => serde_json::from_value(value)?,
            None => Vec::new(),
        };
        let values = match self.store.get(&Self::values_key(document_id)).await? {
            Some(value) => serde_json::from_value(value)?,
            None => Vec::new(),
        };
        Ok(IgnoreLists { ids, values })
    }

    pub async fn ignore_element(&self, document_id: &str, node_id: &str) -> Result<()> {
        let mut lists = self.lists(document_id).await?;
        if !lists.ids.iter().any(|id| id == node_id) {
            lists.ids.push(node_id.to_string());
            self.write_ids(document_id, &lists.ids).await?;
            debug!(node_id, "ignored element");
        }
        Ok(())
    }

    pub async fn unignore_element(&self, document_id: &str, node_id: &str) -> Result<()> {
        let mut lists = self.lists(document_id).await?;
        let before = lists.ids.len();
        lists.ids.retain(|id| id != node_id);
        if lists.ids.len() != before {
            self.write_ids(document_id, &lists.ids).await?;
        }
        Ok(())
    }

    /// Idempotent: re-adding an existing `(value_type, value)` pair is a
    /// no-op.
    pub async fn ignore_value(&self, document_id: &str, entry: IgnoredValue) -> Result<()> {
        let mut lists = self.lists(document_id).await?;
        if !lists.values.contains(&entry) {
            lists.values.push(entry);
            self.write_values(document_id, &lists.values).await?;
        }
        Ok(())
    }

    pub async fn unignore_value(&self, document_id: &str, entry: &IgnoredValue) -> Result<()> {
        let mut lists = self.lists(document_id).await?;
        let before = lists.values.len();
        lists.values.retain(|existing| existing != entry);
        if lists.values.len() != before {
            self.write_values(document_id, &lists.values).await?;
        }
        Ok(())
    }

    /// Read both lists and resolve each by-id entry's current display
    /// metadata. Entries whose node no longer exists are kept, marked
    /// `"(Deleted)"`.
    pub async fn snapshot(&self, document_id: &str, host: &dyn DesignHost) -> Result<IgnoreSnapshot> {
        let lists = self.lists(document_id).await?;
        let mut elements = Vec::with_capacity(lists.ids.len());
        for id in &lists.ids {
            let info = match host.find_node(id).await? {
                Some(hit) => IgnoredElementInfo {
                    id: id.clone(),
                    name: hit.node.name().to_string(),
                    node_type: hit.node.kind_name().to_string(),
                    page: hit.page_name,
                    details: node_details(&hit.node),
                },
                None => IgnoredElementInfo {
                    id: id.clone(),
                    name: "(Deleted)".to_string(),
                    node_type: String::new(),
                    page: String::new(),
                    details: None,
                },
            };
            elements.push(info);
        }
        Ok(IgnoreSnapshot {
            elements,
            values: lists.values,
        })
    }

    async fn write_ids(&self, document_id: &str, ids: &[String]) -> Result<()> {
        self.store
            .set(&Self::elements_key(document_id), serde_json::to_value(ids)?)
            .await
    }

    async fn write_values(&self, document_id: &str, values: &[IgnoredValue]) -> Result<()> {
        self.store
            .set(&Self::values_key(document_id), serde_json::to_value(values)?)
            .await
    }
}

/// A short human-readable description of the node: its first visible solid
/// fill as hex, or a text excerpt.
fn node_details(node: &Node) -> Option<String> {
    let fill = node
        .fills()
        .iter()
        .filter_map(Paint::as_solid)
        .find(|solid| solid.visible)
        .map(|solid| solid.color.to_hex());
    if fill.is_some() {
        return fill;
    }
    node.as_text().map(|text| {
        let mut excerpt: String = text.characters.chars().take(24).collect();
        if text.characters.chars().count() > 24 {
            excerpt.push_str("...");
        }
        excerpt
    })
}
