use crate::{
    ComponentRecord, DesignHost, KeyValueStore, Node, NodeHit, Variable, VariableCollection,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use tokenlens_common::{Result, TokenlensError};

/// A self-contained document snapshot, deserializable from JSON. Backs the
/// CLI and the test fixtures with a [`DesignHost`] that needs no live host
/// connection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub id: String,
    #[serde(default)]
    pub pages: Vec<Node>,
    /// Page id treated as the current page; defaults to the first page.
    #[serde(default)]
    pub current_page: Option<String>,
    /// Node ids treated as the current selection.
    #[serde(default)]
    pub selection: Vec<String>,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub collections: Vec<VariableCollection>,
    #[serde(default)]
    pub components: Vec<ComponentRecord>,
    /// Keys of remote-library collections still reachable from this document.
    #[serde(default)]
    pub library_keys: Vec<String>,
}

/// [`DesignHost`] implementation over a [`DocumentSnapshot`].
pub struct SnapshotHost {
    snapshot: DocumentSnapshot,
    variables: HashMap<String, Variable>,
    collections: HashMap<String, VariableCollection>,
    components: HashMap<String, ComponentRecord>,
}

impl SnapshotHost {
    pub fn new(snapshot: DocumentSnapshot) -> Self {
        let variables = snapshot
            .variables
            .iter()
            .map(|v| (v.id.clone(), v.clone()))
            .collect();
        let collections = snapshot
            .collections
            .iter()
            .map(|c| (c.id.clone(), c.clone()))
            .collect();
        let components = snapshot
            .components
            .iter()
            .map(|c| (c.id.clone(), c.clone()))
            .collect();
        Self {
            snapshot,
            variables,
            collections,
            components,
        }
    }

    fn locate(&self, id: &str) -> Option<NodeHit> {
        for page in &self.snapshot.pages {
            if let Some(node) = find_in_subtree(page, id) {
                return Some(NodeHit {
                    node: node.clone(),
                    page_name: page.name().to_string(),
                });
            }
        }
        None
    }
}

fn find_in_subtree<'a>(root: &'a Node, id: &str) -> Option<&'a Node> {
    if root.id() == id {
        return Some(root);
    }
    root.children()
        .iter()
        .find_map(|child| find_in_subtree(child, id))
}

#[async_trait]
impl DesignHost for SnapshotHost {
    async fn document_id(&self) -> Result<String> {
        Ok(self.snapshot.id.clone())
    }

    async fn current_page(&self) -> Result<Node> {
        let page = match &self.snapshot.current_page {
            Some(id) => self.snapshot.pages.iter().find(|p| p.id() == id.as_str()),
            None => self.snapshot.pages.first(),
        };
        page.cloned()
            .ok_or_else(|| TokenlensError::Host("document has no current page".to_string()))
    }

    async fn pages(&self) -> Result<Vec<Node>> {
        Ok(self.snapshot.pages.clone())
    }

    async fn selection(&self) -> Result<Vec<Node>> {
        let mut roots = Vec::with_capacity(self.snapshot.selection.len());
        for id in &self.snapshot.selection {
            if let Some(hit) = self.locate(id) {
                roots.push(hit.node);
            }
        }
        Ok(roots)
    }

    async fn variable(&self, id: &str) -> Result<Option<Variable>> {
        Ok(self.variables.get(id).cloned())
    }

    async fn collection(&self, id: &str) -> Result<Option<VariableCollection>> {
        Ok(self.collections.get(id).cloned())
    }

    async fn component(&self, id: &str) -> Result<Option<ComponentRecord>> {
        Ok(self.components.get(id).cloned())
    }

    async fn available_library_keys(&self) -> Result<Vec<String>> {
        Ok(self.snapshot.library_keys.clone())
    }

    async fn find_node(&self, id: &str) -> Result<Option<NodeHit>> {
        Ok(self.locate(id))
    }
}

/// In-memory [`KeyValueStore`], used by tests and short-lived tooling runs.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| TokenlensError::Storage("memory store poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| TokenlensError::Storage("memory store poisoned".to_string()))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}
