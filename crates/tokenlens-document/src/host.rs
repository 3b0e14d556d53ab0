use crate::{ComponentRecord, Node, Variable, VariableCollection};
use async_trait::async_trait;
use serde_json::Value;
use tokenlens_common::Result;

/// Where a node was found when looked up by id.
#[derive(Debug, Clone)]
pub struct NodeHit {
    pub node: Node,
    pub page_name: String,
}

/// Read-only oracle over the open document: tree roots, token and collection
/// records, and the set of currently reachable remote libraries. All lookups
/// return a fresh snapshot; the scanner never mutates through this trait.
#[async_trait]
pub trait DesignHost: Send + Sync {
    /// Stable identifier of the open document, used to namespace persisted
    /// state.
    async fn document_id(&self) -> Result<String>;

    async fn current_page(&self) -> Result<Node>;

    async fn pages(&self) -> Result<Vec<Node>>;

    /// The currently selected nodes, each returned as an independent root.
    async fn selection(&self) -> Result<Vec<Node>>;

    /// Resolve a normalized variable id. `Ok(None)` means the variable does
    /// not exist (deleted, or never known to this document).
    async fn variable(&self, id: &str) -> Result<Option<Variable>>;

    async fn collection(&self, id: &str) -> Result<Option<VariableCollection>>;

    async fn component(&self, id: &str) -> Result<Option<ComponentRecord>>;

    /// Keys of every remote-library collection currently enumerable.
    async fn available_library_keys(&self) -> Result<Vec<String>>;

    /// Look a node up anywhere in the document, reporting the page it lives
    /// on.
    async fn find_node(&self, id: &str) -> Result<Option<NodeHit>>;
}

/// Namespaced JSON persistence supplied by the host platform.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> Result<()>;
}
