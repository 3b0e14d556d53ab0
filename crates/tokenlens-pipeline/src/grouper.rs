use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use tokenlens_common::Result;
use tokenlens_document::{DesignHost, Variable};
use tracing::debug;

/// A resolved variable together with the nodes that reference it.
#[derive(Debug, Clone)]
pub struct GroupedVariable {
    pub variable: Variable,
    pub node_ids: Vec<String>,
}

/// Resolves raw usage into full variable records grouped by owning
/// collection. Variables that no longer resolve (deleted, permission
/// errors) are dropped, not surfaced.
pub struct UsageGrouper;

impl UsageGrouper {
    pub async fn group(
        host: &dyn DesignHost,
        used: &HashMap<String, HashSet<String>>,
    ) -> Result<HashMap<String, Vec<GroupedVariable>>> {
        let lookups = used
            .iter()
            .map(|(id, nodes)| async move { (id, nodes, host.variable(id).await) });
        let resolved = join_all(lookups).await;

        let mut grouped: HashMap<String, Vec<GroupedVariable>> = HashMap::new();
        let mut dropped = 0usize;
        for (id, nodes, result) in resolved {
            match result {
                Ok(Some(variable)) => {
                    let mut node_ids: Vec<String> = nodes.iter().cloned().collect();
                    node_ids.sort();
                    grouped
                        .entry(variable.collection_id.clone())
                        .or_default()
                        .push(GroupedVariable { variable, node_ids });
                }
                Ok(None) => dropped += 1,
                Err(err) => {
                    dropped += 1;
                    debug!(%id, error = %err, "variable lookup failed");
                }
            }
        }
        if dropped > 0 {
            debug!(dropped, "used variables did not resolve");
        }
        Ok(grouped)
    }
}
