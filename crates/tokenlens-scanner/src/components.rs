use crate::{visit_scope_roots, ScanContext, ScanScope};
use std::collections::{HashMap, HashSet};
use tokenlens_common::Result;
use tokenlens_document::{DesignHost, Node};
use tracing::debug;

/// Instance usage for one traversal pass: component id to referencing node
/// ids, with the same set semantics as variable usage.
#[derive(Debug, Default)]
pub struct InstanceScan {
    pub used_components: HashMap<String, HashSet<String>>,
    pub selection_info: Option<String>,
}

/// Structural twin of [`crate::UsageScanner`] for component instances: no
/// binding slots to unpack and no unbound classification, just which
/// components are instantiated where.
pub struct ComponentScanner;

impl ComponentScanner {
    pub fn new() -> Self {
        Self
    }

    pub async fn scan(
        &self,
        host: &dyn DesignHost,
        scope: ScanScope,
        ctx: &ScanContext,
    ) -> Result<InstanceScan> {
        let mut scan = InstanceScan::default();
        let info = visit_scope_roots(host, scope, ctx, |root| Self::walk(root, &mut scan)).await?;
        scan.selection_info = info;
        debug!(components = scan.used_components.len(), "instance traversal finished");
        Ok(scan)
    }

    fn walk(node: &Node, scan: &mut InstanceScan) {
        if let Some(component_id) = node.component_ref() {
            scan.used_components
                .entry(component_id.to_string())
                .or_default()
                .insert(node.id().to_string());
        }
        for child in node.children() {
            Self::walk(child, scan);
        }
    }
}

impl Default for ComponentScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokenlens_document::{DocumentSnapshot, InstanceNode, PageNode, SnapshotHost};

    fn instance(id: &str, component_id: &str, children: Vec<Node>) -> Node {
        Node::Instance(InstanceNode {
            id: id.to_string(),
            name: format!("Instance {id}"),
            component_id: component_id.to_string(),
            children,
            fills: Vec::new(),
            strokes: Vec::new(),
            bound_variables: Default::default(),
        })
    }

    #[tokio::test]
    async fn collects_nested_instances_with_set_semantics() {
        let inner = instance("2:2", "C:button", Vec::new());
        let host = SnapshotHost::new(DocumentSnapshot {
            id: "doc".to_string(),
            pages: vec![Node::Page(PageNode {
                id: "0:1".to_string(),
                name: "Page 1".to_string(),
                children: vec![
                    instance("2:1", "C:card", vec![inner]),
                    instance("2:3", "C:button", Vec::new()),
                ],
            })],
            ..Default::default()
        });

        let scan = ComponentScanner::new()
            .scan(&host, ScanScope::Page, &ScanContext::default())
            .await
            .unwrap();

        assert_eq!(scan.used_components.len(), 2);
        assert_eq!(scan.used_components.get("C:button").unwrap().len(), 2);
        assert_eq!(scan.used_components.get("C:card").unwrap().len(), 1);
    }
}
