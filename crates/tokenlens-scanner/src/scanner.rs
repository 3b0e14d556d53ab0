use crate::{visit_scope_roots, ScanConfig, ScanContext, ScanScope};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tokenlens_common::{normalize_variable_id, Result};
use tokenlens_document::{BoundValue, DesignHost, Node, Paint};
use tracing::debug;

/// How an element styles itself directly instead of referencing a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnboundKind {
    TextNoStyle,
    TextPartialStyle,
    FillNoVariable,
    StrokeNoVariable,
}

impl UnboundKind {
    pub fn label(&self) -> &'static str {
        match self {
            UnboundKind::TextNoStyle => "text-no-style",
            UnboundKind::TextPartialStyle => "text-partial-style",
            UnboundKind::FillNoVariable => "fill-no-variable",
            UnboundKind::StrokeNoVariable => "stroke-no-variable",
        }
    }
}

/// A node flagged for styling itself with a literal value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnboundElement {
    pub id: String,
    pub name: String,
    pub kind: UnboundKind,
    /// Truncated text excerpt or resolved hex color, depending on the kind.
    pub details: Option<String>,
}

/// What one traversal pass produces: token usage keyed by normalized
/// variable id, unbound-element flags, and a scope description.
#[derive(Debug, Default)]
pub struct TreeScan {
    pub used_variables: HashMap<String, HashSet<String>>,
    pub unbound_elements: Vec<UnboundElement>,
    pub selection_info: Option<String>,
}

/// Walks the node tree of a scope, collecting which variables are referenced
/// by which nodes and which elements carry raw styling.
pub struct UsageScanner {
    config: ScanConfig,
}

impl UsageScanner {
    pub fn new() -> Self {
        Self {
            config: ScanConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn scan(
        &self,
        host: &dyn DesignHost,
        scope: ScanScope,
        ctx: &ScanContext,
    ) -> Result<TreeScan> {
        let mut scan = TreeScan::default();
        let info = visit_scope_roots(host, scope, ctx, |root| self.walk(root, &mut scan)).await?;
        scan.selection_info = info;
        debug!(
            variables = scan.used_variables.len(),
            unbound = scan.unbound_elements.len(),
            "traversal finished"
        );
        Ok(scan)
    }

    fn walk(&self, node: &Node, scan: &mut TreeScan) {
        self.collect_bindings(node, scan);
        self.classify(node, scan);
        for child in node.children() {
            self.walk(child, scan);
        }
    }

    /// Record every resolvable bound-variable reference the node exposes,
    /// with set-insert semantics per (variable, node) pair.
    fn collect_bindings(&self, node: &Node, scan: &mut TreeScan) {
        let node_id = node.id();

        for paint in node.fills().iter().chain(node.strokes()) {
            if let Some(raw) = paint.as_solid().and_then(|s| s.bound_variable.as_deref()) {
                record_usage(scan, raw, node_id);
            }
        }

        if let Some(bound) = node.bound_variables() {
            for value in bound.values() {
                match value {
                    BoundValue::Single(raw) => record_usage(scan, raw, node_id),
                    BoundValue::List(entries) => {
                        for raw in entries {
                            record_usage(scan, raw, node_id);
                        }
                    }
                    BoundValue::Keyed(map) => {
                        for raw in map.values() {
                            record_usage(scan, raw, node_id);
                        }
                    }
                }
            }
        }
    }

    /// The four unbound checks are independent; one node can contribute
    /// several flags of different kinds.
    fn classify(&self, node: &Node, scan: &mut TreeScan) {
        if let Some(text) = node.as_text() {
            if text.text_style_id.as_deref().map_or(true, str::is_empty) {
                scan.unbound_elements.push(UnboundElement {
                    id: text.id.clone(),
                    name: text.name.clone(),
                    kind: UnboundKind::TextNoStyle,
                    details: Some(excerpt(&text.characters, self.config.text_excerpt_len)),
                });
            }
            if let Some(color) = first_unbound_solid(node.fills()) {
                scan.unbound_elements.push(UnboundElement {
                    id: text.id.clone(),
                    name: text.name.clone(),
                    kind: UnboundKind::TextPartialStyle,
                    details: Some(color),
                });
            }
        } else if let Some(color) = first_unbound_solid(node.fills()) {
            scan.unbound_elements.push(UnboundElement {
                id: node.id().to_string(),
                name: node.name().to_string(),
                kind: UnboundKind::FillNoVariable,
                details: Some(color),
            });
        }

        if let Some(color) = first_unbound_solid(node.strokes()) {
            scan.unbound_elements.push(UnboundElement {
                id: node.id().to_string(),
                name: node.name().to_string(),
                kind: UnboundKind::StrokeNoVariable,
                details: Some(color),
            });
        }
    }
}

impl Default for UsageScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn record_usage(scan: &mut TreeScan, raw: &str, node_id: &str) {
    let id = normalize_variable_id(raw);
    if id.is_empty() {
        // An unparseable slot skips that slot only, never the node.
        debug!(raw, node_id, "skipping unparseable variable binding");
        return;
    }
    scan.used_variables
        .entry(id)
        .or_default()
        .insert(node_id.to_string());
}

/// First visible solid paint with no variable binding, rendered as hex.
fn first_unbound_solid(paints: &[Paint]) -> Option<String> {
    paints.iter().find_map(|paint| {
        paint
            .as_solid()
            .filter(|solid| solid.visible && solid.bound_variable.is_none())
            .map(|solid| solid.color.to_hex())
    })
}

fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tokenlens_common::Rgba;
    use tokenlens_document::{
        DocumentSnapshot, PageNode, ShapeNode, SnapshotHost, SolidPaint, TextNode,
    };

    fn unbound_solid(hex: &str) -> Paint {
        Paint::Solid(SolidPaint {
            color: Rgba::from_hex(hex).unwrap(),
            visible: true,
            bound_variable: None,
        })
    }

    fn bound_solid(hex: &str, variable: &str) -> Paint {
        Paint::Solid(SolidPaint {
            color: Rgba::from_hex(hex).unwrap(),
            visible: true,
            bound_variable: Some(variable.to_string()),
        })
    }

    fn shape(id: &str, name: &str, fills: Vec<Paint>, strokes: Vec<Paint>) -> Node {
        Node::Shape(ShapeNode {
            id: id.to_string(),
            name: name.to_string(),
            fills,
            strokes,
            bound_variables: BTreeMap::new(),
        })
    }

    fn page_host(children: Vec<Node>) -> SnapshotHost {
        SnapshotHost::new(DocumentSnapshot {
            id: "doc".to_string(),
            pages: vec![Node::Page(PageNode {
                id: "0:1".to_string(),
                name: "Page 1".to_string(),
                children,
            })],
            ..Default::default()
        })
    }

    async fn scan_page(host: &SnapshotHost) -> TreeScan {
        UsageScanner::new()
            .scan(host, ScanScope::Page, &ScanContext::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn same_variable_on_two_slots_counts_once_per_node() {
        let host = page_host(vec![shape(
            "1:1",
            "Badge",
            vec![bound_solid("#112233", "VariableID:7:1")],
            vec![bound_solid("#112233", "VariableID:7:1")],
        )]);
        let scan = scan_page(&host).await;

        let nodes = scan.used_variables.get("7:1").unwrap();
        assert_eq!(nodes.len(), 1);
        assert!(nodes.contains("1:1"));
    }

    #[tokio::test]
    async fn keyed_and_list_bindings_are_collected() {
        let mut bound = BTreeMap::new();
        bound.insert(
            "fills".to_string(),
            BoundValue::List(vec!["VariableID:7:1".to_string(), "VariableID:7:2".to_string()]),
        );
        bound.insert(
            "corner_radii".to_string(),
            BoundValue::Keyed(BTreeMap::from([(
                "top_left".to_string(),
                "VariableID:7:3".to_string(),
            )])),
        );
        let host = page_host(vec![Node::Shape(ShapeNode {
            id: "1:1".to_string(),
            name: "Card".to_string(),
            fills: Vec::new(),
            strokes: Vec::new(),
            bound_variables: bound,
        })]);

        let scan = scan_page(&host).await;
        assert_eq!(scan.used_variables.len(), 3);
        for id in ["7:1", "7:2", "7:3"] {
            assert!(scan.used_variables.contains_key(id), "missing {id}");
        }
    }

    #[tokio::test]
    async fn empty_binding_slot_is_skipped_without_aborting() {
        let host = page_host(vec![
            shape("1:1", "Broken", vec![bound_solid("#112233", "VariableID:")], vec![]),
            shape("1:2", "Fine", vec![bound_solid("#112233", "VariableID:7:1")], vec![]),
        ]);
        let scan = scan_page(&host).await;

        assert_eq!(scan.used_variables.len(), 1);
        assert!(scan.used_variables.contains_key("7:1"));
    }

    #[tokio::test]
    async fn classifies_all_four_unbound_kinds() {
        let styled_text = Node::Text(TextNode {
            id: "1:1".to_string(),
            name: "Label".to_string(),
            characters: "Hello".to_string(),
            text_style_id: Some("S:1".to_string()),
            fills: vec![unbound_solid("#333333")],
            strokes: Vec::new(),
            bound_variables: BTreeMap::new(),
        });
        let unstyled_text = Node::Text(TextNode {
            id: "1:2".to_string(),
            name: "Caption".to_string(),
            characters: "A caption that runs much longer than the excerpt limit".to_string(),
            text_style_id: None,
            fills: Vec::new(),
            strokes: Vec::new(),
            bound_variables: BTreeMap::new(),
        });
        let raw_shape = shape(
            "1:3",
            "Chip",
            vec![unbound_solid("#FF0000")],
            vec![unbound_solid("#00FF00")],
        );
        let host = page_host(vec![styled_text, unstyled_text, raw_shape]);

        let scan = scan_page(&host).await;
        let kinds: Vec<(&str, UnboundKind)> = scan
            .unbound_elements
            .iter()
            .map(|e| (e.id.as_str(), e.kind))
            .collect();

        assert!(kinds.contains(&("1:1", UnboundKind::TextPartialStyle)));
        assert!(kinds.contains(&("1:2", UnboundKind::TextNoStyle)));
        assert!(kinds.contains(&("1:3", UnboundKind::FillNoVariable)));
        assert!(kinds.contains(&("1:3", UnboundKind::StrokeNoVariable)));
        assert_eq!(kinds.len(), 4);

        let caption = scan
            .unbound_elements
            .iter()
            .find(|e| e.kind == UnboundKind::TextNoStyle)
            .unwrap();
        let details = caption.details.as_deref().unwrap();
        assert!(details.ends_with("..."));
        assert!(details.len() < 40);
    }

    #[tokio::test]
    async fn invisible_and_bound_paints_are_not_flagged() {
        let hidden = Paint::Solid(SolidPaint {
            color: Rgba::from_hex("#FF0000").unwrap(),
            visible: false,
            bound_variable: None,
        });
        let host = page_host(vec![shape(
            "1:1",
            "Quiet",
            vec![hidden, bound_solid("#112233", "VariableID:7:1")],
            vec![],
        )]);
        let scan = scan_page(&host).await;
        assert!(scan.unbound_elements.is_empty());
    }

    #[tokio::test]
    async fn scanning_twice_yields_identical_results() {
        let host = page_host(vec![shape(
            "1:1",
            "Chip",
            vec![bound_solid("#112233", "VariableID:7:1")],
            vec![unbound_solid("#FF0000")],
        )]);
        let first = scan_page(&host).await;
        let second = scan_page(&host).await;

        assert_eq!(first.used_variables, second.used_variables);
        assert_eq!(first.unbound_elements, second.unbound_elements);
    }

    #[tokio::test]
    async fn selection_scope_stays_inside_the_selected_roots() {
        let inside = shape("2:1", "Inside", vec![bound_solid("#112233", "VariableID:7:1")], vec![]);
        let selected = Node::Frame(tokenlens_document::FrameNode {
            id: "1:1".to_string(),
            name: "Button".to_string(),
            children: vec![inside],
            fills: Vec::new(),
            strokes: Vec::new(),
            bound_variables: BTreeMap::new(),
        });
        let outside = shape("1:2", "Outside", vec![unbound_solid("#FF0000")], vec![]);

        let host = SnapshotHost::new(DocumentSnapshot {
            id: "doc".to_string(),
            pages: vec![Node::Page(PageNode {
                id: "0:1".to_string(),
                name: "Page 1".to_string(),
                children: vec![selected, outside],
            })],
            selection: vec!["1:1".to_string()],
            ..Default::default()
        });

        let scan = UsageScanner::new()
            .scan(&host, ScanScope::Selection, &ScanContext::default())
            .await
            .unwrap();

        let in_scope: HashSet<&str> = ["1:1", "2:1"].into_iter().collect();
        for nodes in scan.used_variables.values() {
            assert!(nodes.iter().all(|id| in_scope.contains(id.as_str())));
        }
        assert!(scan.unbound_elements.iter().all(|e| in_scope.contains(e.id.as_str())));
        assert_eq!(scan.selection_info.as_deref(), Some("Button"));
    }

    #[tokio::test]
    async fn document_scope_reports_progress_per_page() {
        use crate::ScanProgress;
        use std::sync::Mutex;

        struct Recorder(Mutex<Vec<ScanProgress>>);
        impl crate::ProgressSink for Recorder {
            fn notify(&self, progress: &ScanProgress) {
                self.0.lock().unwrap().push(progress.clone());
            }
        }

        let page = |id: &str, name: &str| {
            Node::Page(PageNode {
                id: id.to_string(),
                name: name.to_string(),
                children: vec![shape(
                    &format!("{id}-s"),
                    "Chip",
                    vec![bound_solid("#112233", "VariableID:7:1")],
                    vec![],
                )],
            })
        };
        let host = SnapshotHost::new(DocumentSnapshot {
            id: "doc".to_string(),
            pages: vec![page("0:1", "Cover"), page("0:2", "Specs")],
            ..Default::default()
        });

        let sink = std::sync::Arc::new(Recorder(Mutex::new(Vec::new())));
        let ctx = ScanContext::with_progress(sink.clone());
        let scan = UsageScanner::new()
            .scan(&host, ScanScope::Document, &ctx)
            .await
            .unwrap();

        assert_eq!(scan.selection_info.as_deref(), Some("2 pages"));
        assert_eq!(scan.used_variables.get("7:1").unwrap().len(), 2);

        let seen = sink.0.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].current, 1);
        assert_eq!(seen[0].total, 2);
        assert_eq!(seen[0].scope_name, "Cover");
        assert_eq!(seen[1].current, 2);
    }

    #[tokio::test]
    async fn cancelled_document_scan_fails_with_dedicated_error() {
        let page = |id: &str| {
            Node::Page(PageNode {
                id: id.to_string(),
                name: format!("Page {id}"),
                children: Vec::new(),
            })
        };
        let host = SnapshotHost::new(DocumentSnapshot {
            id: "doc".to_string(),
            pages: vec![page("0:1"), page("0:2"), page("0:3")],
            ..Default::default()
        });

        let ctx = ScanContext::default();
        ctx.cancel.cancel();
        let err = UsageScanner::new()
            .scan(&host, ScanScope::Document, &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, tokenlens_common::TokenlensError::Cancelled));
    }
}
