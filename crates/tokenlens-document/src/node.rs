use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokenlens_common::Rgba;

/// One bound-variable slot on a node. Hosts expose single bindings, one
/// binding per entry for list properties (multi-fill), and keyed bindings
/// for nested properties (per-corner radius).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoundValue {
    Single(String),
    List(Vec<String>),
    Keyed(BTreeMap<String, String>),
}

/// A paint applied to a fill or stroke slot. Only solid paints carry a color
/// the scanner can inspect; gradient and image paints are opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Paint {
    Solid(SolidPaint),
    Gradient,
    Image,
}

impl Paint {
    pub fn as_solid(&self) -> Option<&SolidPaint> {
        match self {
            Paint::Solid(solid) => Some(solid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidPaint {
    pub color: Rgba,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
    /// Raw bound-variable reference, still carrying any routing prefix.
    #[serde(default)]
    pub bound_variable: Option<String>,
}

fn visible_by_default() -> bool {
    true
}

/// A node in the document tree. Each variant carries only the capabilities
/// its kind actually has; consumers go through the accessor methods instead
/// of probing properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Page(PageNode),
    Frame(FrameNode),
    Shape(ShapeNode),
    Text(TextNode),
    Instance(InstanceNode),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub children: Vec<Node>,
    #[serde(default)]
    pub fills: Vec<Paint>,
    #[serde(default)]
    pub strokes: Vec<Paint>,
    #[serde(default)]
    pub bound_variables: BTreeMap<String, BoundValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fills: Vec<Paint>,
    #[serde(default)]
    pub strokes: Vec<Paint>,
    #[serde(default)]
    pub bound_variables: BTreeMap<String, BoundValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub characters: String,
    /// Reference to a shared text style; absent or empty means unstyled.
    #[serde(default)]
    pub text_style_id: Option<String>,
    #[serde(default)]
    pub fills: Vec<Paint>,
    #[serde(default)]
    pub strokes: Vec<Paint>,
    #[serde(default)]
    pub bound_variables: BTreeMap<String, BoundValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceNode {
    pub id: String,
    pub name: String,
    pub component_id: String,
    #[serde(default)]
    pub children: Vec<Node>,
    #[serde(default)]
    pub fills: Vec<Paint>,
    #[serde(default)]
    pub strokes: Vec<Paint>,
    #[serde(default)]
    pub bound_variables: BTreeMap<String, BoundValue>,
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::Page(n) => &n.id,
            Node::Frame(n) => &n.id,
            Node::Shape(n) => &n.id,
            Node::Text(n) => &n.id,
            Node::Instance(n) => &n.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Page(n) => &n.name,
            Node::Frame(n) => &n.name,
            Node::Shape(n) => &n.name,
            Node::Text(n) => &n.name,
            Node::Instance(n) => &n.name,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Page(_) => "PAGE",
            Node::Frame(_) => "FRAME",
            Node::Shape(_) => "SHAPE",
            Node::Text(_) => "TEXT",
            Node::Instance(_) => "INSTANCE",
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Page(n) => &n.children,
            Node::Frame(n) => &n.children,
            Node::Instance(n) => &n.children,
            Node::Shape(_) | Node::Text(_) => &[],
        }
    }

    pub fn fills(&self) -> &[Paint] {
        match self {
            Node::Frame(n) => &n.fills,
            Node::Shape(n) => &n.fills,
            Node::Text(n) => &n.fills,
            Node::Instance(n) => &n.fills,
            Node::Page(_) => &[],
        }
    }

    pub fn strokes(&self) -> &[Paint] {
        match self {
            Node::Frame(n) => &n.strokes,
            Node::Shape(n) => &n.strokes,
            Node::Text(n) => &n.strokes,
            Node::Instance(n) => &n.strokes,
            Node::Page(_) => &[],
        }
    }

    pub fn bound_variables(&self) -> Option<&BTreeMap<String, BoundValue>> {
        match self {
            Node::Frame(n) => Some(&n.bound_variables),
            Node::Shape(n) => Some(&n.bound_variables),
            Node::Text(n) => Some(&n.bound_variables),
            Node::Instance(n) => Some(&n.bound_variables),
            Node::Page(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Node::Text(n) => Some(n),
            _ => None,
        }
    }

    pub fn component_ref(&self) -> Option<&str> {
        match self {
            Node::Instance(n) => Some(&n.component_id),
            _ => None,
        }
    }
}
