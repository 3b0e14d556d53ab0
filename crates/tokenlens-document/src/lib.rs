mod host;
mod node;
mod records;
mod snapshot;

pub use host::{DesignHost, KeyValueStore, NodeHit};
pub use node::{
    BoundValue, FrameNode, InstanceNode, Node, PageNode, Paint, ShapeNode, SolidPaint, TextNode,
};
pub use records::{ComponentRecord, Mode, Variable, VariableCollection, VariableType, VariableValue};
pub use snapshot::{DocumentSnapshot, MemoryStore, SnapshotHost};
