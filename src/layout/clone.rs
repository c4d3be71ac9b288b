//! Layouts that take ownership of every node's manual flag.
//!
//! The wrapped strategy runs on a tree whose flags were all cleared, and
//! afterwards every node is frozen as manually positioned. A later `apply`
//! of any strategy that does not clear flags itself therefore leaves the
//! result alone until the user releases nodes explicitly.

use super::LayoutStrategy;
use crate::model::{MindMap, NodeId};

/// Pre-layout state of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub is_center: bool,
    pub manually_positioned: bool,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutSnapshot {
    nodes: Vec<NodeSnapshot>,
}

impl LayoutSnapshot {
    pub fn capture(map: &MindMap) -> Self {
        let nodes = map
            .all_nodes()
            .map(|node| NodeSnapshot {
                id: node.id().clone(),
                text: node.text().to_string(),
                x: node.x(),
                y: node.y(),
                width: node.width(),
                height: node.height(),
                is_center: node.is_center_node(),
                manually_positioned: node.is_manually_positioned(),
                children: node.children().to_vec(),
            })
            .collect();
        Self { nodes }
    }

    pub fn nodes(&self) -> &[NodeSnapshot] {
        &self.nodes
    }

    pub fn get(&self, id: &NodeId) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    /// Puts positions and manual flags back. Nodes deleted since the
    /// capture are skipped.
    pub fn restore(&self, map: &mut MindMap) {
        let mut restored = 0usize;
        for snapshot in &self.nodes {
            if let Some(node) = map.node_mut(&snapshot.id) {
                node.x = snapshot.x;
                node.y = snapshot.y;
                node.manually_positioned = snapshot.manually_positioned;
                restored += 1;
            }
        }
        tracing::debug!(restored, captured = self.nodes.len(), "layout snapshot restored");
    }
}

#[derive(Debug, Clone)]
pub struct CloneBasedLayout<L> {
    inner: L,
}

impl<L: LayoutStrategy> CloneBasedLayout<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }

    /// Runs the layout and hands back the state it replaced.
    pub fn apply_with_snapshot(
        &self,
        map: &mut MindMap,
        canvas_width: f64,
        canvas_height: f64,
    ) -> LayoutSnapshot {
        let snapshot = LayoutSnapshot::capture(map);
        map.clear_manual_flags();
        self.inner.apply(map, canvas_width, canvas_height);
        map.freeze_all();
        tracing::debug!(
            layout = self.inner.name(),
            nodes = snapshot.nodes.len(),
            "clone-based layout applied, all nodes frozen"
        );
        snapshot
    }
}

impl<L: LayoutStrategy> LayoutStrategy for CloneBasedLayout<L> {
    fn apply(&self, map: &mut MindMap, canvas_width: f64, canvas_height: f64) {
        self.apply_with_snapshot(map, canvas_width, canvas_height);
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
