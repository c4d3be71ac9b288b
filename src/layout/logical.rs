use super::{LayoutStrategy, run_extent, subtree_heights};
use crate::config::LogicalConfig;
use crate::model::{MindMap, NodeId};
use std::collections::HashMap;

/// Left-to-right tree where each node is placed relative to its own parent.
/// Child runs are sized by whole-subtree height, so neighbouring subtrees
/// never overlap.
#[derive(Debug, Clone)]
pub struct LogicalLayout {
    config: LogicalConfig,
}

impl LogicalLayout {
    pub fn new(config: LogicalConfig) -> Self {
        Self { config }
    }

    fn assign_positions(
        &self,
        map: &mut MindMap,
        parent: &NodeId,
        subtree: &HashMap<NodeId, f64>,
    ) {
        let Some(parent_node) = map.node(parent) else {
            return;
        };
        let children = parent_node.children().to_vec();
        if children.is_empty() {
            return;
        }
        let child_x = parent_node.x() + parent_node.width() + self.config.horizontal_gap;
        let parent_mid = parent_node.y() + parent_node.height() / 2.0;
        let height_of = |id: &NodeId| subtree.get(id).copied().unwrap_or(0.0);

        let total = run_extent(children.iter().map(height_of), self.config.vertical_gap);
        let mut cursor = parent_mid - total / 2.0;
        for child_id in &children {
            let slot = height_of(child_id);
            let own = map.node(child_id).map(|node| node.height()).unwrap_or(0.0);
            map.place(child_id, child_x, cursor + slot / 2.0 - own / 2.0);
            self.assign_positions(map, child_id, subtree);
            cursor += slot + self.config.vertical_gap;
        }
    }
}

impl LayoutStrategy for LogicalLayout {
    fn apply(&self, map: &mut MindMap, _canvas_width: f64, canvas_height: f64) {
        let root = map.root_id().clone();
        let root_height = map.root().height();
        map.place(&root, self.config.margin_x, canvas_height / 2.0 - root_height / 2.0);
        let subtree = subtree_heights(map, &root, self.config.vertical_gap);
        self.assign_positions(map, &root, &subtree);
        tracing::debug!(nodes = subtree.len(), "logical layout applied");
    }

    fn name(&self) -> &str {
        "Logical"
    }
}
