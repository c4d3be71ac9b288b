use super::{LayoutStrategy, run_extent};
use crate::config::{LevelConfig, OutlineConfig};
use crate::model::{MindMap, NodeId};
use std::collections::VecDeque;

/// Top-down rows: every node at depth `d` shares `y = root.y + root.height + d·gap`,
/// and each row is centered on the canvas regardless of parentage.
#[derive(Debug, Clone)]
pub struct LevelLayout {
    config: LevelConfig,
}

impl LevelLayout {
    pub fn new(config: LevelConfig) -> Self {
        Self { config }
    }
}

/// Nodes of the center's tree grouped by depth, in breadth-first order.
fn levels(map: &MindMap) -> Vec<Vec<NodeId>> {
    let mut levels: Vec<Vec<NodeId>> = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back((map.root_id().clone(), 0usize));
    while let Some((id, depth)) = queue.pop_front() {
        for child in map.children(&id) {
            queue.push_back((child.clone(), depth + 1));
        }
        if levels.len() <= depth {
            levels.resize_with(depth + 1, Vec::new);
        }
        levels[depth].push(id);
    }
    levels
}

impl LayoutStrategy for LevelLayout {
    fn apply(&self, map: &mut MindMap, canvas_width: f64, _canvas_height: f64) {
        let root = map.root_id().clone();
        let root_width = map.root().width();
        map.place(&root, canvas_width / 2.0 - root_width / 2.0, self.config.margin_top);
        let (root_y, root_height) = (map.root().y(), map.root().height());

        let levels = levels(map);
        for (depth, row) in levels.iter().enumerate().skip(1) {
            let y = root_y + root_height + depth as f64 * self.config.vertical_gap;
            let total = run_extent(
                row.iter()
                    .filter_map(|id| map.node(id).map(|node| node.width())),
                self.config.horizontal_gap,
            );
            let mut cursor = (canvas_width - total) / 2.0;
            for id in row {
                let width = map.node(id).map(|node| node.width()).unwrap_or(0.0);
                map.place(id, cursor, y);
                cursor += width + self.config.horizontal_gap;
            }
        }
        tracing::debug!(depth = levels.len().saturating_sub(1), "level layout applied");
    }

    fn name(&self) -> &str {
        "Level"
    }
}

/// Indented list: one row per node in preorder, indented by depth.
#[derive(Debug, Clone)]
pub struct OutlineLayout {
    config: OutlineConfig,
}

impl OutlineLayout {
    pub fn new(config: OutlineConfig) -> Self {
        Self { config }
    }
}

impl LayoutStrategy for OutlineLayout {
    fn apply(&self, map: &mut MindMap, _canvas_width: f64, canvas_height: f64) {
        let mut rows: Vec<(NodeId, usize, f64)> = Vec::new();
        let mut stack = vec![(map.root_id().clone(), 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = map.node(&id) else {
                continue;
            };
            for child in node.children().iter().rev() {
                stack.push((child.clone(), depth + 1));
            }
            rows.push((id, depth, node.height()));
        }

        let available = (canvas_height - 2.0 * self.config.margin).max(0.0);
        let spacing = self
            .config
            .vertical_gap
            .min(available / (rows.len() as f64 + 1.0));
        let total = run_extent(rows.iter().map(|(_, _, height)| *height), spacing);
        let mut cursor = (canvas_height - total) / 2.0;
        for (id, depth, height) in &rows {
            let x = self.config.margin + *depth as f64 * self.config.horizontal_gap;
            map.place(id, x, cursor);
            cursor += height + spacing;
        }
        tracing::debug!(rows = rows.len(), spacing, "outline layout applied");
    }

    fn name(&self) -> &str {
        "Outline"
    }
}
