//! Two-sided layouts radiating from the center node.

use super::{LayoutStrategy, run_extent, subtree_heights};
use crate::config::BalancedConfig;
use crate::model::{MindMap, NodeId};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// How the center's children are split between the two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    /// First half left, remainder right.
    FixedSplit,
    /// Heaviest subtree first, each onto the currently lighter side (ties go left).
    GreedyBalance,
    SingleSide(Side),
}

impl Partition {
    /// Splits `children` into `(left, right)`, each keeping the original sibling order.
    /// `heights` is only consulted by [`Partition::GreedyBalance`]; missing entries count as zero.
    pub fn split(
        self,
        children: &[NodeId],
        heights: &HashMap<NodeId, f64>,
    ) -> (Vec<NodeId>, Vec<NodeId>) {
        match self {
            Partition::FixedSplit => {
                let half = children.len() / 2;
                (children[..half].to_vec(), children[half..].to_vec())
            }
            Partition::SingleSide(Side::Left) => (children.to_vec(), Vec::new()),
            Partition::SingleSide(Side::Right) => (Vec::new(), children.to_vec()),
            Partition::GreedyBalance => {
                let height_of = |id: &NodeId| heights.get(id).copied().unwrap_or(0.0);
                let mut order: Vec<usize> = (0..children.len()).collect();
                order.sort_by(|a, b| {
                    height_of(&children[*b]).total_cmp(&height_of(&children[*a]))
                });
                let mut sides = vec![Side::Left; children.len()];
                let mut left_total = 0.0;
                let mut right_total = 0.0;
                for idx in order {
                    let height = height_of(&children[idx]);
                    if left_total <= right_total {
                        left_total += height;
                    } else {
                        sides[idx] = Side::Right;
                        right_total += height;
                    }
                }
                let mut left = Vec::new();
                let mut right = Vec::new();
                for (child, side) in children.iter().zip(sides) {
                    match side {
                        Side::Left => left.push(child.clone()),
                        Side::Right => right.push(child.clone()),
                    }
                }
                (left, right)
            }
        }
    }
}

/// One algorithm behind the standard, balanced, left, right and the
/// clone-based tree variants; they differ only in constants and partition.
#[derive(Debug, Clone)]
pub struct BalancedLayout {
    name: String,
    config: BalancedConfig,
    partition: Partition,
}

impl BalancedLayout {
    pub fn new(name: impl Into<String>, config: BalancedConfig, partition: Partition) -> Self {
        Self {
            name: name.into(),
            config,
            partition,
        }
    }

    /// Visual shrink factor per level. Exposed for renderers, never applied here.
    pub fn level_scale(&self) -> f64 {
        self.config.level_scale
    }

    fn gap_at(&self, depth: usize) -> f64 {
        self.config.vertical_gap * (1.0 + self.config.depth_gap_scale * depth as f64)
    }

    fn place_run(&self, map: &mut MindMap, parent: &NodeId, run: &[NodeId], side: Side, depth: usize) {
        if run.is_empty() {
            return;
        }
        let Some(parent_node) = map.node(parent) else {
            return;
        };
        let (px, py) = parent_node.position();
        let (pw, ph) = parent_node.size();
        let gap = self.gap_at(depth);
        let total = run_extent(
            run.iter()
                .filter_map(|id| map.node(id).map(|node| node.height())),
            gap,
        );
        let mut cursor = py + ph / 2.0 - total / 2.0;
        for child_id in run {
            let Some(child) = map.node(child_id) else {
                continue;
            };
            let (child_width, child_height) = child.size();
            let grandchildren = child.children().to_vec();
            let x = match side {
                Side::Left => px - self.config.horizontal_gap - child_width,
                Side::Right => px + pw + self.config.horizontal_gap,
            };
            map.place(child_id, x, cursor);
            self.place_run(map, child_id, &grandchildren, side, depth + 1);
            cursor += child_height + gap;
        }
    }
}

impl LayoutStrategy for BalancedLayout {
    fn apply(&self, map: &mut MindMap, canvas_width: f64, canvas_height: f64) {
        let root = map.root_id().clone();
        let (root_width, root_height) = map.root().size();
        map.place(
            &root,
            canvas_width * self.config.anchor_x - root_width * self.config.anchor_align,
            canvas_height / 2.0 - root_height / 2.0,
        );

        let children = map.children(&root).to_vec();
        let heights = match self.partition {
            Partition::GreedyBalance => subtree_heights(map, &root, self.config.vertical_gap),
            _ => HashMap::new(),
        };
        let (left, right) = self.partition.split(&children, &heights);
        tracing::debug!(
            layout = %self.name,
            left = left.len(),
            right = right.len(),
            "partitioned center children"
        );
        self.place_run(map, &root, &left, Side::Left, 1);
        self.place_run(map, &root, &right, Side::Right, 1);
    }

    fn name(&self) -> &str {
        &self.name
    }
}
