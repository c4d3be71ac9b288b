mod balanced;
mod clone;
mod level;
mod logical;

pub use balanced::{BalancedLayout, Partition, Side};
pub use clone::{CloneBasedLayout, LayoutSnapshot, NodeSnapshot};
pub use level::{LevelLayout, OutlineLayout};
pub use logical::LogicalLayout;

use crate::config::LayoutConfig;
use crate::error::UnknownLayout;
use crate::model::{MindMap, NodeId};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A placement algorithm. Implementations only write `x`/`y` of nodes that
/// are not manually positioned; the clone-based wrapper additionally owns
/// the manual flags.
pub trait LayoutStrategy {
    fn apply(&self, map: &mut MindMap, canvas_width: f64, canvas_height: f64);

    /// Display label.
    fn name(&self) -> &str;
}

impl<T: LayoutStrategy + ?Sized> LayoutStrategy for Box<T> {
    fn apply(&self, map: &mut MindMap, canvas_width: f64, canvas_height: f64) {
        (**self).apply(map, canvas_width, canvas_height);
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayoutKind {
    #[default]
    Standard,
    Balanced,
    Left,
    Right,
    Logical,
    Level,
    Outline,
    TreeClone,
    RightClone,
    LeftClone,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 10] = [
        LayoutKind::Standard,
        LayoutKind::Balanced,
        LayoutKind::Left,
        LayoutKind::Right,
        LayoutKind::Logical,
        LayoutKind::Level,
        LayoutKind::Outline,
        LayoutKind::TreeClone,
        LayoutKind::RightClone,
        LayoutKind::LeftClone,
    ];

    /// Kebab-case key used in config files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutKind::Standard => "standard",
            LayoutKind::Balanced => "balanced",
            LayoutKind::Left => "left",
            LayoutKind::Right => "right",
            LayoutKind::Logical => "logical",
            LayoutKind::Level => "level",
            LayoutKind::Outline => "outline",
            LayoutKind::TreeClone => "tree-clone",
            LayoutKind::RightClone => "right-clone",
            LayoutKind::LeftClone => "left-clone",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LayoutKind::Standard => "Standard",
            LayoutKind::Balanced => "Balanced",
            LayoutKind::Left => "Left",
            LayoutKind::Right => "Right",
            LayoutKind::Logical => "Logical",
            LayoutKind::Level => "Level",
            LayoutKind::Outline => "Outline",
            LayoutKind::TreeClone => "Tree",
            LayoutKind::RightClone => "Right tree",
            LayoutKind::LeftClone => "Left tree",
        }
    }

    /// Clone-based kinds freeze every node after placing it.
    pub fn is_clone_based(self) -> bool {
        matches!(
            self,
            LayoutKind::TreeClone | LayoutKind::RightClone | LayoutKind::LeftClone
        )
    }

    pub fn build(self, config: &LayoutConfig) -> Box<dyn LayoutStrategy> {
        let label = self.label();
        match self {
            LayoutKind::Standard => Box::new(BalancedLayout::new(
                label,
                config.standard,
                Partition::FixedSplit,
            )),
            LayoutKind::Balanced => Box::new(BalancedLayout::new(
                label,
                config.balanced,
                Partition::GreedyBalance,
            )),
            LayoutKind::Left => Box::new(BalancedLayout::new(
                label,
                config.left,
                Partition::SingleSide(Side::Left),
            )),
            LayoutKind::Right => Box::new(BalancedLayout::new(
                label,
                config.right,
                Partition::SingleSide(Side::Right),
            )),
            LayoutKind::Logical => Box::new(LogicalLayout::new(config.logical)),
            LayoutKind::Level => Box::new(LevelLayout::new(config.level)),
            LayoutKind::Outline => Box::new(OutlineLayout::new(config.outline)),
            LayoutKind::TreeClone => Box::new(CloneBasedLayout::new(BalancedLayout::new(
                label,
                config.tree_clone,
                Partition::GreedyBalance,
            ))),
            LayoutKind::RightClone => Box::new(CloneBasedLayout::new(BalancedLayout::new(
                label,
                config.right_clone,
                Partition::SingleSide(Side::Right),
            ))),
            LayoutKind::LeftClone => Box::new(CloneBasedLayout::new(BalancedLayout::new(
                label,
                config.left_clone,
                Partition::SingleSide(Side::Left),
            ))),
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutKind {
    type Err = UnknownLayout;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key = value.trim().to_ascii_lowercase().replace('_', "-");
        LayoutKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == key)
            .ok_or_else(|| UnknownLayout(value.to_string()))
    }
}

/// Holds the active strategy and the last canvas size, re-running the
/// strategy whenever either changes.
pub struct LayoutEngine {
    strategy: Box<dyn LayoutStrategy>,
    canvas_width: f64,
    canvas_height: f64,
}

impl LayoutEngine {
    pub fn new(strategy: Box<dyn LayoutStrategy>, canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            strategy,
            canvas_width,
            canvas_height,
        }
    }

    pub fn from_kind(
        kind: LayoutKind,
        config: &LayoutConfig,
        canvas_width: f64,
        canvas_height: f64,
    ) -> Self {
        Self::new(kind.build(config), canvas_width, canvas_height)
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    pub fn canvas(&self) -> (f64, f64) {
        (self.canvas_width, self.canvas_height)
    }

    pub fn set_strategy(&mut self, map: &mut MindMap, strategy: Box<dyn LayoutStrategy>) {
        self.strategy = strategy;
        self.relayout(map);
        map.mark_modified();
    }

    pub fn resize(&mut self, map: &mut MindMap, canvas_width: f64, canvas_height: f64) {
        self.canvas_width = canvas_width;
        self.canvas_height = canvas_height;
        self.relayout(map);
    }

    pub fn relayout(&self, map: &mut MindMap) {
        tracing::debug!(
            strategy = self.strategy.name(),
            width = self.canvas_width,
            height = self.canvas_height,
            nodes = map.len(),
            "applying layout"
        );
        self.strategy
            .apply(map, self.canvas_width, self.canvas_height);
    }
}

/// Height each node needs to stack its whole subtree without overlap:
/// `max(own height, Σ child subtree heights + gap·(n−1))`.
pub fn subtree_heights(map: &MindMap, root: &NodeId, gap: f64) -> HashMap<NodeId, f64> {
    let mut memo = HashMap::new();
    subtree_height(map, root, gap, &mut memo);
    memo
}

fn subtree_height(
    map: &MindMap,
    node_id: &NodeId,
    gap: f64,
    memo: &mut HashMap<NodeId, f64>,
) -> f64 {
    if let Some(value) = memo.get(node_id) {
        return *value;
    }
    let Some(node) = map.node(node_id) else {
        return 0.0;
    };
    let mut height = node.height();
    let children = node.children();
    if !children.is_empty() {
        let mut total = 0.0;
        for child in children {
            total += subtree_height(map, child, gap, memo);
        }
        total += gap * (children.len() as f64 - 1.0);
        height = height.max(total);
    }
    memo.insert(node_id.clone(), height);
    height
}

/// Σ heights + gap·(n−1) for a run of nodes stacked in one column.
fn run_extent(heights: impl IntoIterator<Item = f64>, gap: f64) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    for height in heights {
        total += height;
        count += 1;
    }
    if count > 1 {
        total += gap * (count as f64 - 1.0);
    }
    total
}
