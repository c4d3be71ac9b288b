//! The mind-map node tree: one center node, its descendants, and any number
//! of free roots floating beside it.
//!
//! Nodes live in a flat insertion-ordered index keyed by [`NodeId`]. A node
//! lists its children in order and refers back to its parent by id only, so
//! ownership always flows through the index.

mod connect;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::NodeSizing;
use crate::error::MindMapError;
use crate::text::node_size;

/// Initial offset of a freshly added child relative to its parent's top-right corner.
const NEW_CHILD_OFFSET_X: f64 = 50.0;
const NEW_CHILD_OFFSET_Y: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random (v4 UUID) id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeShape {
    Rectangle,
    #[default]
    RoundedRectangle,
    Ellipse,
    Diamond,
    Hexagon,
}

/// Style of the connector from a node up to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    ArrowSolid,
    ArrowDashed,
}

impl LineStyle {
    pub fn is_dashed(self) -> bool {
        matches!(self, Self::Dashed | Self::ArrowDashed)
    }

    pub fn has_arrow(self) -> bool {
        matches!(self, Self::ArrowSolid | Self::ArrowDashed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) text: String,
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) manually_positioned: bool,
    pub(crate) shape: NodeShape,
    pub(crate) line_style: LineStyle,
    pub(crate) font_size: f64,
    pub(crate) size_scale: f64,
    pub(crate) is_center: bool,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
}

impl Node {
    fn new(text: &str, sizing: &NodeSizing) -> Self {
        let mut node = Self {
            id: NodeId::generate(),
            text: text.to_string(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            manually_positioned: false,
            shape: NodeShape::default(),
            line_style: LineStyle::default(),
            font_size: sizing.font_size,
            size_scale: 1.0,
            is_center: false,
            children: Vec::new(),
            parent: None,
        };
        node.refresh_size(sizing);
        node
    }

    fn refresh_size(&mut self, sizing: &NodeSizing) {
        let (width, height) = node_size(&self.text, self.font_size, self.size_scale, sizing);
        self.width = width;
        self.height = height;
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_manually_positioned(&self) -> bool {
        self.manually_positioned
    }

    pub fn shape(&self) -> NodeShape {
        self.shape
    }

    pub fn line_style(&self) -> LineStyle {
        self.line_style
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn size_scale(&self) -> f64 {
        self.size_scale
    }

    pub fn is_center_node(&self) -> bool {
        self.is_center
    }

    pub fn is_free_root(&self) -> bool {
        !self.is_center && self.parent.is_none()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }
}

#[derive(Debug, Clone)]
pub struct MindMap {
    nodes: IndexMap<NodeId, Node>,
    root: NodeId,
    sizing: NodeSizing,
    name: String,
    modified: bool,
}

impl MindMap {
    pub fn new(center_text: &str) -> Self {
        Self::with_sizing(center_text, NodeSizing::default())
    }

    pub fn with_sizing(center_text: &str, sizing: NodeSizing) -> Self {
        let mut center = Node::new(center_text, &sizing);
        center.is_center = true;
        let root = center.id.clone();
        let mut nodes = IndexMap::new();
        nodes.insert(root.clone(), center);
        Self {
            nodes,
            root,
            sizing,
            name: "Untitled".to_string(),
            modified: false,
        }
    }

    /// Reassembles a tree whose invariants the caller has already checked.
    pub(crate) fn from_parts(
        nodes: IndexMap<NodeId, Node>,
        root: NodeId,
        name: String,
        sizing: NodeSizing,
    ) -> Self {
        Self {
            nodes,
            root,
            sizing,
            name,
            modified: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.modified = true;
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    pub fn sizing(&self) -> &NodeSizing {
        &self.sizing
    }

    /// Swaps the sizing rules and re-derives every node's size.
    pub fn set_sizing(&mut self, sizing: NodeSizing) {
        self.sizing = sizing;
        for node in self.nodes.values_mut() {
            node.refresh_size(&self.sizing);
        }
    }

    pub fn root_id(&self) -> &NodeId {
        &self.root
    }

    pub fn root(&self) -> &Node {
        &self.nodes[&self.root]
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub(crate) fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node, free roots included, in insertion order.
    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().cloned().collect()
    }

    /// Children of `id`; empty for unknown ids.
    pub fn children(&self, id: &NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, id: &NodeId) -> Option<&NodeId> {
        self.nodes.get(id).and_then(|node| node.parent.as_ref())
    }

    pub fn free_roots(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|node| node.is_free_root())
    }

    /// Every (parent, child) pair, parents in index order.
    pub fn links(&self) -> impl Iterator<Item = (&Node, &Node)> {
        self.nodes.values().flat_map(move |parent| {
            parent
                .children
                .iter()
                .filter_map(move |child| self.nodes.get(child).map(|child| (parent, child)))
        })
    }

    /// Distance from the top of the node's own tree (center or free root).
    pub fn depth(&self, id: &NodeId) -> Option<usize> {
        let mut current = self.nodes.get(id)?;
        let mut depth = 0;
        while let Some(parent) = current.parent.as_ref() {
            current = self.nodes.get(parent)?;
            depth += 1;
            if depth > self.nodes.len() {
                return None;
            }
        }
        Some(depth)
    }

    /// True when `ancestor` appears on `node`'s parent chain. A node is not its own descendant.
    pub fn is_descendant(&self, node: &NodeId, ancestor: &NodeId) -> bool {
        let mut current = self.parent(node);
        let mut steps = 0;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            current = self.parent(parent);
        }
        false
    }

    /// `id` followed by all of its descendants in preorder.
    pub fn subtree(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.nodes.contains_key(id) {
            return out;
        }
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            stack.extend(self.children(&current).iter().rev().cloned());
            out.push(current);
        }
        out
    }

    pub fn add_child(&mut self, parent: &NodeId, text: &str) -> Result<NodeId, MindMapError> {
        let (px, py, pw) = {
            let parent_node = self
                .nodes
                .get(parent)
                .ok_or_else(|| MindMapError::UnknownNode(parent.clone()))?;
            (parent_node.x, parent_node.y, parent_node.width)
        };
        let mut child = Node::new(text, &self.sizing);
        child.x = px + pw + NEW_CHILD_OFFSET_X;
        child.y = py + NEW_CHILD_OFFSET_Y;
        Ok(self.attach(parent, child))
    }

    pub fn add_sibling(&mut self, sibling: &NodeId, text: &str) -> Result<NodeId, MindMapError> {
        let node = self
            .nodes
            .get(sibling)
            .ok_or_else(|| MindMapError::UnknownNode(sibling.clone()))?;
        let parent = node
            .parent
            .clone()
            .ok_or_else(|| MindMapError::NoParent(sibling.clone()))?;
        let child = Node::new(text, &self.sizing);
        Ok(self.attach(&parent, child))
    }

    /// Adds an unconnected topic at `(x, y)`.
    pub fn add_free_node(&mut self, text: &str, x: f64, y: f64) -> NodeId {
        let mut node = Node::new(text, &self.sizing);
        node.x = x;
        node.y = y;
        let id = node.id.clone();
        self.nodes.insert(id.clone(), node);
        self.modified = true;
        id
    }

    fn attach(&mut self, parent: &NodeId, mut child: Node) -> NodeId {
        let id = child.id.clone();
        child.parent = Some(parent.clone());
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(id.clone());
        }
        self.nodes.insert(id.clone(), child);
        self.modified = true;
        id
    }

    /// Removes `id` and its whole subtree. Returns the number of nodes removed.
    pub fn delete_node(&mut self, id: &NodeId) -> Result<usize, MindMapError> {
        if !self.nodes.contains_key(id) {
            return Err(MindMapError::UnknownNode(id.clone()));
        }
        if *id == self.root {
            return Err(MindMapError::CannotDeleteCenter);
        }
        self.detach(id);
        let doomed = self.subtree(id);
        for node in &doomed {
            self.nodes.shift_remove(node);
        }
        self.modified = true;
        tracing::debug!(node = %id, removed = doomed.len(), "deleted subtree");
        Ok(doomed.len())
    }

    /// Unlinks `id` from its parent, if any. The node itself stays in the index.
    pub(crate) fn detach(&mut self, id: &NodeId) {
        let Some(parent) = self.nodes.get_mut(id).and_then(|node| node.parent.take()) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.retain(|child| child != id);
        }
    }

    pub fn set_text(&mut self, id: &NodeId, text: &str) -> Result<(), MindMapError> {
        let sizing = &self.sizing;
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| MindMapError::UnknownNode(id.clone()))?;
        node.text = text.to_string();
        node.refresh_size(sizing);
        self.modified = true;
        Ok(())
    }

    pub fn set_font_size(&mut self, id: &NodeId, font_size: f64) -> Result<(), MindMapError> {
        let sizing = &self.sizing;
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| MindMapError::UnknownNode(id.clone()))?;
        node.font_size = font_size;
        node.refresh_size(sizing);
        self.modified = true;
        Ok(())
    }

    pub fn set_size_scale(&mut self, id: &NodeId, scale: f64) -> Result<(), MindMapError> {
        let sizing = &self.sizing;
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| MindMapError::UnknownNode(id.clone()))?;
        node.size_scale = scale;
        node.refresh_size(sizing);
        self.modified = true;
        Ok(())
    }

    /// Overrides the derived size, e.g. when a renderer measured the label itself.
    pub fn set_size(&mut self, id: &NodeId, width: f64, height: f64) -> Result<(), MindMapError> {
        let node = self.require_mut(id)?;
        node.width = width;
        node.height = height;
        self.modified = true;
        Ok(())
    }

    pub fn set_shape(&mut self, id: &NodeId, shape: NodeShape) -> Result<(), MindMapError> {
        self.require_mut(id)?.shape = shape;
        self.modified = true;
        Ok(())
    }

    pub fn set_line_style(&mut self, id: &NodeId, style: LineStyle) -> Result<(), MindMapError> {
        self.require_mut(id)?.line_style = style;
        self.modified = true;
        Ok(())
    }

    /// Moves a node. With `manual` the node becomes manually positioned;
    /// without it the flag is left as it was.
    pub fn set_position(
        &mut self,
        id: &NodeId,
        x: f64,
        y: f64,
        manual: bool,
    ) -> Result<(), MindMapError> {
        let node = self.require_mut(id)?;
        let changed = node.x != x || node.y != y || (manual && !node.manually_positioned);
        node.x = x;
        node.y = y;
        if manual {
            node.manually_positioned = true;
        }
        if changed {
            self.modified = true;
        }
        Ok(())
    }

    pub fn is_manually_positioned(&self, id: &NodeId) -> bool {
        self.nodes
            .get(id)
            .map(|node| node.manually_positioned)
            .unwrap_or(false)
    }

    /// Explicit user toggle; the only public way to release a pinned node.
    pub fn set_manually_positioned(&mut self, id: &NodeId, manual: bool) -> Result<(), MindMapError> {
        let node = self.require_mut(id)?;
        if node.manually_positioned != manual {
            node.manually_positioned = manual;
            self.modified = true;
        }
        Ok(())
    }

    pub(crate) fn mark_modified(&mut self) {
        self.modified = true;
    }

    /// Moves a node unless it is pinned. Returns whether it moved.
    pub(crate) fn place(&mut self, id: &NodeId, x: f64, y: f64) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) if !node.manually_positioned => {
                node.x = x;
                node.y = y;
                tracing::trace!(node = %id, x, y, "placed");
                true
            }
            _ => false,
        }
    }

    pub(crate) fn clear_manual_flags(&mut self) {
        for node in self.nodes.values_mut() {
            node.manually_positioned = false;
        }
    }

    pub(crate) fn freeze_all(&mut self) {
        for node in self.nodes.values_mut() {
            node.manually_positioned = true;
        }
    }

    fn require_mut(&mut self, id: &NodeId) -> Result<&mut Node, MindMapError> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| MindMapError::UnknownNode(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (MindMap, NodeId, NodeId, NodeId) {
        let mut map = MindMap::new("Center");
        let root = map.root_id().clone();
        let a = map.add_child(&root, "A").unwrap();
        let b = map.add_child(&a, "B").unwrap();
        (map, root, a, b)
    }

    #[test]
    fn new_map_has_a_single_center() {
        let map = MindMap::new("Center");
        assert_eq!(map.len(), 1);
        assert!(map.root().is_center_node());
        assert!(map.root().parent().is_none());
        assert_eq!(map.root().size(), (120.0, 40.0));
        assert!(!map.is_modified());
    }

    #[test]
    fn add_child_links_both_directions() {
        let (map, root, a, b) = sample();
        assert_eq!(map.children(&root), &[a.clone()]);
        assert_eq!(map.parent(&b), Some(&a));
        assert_eq!(map.depth(&b), Some(2));
        assert!(map.is_descendant(&b, &root));
        assert!(!map.is_descendant(&root, &b));
        assert!(!map.is_descendant(&a, &a));
        assert!(map.is_modified());
    }

    #[test]
    fn add_child_starts_next_to_parent() {
        let mut map = MindMap::new("Center");
        let root = map.root_id().clone();
        map.set_position(&root, 10.0, 20.0, false).unwrap();
        let child = map.add_child(&root, "A").unwrap();
        let node = map.node(&child).unwrap();
        assert_eq!(node.position(), (10.0 + 120.0 + 50.0, 50.0));
    }

    #[test]
    fn sibling_requires_a_parent() {
        let (mut map, root, a, _) = sample();
        assert_eq!(
            map.add_sibling(&root, "X"),
            Err(MindMapError::NoParent(root.clone()))
        );
        let sibling = map.add_sibling(&a, "A2").unwrap();
        assert_eq!(map.children(&root), &[a, sibling]);
    }

    #[test]
    fn delete_removes_the_whole_subtree() {
        let (mut map, root, a, b) = sample();
        assert_eq!(map.delete_node(&a), Ok(2));
        assert!(!map.contains(&a));
        assert!(!map.contains(&b));
        assert!(map.children(&root).is_empty());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn center_cannot_be_deleted() {
        let (mut map, root, _, _) = sample();
        assert_eq!(map.delete_node(&root), Err(MindMapError::CannotDeleteCenter));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn free_nodes_have_no_parent() {
        let (mut map, _, _, _) = sample();
        let free = map.add_free_node("Floating", 400.0, 300.0);
        let node = map.node(&free).unwrap();
        assert!(node.is_free_root());
        assert_eq!(node.position(), (400.0, 300.0));
        assert_eq!(map.free_roots().count(), 1);
        assert_eq!(map.depth(&free), Some(0));
    }

    #[test]
    fn manual_flag_is_sticky() {
        let (mut map, _, a, _) = sample();
        map.set_position(&a, 100.0, 100.0, true).unwrap();
        assert!(map.is_manually_positioned(&a));
        map.set_position(&a, 5.0, 5.0, false).unwrap();
        assert!(map.is_manually_positioned(&a));
        assert!(!map.place(&a, 1.0, 1.0));
        assert_eq!(map.node(&a).unwrap().position(), (5.0, 5.0));
        map.set_manually_positioned(&a, false).unwrap();
        assert!(map.place(&a, 1.0, 1.0));
    }

    #[test]
    fn dragging_and_unpinning_mark_the_map_modified() {
        let (mut map, _, a, _) = sample();
        map.mark_saved();
        map.set_position(&a, 100.0, 100.0, true).unwrap();
        assert!(map.is_modified());

        map.mark_saved();
        map.set_position(&a, 100.0, 100.0, true).unwrap();
        assert!(!map.is_modified());

        map.set_manually_positioned(&a, false).unwrap();
        assert!(map.is_modified());

        map.mark_saved();
        map.set_manually_positioned(&a, false).unwrap();
        assert!(!map.is_modified());
    }

    #[test]
    fn text_changes_resize_the_node() {
        let (mut map, _, a, _) = sample();
        map.set_text(&a, "a label long enough to need more than the minimum width")
            .unwrap();
        assert!(map.node(&a).unwrap().width() > 120.0);
        map.set_size_scale(&a, 2.0).unwrap();
        assert_eq!(map.node(&a).unwrap().height(), 80.0);
    }

    #[test]
    fn subtree_is_preorder() {
        let (mut map, root, a, b) = sample();
        let c = map.add_child(&root, "C").unwrap();
        assert_eq!(map.subtree(&root), vec![root.clone(), a, b, c]);
    }

    #[test]
    fn links_cover_every_edge() {
        let (mut map, _, _, b) = sample();
        let free = map.add_free_node("Free", 0.0, 0.0);
        map.add_child(&free, "Leaf").unwrap();
        map.add_child(&b, "Deep").unwrap();
        assert_eq!(map.links().count(), 4);
    }

    #[test]
    fn line_style_flags() {
        assert!(LineStyle::ArrowDashed.is_dashed());
        assert!(LineStyle::ArrowDashed.has_arrow());
        assert!(!LineStyle::Dashed.has_arrow());
        assert!(!LineStyle::ArrowSolid.is_dashed());
    }
}
