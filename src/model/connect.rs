//! Re-parenting with cycle avoidance.

use super::{MindMap, NodeId};
use crate::error::{ConnectError, MindMapError};

impl MindMap {
    /// Whether `connect(source, target)` would succeed.
    pub fn can_connect(&self, source: &NodeId, target: &NodeId) -> bool {
        self.check_connect(source, target).is_ok()
    }

    pub fn check_connect(&self, source: &NodeId, target: &NodeId) -> Result<(), ConnectError> {
        if !self.contains(source) {
            return Err(ConnectError::UnknownNode(source.clone()));
        }
        let Some(target_node) = self.node(target) else {
            return Err(ConnectError::UnknownNode(target.clone()));
        };
        if source == target {
            return Err(ConnectError::SelfLoop);
        }
        if target_node.is_center_node() {
            return Err(ConnectError::TargetIsCenter);
        }
        if self.is_descendant(source, target) {
            return Err(ConnectError::WouldCreateCycle {
                from: source.clone(),
                to: target.clone(),
            });
        }
        if self.is_descendant(target, source) {
            return Err(ConnectError::TargetInSourceSubtree {
                from: source.clone(),
                to: target.clone(),
            });
        }
        Ok(())
    }

    /// Makes `target` the last child of `source`. The target keeps its
    /// coordinates and becomes manually positioned. Nothing changes on error.
    pub fn connect(&mut self, source: &NodeId, target: &NodeId) -> Result<(), ConnectError> {
        if let Err(err) = self.check_connect(source, target) {
            tracing::warn!(%source, %target, %err, "connection rejected");
            return Err(err);
        }
        self.detach(target);
        if let Some(node) = self.node_mut(target) {
            node.parent = Some(source.clone());
            node.manually_positioned = true;
        }
        if let Some(node) = self.node_mut(source) {
            node.children.push(target.clone());
        }
        self.modified = true;
        tracing::debug!(%source, %target, "connected");
        Ok(())
    }

    /// Cuts a node loose from its parent so it becomes a free root pinned
    /// where it stands. For the center node every child is cut loose instead.
    /// Returns the ids that were detached.
    pub fn disconnect(&mut self, id: &NodeId) -> Result<Vec<NodeId>, MindMapError> {
        let node = self
            .node(id)
            .ok_or_else(|| MindMapError::UnknownNode(id.clone()))?;
        let detached = if node.is_center_node() {
            node.children().to_vec()
        } else if node.parent().is_some() {
            vec![id.clone()]
        } else {
            Vec::new()
        };
        for child in &detached {
            self.detach(child);
            if let Some(node) = self.node_mut(child) {
                node.manually_positioned = true;
            }
        }
        if !detached.is_empty() {
            self.modified = true;
        }
        tracing::debug!(node = %id, detached = detached.len(), "disconnected");
        Ok(detached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (MindMap, NodeId, NodeId, NodeId) {
        let mut map = MindMap::new("A");
        let a = map.root_id().clone();
        let b = map.add_child(&a, "B").unwrap();
        let c = map.add_child(&b, "C").unwrap();
        (map, a, b, c)
    }

    #[test]
    fn ancestor_cannot_become_a_child() {
        let (mut map, a, b, c) = chain();
        assert!(!map.can_connect(&c, &a));
        assert!(!map.can_connect(&c, &b));
        assert_eq!(
            map.connect(&c, &b),
            Err(ConnectError::WouldCreateCycle {
                from: c.clone(),
                to: b.clone()
            })
        );
        assert_eq!(map.parent(&c), Some(&b));
        assert_eq!(map.children(&c), &[] as &[NodeId]);
    }

    #[test]
    fn self_loops_are_rejected() {
        let (map, _, b, _) = chain();
        assert_eq!(map.check_connect(&b, &b), Err(ConnectError::SelfLoop));
    }

    #[test]
    fn center_is_never_a_target() {
        let (mut map, a, _, _) = chain();
        let free = map.add_free_node("Free", 0.0, 0.0);
        assert_eq!(map.check_connect(&free, &a), Err(ConnectError::TargetIsCenter));
    }

    #[test]
    fn existing_descendant_is_rejected() {
        let (map, a, _, c) = chain();
        assert_eq!(
            map.check_connect(&a, &c),
            Err(ConnectError::TargetInSourceSubtree {
                from: a.clone(),
                to: c.clone()
            })
        );
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let (map, a, _, _) = chain();
        let ghost = NodeId::new("ghost");
        assert_eq!(
            map.check_connect(&a, &ghost),
            Err(ConnectError::UnknownNode(ghost.clone()))
        );
    }

    #[test]
    fn connect_reparents_and_pins() {
        let (mut map, a, b, c) = chain();
        let d = map.add_child(&a, "D").unwrap();
        map.set_position(&c, 321.0, 123.0, false).unwrap();
        map.connect(&d, &c).unwrap();
        assert_eq!(map.parent(&c), Some(&d));
        assert!(map.children(&b).is_empty());
        assert_eq!(map.children(&d), &[c.clone()]);
        let node = map.node(&c).unwrap();
        assert!(node.is_manually_positioned());
        assert_eq!(node.position(), (321.0, 123.0));
    }

    #[test]
    fn free_root_can_join_the_tree() {
        let (mut map, _, b, _) = chain();
        let free = map.add_free_node("Free", 10.0, 10.0);
        map.connect(&b, &free).unwrap();
        assert_eq!(map.parent(&free), Some(&b));
        assert_eq!(map.free_roots().count(), 0);
    }

    #[test]
    fn disconnect_makes_a_free_root() {
        let (mut map, _, b, c) = chain();
        let detached = map.disconnect(&b).unwrap();
        assert_eq!(detached, vec![b.clone()]);
        let node = map.node(&b).unwrap();
        assert!(node.is_free_root());
        assert!(node.is_manually_positioned());
        assert_eq!(map.parent(&c), Some(&b));
    }

    #[test]
    fn disconnecting_the_center_frees_all_children() {
        let (mut map, a, b, _) = chain();
        let d = map.add_child(&a, "D").unwrap();
        let detached = map.disconnect(&a).unwrap();
        assert_eq!(detached, vec![b, d]);
        assert!(map.children(&a).is_empty());
        assert_eq!(map.free_roots().count(), 2);
    }
}
