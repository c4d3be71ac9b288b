//! On-disk document format.
//!
//! ```json
//! { "version": 1, "name": "Plan", "nodes": [ { "id": "...", "text": "...", ... } ] }
//! ```
//!
//! Every field a layout or renderer reads is stored verbatim, so a document
//! reloads to exactly the arrangement that was saved. Loading accepts JSON5
//! as well and checks the tree invariants before handing out a [`MindMap`].

use crate::config::NodeSizing;
use crate::error::StoreError;
use crate::model::{LineStyle, MindMap, Node, NodeId, NodeShape};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub version: u32,
    #[serde(default = "default_name")]
    pub name: String,
    pub nodes: Vec<NodeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: NodeId,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub manually_positioned: bool,
    #[serde(default)]
    pub shape: NodeShape,
    #[serde(default)]
    pub line_style: LineStyle,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_size_scale")]
    pub size_scale: f64,
    #[serde(default)]
    pub is_center: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub children: Vec<NodeId>,
}

fn default_name() -> String {
    "Untitled".to_string()
}

fn default_font_size() -> f64 {
    14.0
}

fn default_size_scale() -> f64 {
    1.0
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id().clone(),
            text: node.text().to_string(),
            x: node.x(),
            y: node.y(),
            width: node.width(),
            height: node.height(),
            manually_positioned: node.is_manually_positioned(),
            shape: node.shape(),
            line_style: node.line_style(),
            font_size: node.font_size(),
            size_scale: node.size_scale(),
            is_center: node.is_center_node(),
            parent: node.parent().cloned(),
            children: node.children().to_vec(),
        }
    }
}

impl From<NodeRecord> for Node {
    fn from(record: NodeRecord) -> Self {
        Node {
            id: record.id,
            text: record.text,
            x: record.x,
            y: record.y,
            width: record.width,
            height: record.height,
            manually_positioned: record.manually_positioned,
            shape: record.shape,
            line_style: record.line_style,
            font_size: record.font_size,
            size_scale: record.size_scale,
            is_center: record.is_center,
            children: record.children,
            parent: record.parent,
        }
    }
}

impl Document {
    pub fn from_map(map: &MindMap) -> Self {
        Self {
            version: FORMAT_VERSION,
            name: map.name().to_string(),
            nodes: map.all_nodes().map(NodeRecord::from).collect(),
        }
    }

    /// Validates the records and builds the tree. Stored sizes are kept as
    /// they are; `sizing` only applies to later edits.
    pub fn into_map(self, sizing: NodeSizing) -> Result<MindMap, StoreError> {
        if self.version != FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion(self.version));
        }

        let mut nodes: IndexMap<NodeId, Node> = IndexMap::with_capacity(self.nodes.len());
        let mut center: Option<NodeId> = None;
        for record in self.nodes {
            if record.is_center {
                if let Some(first) = &center {
                    return Err(StoreError::MultipleCenters(first.clone(), record.id));
                }
                center = Some(record.id.clone());
            }
            let id = record.id.clone();
            if nodes.insert(id.clone(), Node::from(record)).is_some() {
                return Err(StoreError::DuplicateId(id));
            }
        }
        let center = center.ok_or(StoreError::MissingCenter)?;
        if nodes[&center].parent().is_some() {
            return Err(StoreError::CenterHasParent(center));
        }

        validate_links(&nodes)?;
        validate_acyclic(&nodes)?;

        tracing::debug!(nodes = nodes.len(), center = %center, "document validated");
        Ok(MindMap::from_parts(nodes, center, self.name, sizing))
    }
}

fn validate_links(nodes: &IndexMap<NodeId, Node>) -> Result<(), StoreError> {
    for (id, node) in nodes {
        if let Some(parent) = node.parent() {
            let parent_node = nodes.get(parent).ok_or_else(|| StoreError::DanglingReference {
                node: id.clone(),
                missing: parent.clone(),
            })?;
            if !parent_node.children().contains(id) {
                return Err(StoreError::InconsistentEdge {
                    parent: parent.clone(),
                    child: id.clone(),
                });
            }
        }
        let mut seen = HashSet::new();
        for child in node.children() {
            let child_node = nodes.get(child).ok_or_else(|| StoreError::DanglingReference {
                node: id.clone(),
                missing: child.clone(),
            })?;
            if child_node.parent() != Some(id) || !seen.insert(child) {
                return Err(StoreError::InconsistentEdge {
                    parent: id.clone(),
                    child: child.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Parent links are already known to be consistent, so a cycle shows up as
/// a parent chain longer than the node count.
fn validate_acyclic(nodes: &IndexMap<NodeId, Node>) -> Result<(), StoreError> {
    for (id, node) in nodes {
        let mut current = node.parent();
        let mut steps = 0usize;
        while let Some(parent) = current {
            steps += 1;
            if steps > nodes.len() {
                return Err(StoreError::Cycle(id.clone()));
            }
            current = nodes.get(parent).and_then(|node| node.parent());
        }
    }
    Ok(())
}

pub fn to_json(map: &MindMap) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(&Document::from_map(map))?)
}

pub fn from_json(contents: &str) -> Result<MindMap, StoreError> {
    from_json_with(contents, NodeSizing::default())
}

/// Parses strict JSON first and falls back to JSON5.
pub fn from_json_with(contents: &str, sizing: NodeSizing) -> Result<MindMap, StoreError> {
    let document: Document = match serde_json::from_str(contents) {
        Ok(document) => document,
        Err(json_err) => json5::from_str(contents).map_err(|json5_err| {
            tracing::debug!(%json5_err, "json5 fallback failed");
            StoreError::Parse(json_err.to_string())
        })?,
    };
    document.into_map(sizing)
}

pub fn write_document<W: Write>(map: &MindMap, writer: W) -> Result<(), StoreError> {
    serde_json::to_writer_pretty(writer, &Document::from_map(map))?;
    Ok(())
}

pub fn read_document<R: Read>(mut reader: R, sizing: NodeSizing) -> Result<MindMap, StoreError> {
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    from_json_with(&contents, sizing)
}

/// Writes the document and clears the modified flag.
pub fn save(map: &mut MindMap, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_document(map, &mut writer)?;
    writer.flush()?;
    map.mark_saved();
    tracing::info!(path = %path.display(), nodes = map.len(), "saved mind map");
    Ok(())
}

pub fn load(path: &Path, sizing: NodeSizing) -> anyhow::Result<MindMap> {
    let contents = std::fs::read_to_string(path)?;
    let map = from_json_with(&contents, sizing)?;
    tracing::info!(path = %path.display(), nodes = map.len(), "loaded mind map");
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MindMap {
        let mut map = MindMap::new("Center");
        map.rename("Roadmap");
        let root = map.root_id().clone();
        let a = map.add_child(&root, "Alpha").unwrap();
        let b = map.add_child(&root, "Beta").unwrap();
        map.add_child(&a, "Alpha one").unwrap();
        map.set_shape(&b, NodeShape::Hexagon).unwrap();
        map.set_line_style(&b, LineStyle::ArrowDashed).unwrap();
        map.set_position(&b, 412.5, -30.25, true).unwrap();
        map.set_size_scale(&a, 1.5).unwrap();
        map.add_free_node("Loose", 900.0, 20.0);
        map
    }

    fn records(map: &MindMap) -> Vec<NodeRecord> {
        map.all_nodes().map(NodeRecord::from).collect()
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let map = sample();
        let json = to_json(&map).unwrap();
        let loaded = from_json(&json).unwrap();
        assert_eq!(records(&loaded), records(&map));
        assert_eq!(loaded.root_id(), map.root_id());
        assert_eq!(loaded.name(), "Roadmap");
        assert!(!loaded.is_modified());
    }

    #[test]
    fn uses_camel_case_keys() {
        let json = to_json(&sample()).unwrap();
        assert!(json.contains("\"manuallyPositioned\""));
        assert!(json.contains("\"lineStyle\": \"arrow-dashed\""));
        assert!(json.contains("\"shape\": \"hexagon\""));
        assert!(json.contains("\"isCenter\": true"));
    }

    #[test]
    fn json5_documents_load() {
        let doc = r#"{
            version: 1,
            // trailing commas and comments are fine
            nodes: [
                { id: 'root', text: 'Hub', x: 0, y: 0, width: 120, height: 40, isCenter: true, children: ['leaf'], },
                { id: 'leaf', text: 'Leaf', x: 200, y: 0, width: 120, height: 40, parent: 'root', },
            ],
        }"#;
        let map = from_json(doc).unwrap();
        assert_eq!(map.root_id(), &NodeId::new("root"));
        assert_eq!(map.children(map.root_id()), &[NodeId::new("leaf")]);
        assert_eq!(map.name(), "Untitled");
        let leaf = map.node(&NodeId::new("leaf")).unwrap();
        assert_eq!(leaf.shape(), NodeShape::RoundedRectangle);
        assert_eq!(leaf.font_size(), 14.0);
    }

    fn node(id: &str, center: bool, parent: Option<&str>, children: &[&str]) -> NodeRecord {
        NodeRecord {
            id: NodeId::new(id),
            text: id.to_string(),
            x: 0.0,
            y: 0.0,
            width: 120.0,
            height: 40.0,
            manually_positioned: false,
            shape: NodeShape::default(),
            line_style: LineStyle::default(),
            font_size: 14.0,
            size_scale: 1.0,
            is_center: center,
            parent: parent.map(NodeId::new),
            children: children.iter().map(|c| NodeId::new(*c)).collect(),
        }
    }

    fn load_records(nodes: Vec<NodeRecord>) -> Result<MindMap, StoreError> {
        Document {
            version: FORMAT_VERSION,
            name: "t".to_string(),
            nodes,
        }
        .into_map(NodeSizing::default())
    }

    #[test]
    fn rejects_missing_and_duplicate_centers() {
        assert!(matches!(
            load_records(vec![node("a", false, None, &[])]),
            Err(StoreError::MissingCenter)
        ));
        assert!(matches!(
            load_records(vec![node("a", true, None, &[]), node("b", true, None, &[])]),
            Err(StoreError::MultipleCenters(_, _))
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        assert!(matches!(
            load_records(vec![node("a", true, None, &[]), node("a", false, None, &[])]),
            Err(StoreError::DuplicateId(_))
        ));
    }

    #[test]
    fn rejects_broken_links() {
        assert!(matches!(
            load_records(vec![node("a", true, None, &["ghost"])]),
            Err(StoreError::DanglingReference { .. })
        ));
        assert!(matches!(
            load_records(vec![node("a", true, None, &["b"]), node("b", false, None, &[])]),
            Err(StoreError::InconsistentEdge { .. })
        ));
        assert!(matches!(
            load_records(vec![node("a", true, Some("b"), &[]), node("b", false, None, &["a"])]),
            Err(StoreError::CenterHasParent(_))
        ));
    }

    #[test]
    fn rejects_cycles_among_free_nodes() {
        let result = load_records(vec![
            node("c", true, None, &[]),
            node("x", false, Some("y"), &["y"]),
            node("y", false, Some("x"), &["x"]),
        ]);
        assert!(matches!(result, Err(StoreError::Cycle(_))));
    }

    #[test]
    fn rejects_unknown_versions() {
        let json = r#"{ "version": 7, "nodes": [] }"#;
        assert!(matches!(from_json(json), Err(StoreError::UnsupportedVersion(7))));
    }

    #[test]
    fn garbage_reports_the_json_error() {
        assert!(matches!(from_json("not a document"), Err(StoreError::Parse(_))));
    }

    #[test]
    fn writer_and_reader_agree() {
        let map = sample();
        let mut buffer = Vec::new();
        write_document(&map, &mut buffer).unwrap();
        let loaded = read_document(buffer.as_slice(), NodeSizing::default()).unwrap();
        assert_eq!(records(&loaded), records(&map));
    }
}
