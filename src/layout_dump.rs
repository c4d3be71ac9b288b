use crate::anchor::{EdgeGeometry, edges_with};
use crate::config::EdgeStyle;
use crate::model::{LineStyle, MindMap, NodeShape};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub name: String,
    pub layout: String,
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Bounding box of every node, `[min_x, min_y, max_x, max_y]`.
    pub bounds: Option<[f64; 4]>,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    pub text: String,
    pub shape: NodeShape,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub depth: Option<usize>,
    pub manually_positioned: bool,
    pub center: bool,
    pub free: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
    pub line_style: LineStyle,
    #[serde(flatten)]
    pub geometry: EdgeGeometry,
}

impl LayoutDump {
    pub fn from_map(
        map: &MindMap,
        layout: &str,
        canvas: (f64, f64),
        style: &EdgeStyle,
    ) -> Self {
        let nodes: Vec<NodeDump> = map
            .all_nodes()
            .map(|node| NodeDump {
                id: node.id().to_string(),
                text: node.text().to_string(),
                shape: node.shape(),
                x: node.x(),
                y: node.y(),
                width: node.width(),
                height: node.height(),
                depth: map.depth(node.id()),
                manually_positioned: node.is_manually_positioned(),
                center: node.is_center_node(),
                free: node.is_free_root(),
            })
            .collect();

        let edges = edges_with(map, style)
            .into_iter()
            .map(|edge| EdgeDump {
                line_style: map
                    .node(&edge.child)
                    .map(|child| child.line_style())
                    .unwrap_or_default(),
                from: edge.parent.to_string(),
                to: edge.child.to_string(),
                geometry: edge.geometry,
            })
            .collect();

        let bounds = nodes.iter().fold(None, |acc: Option<[f64; 4]>, node| {
            let [min_x, min_y, max_x, max_y] = acc.unwrap_or([
                f64::INFINITY,
                f64::INFINITY,
                f64::NEG_INFINITY,
                f64::NEG_INFINITY,
            ]);
            Some([
                min_x.min(node.x),
                min_y.min(node.y),
                max_x.max(node.x + node.width),
                max_y.max(node.y + node.height),
            ])
        });

        LayoutDump {
            name: map.name().to_string(),
            layout: layout.to_string(),
            canvas_width: canvas.0,
            canvas_height: canvas.1,
            bounds,
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump_to<W: Write>(writer: W, dump: &LayoutDump) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(writer, dump)?;
    Ok(())
}

pub fn write_layout_dump(path: &Path, dump: &LayoutDump) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_layout_dump_to(&mut writer, dump)?;
    writer.flush()?;
    Ok(())
}
