//! Connector geometry between a parent and a child node: boundary anchors,
//! a cubic bezier between them, and an optional arrowhead at the child end.
//!
//! Everything here is a pure function of the two nodes' current boxes and
//! styles, re-derived on every redraw.

use crate::config::EdgeStyle;
use crate::model::{MindMap, Node, NodeId, NodeShape};
use serde::Serialize;

const AXIS_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Filled triangle whose `tip` sits on the end anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Arrowhead {
    pub tip: Point,
    pub left: Point,
    pub right: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeGeometry {
    pub start: Point,
    pub end: Point,
    pub control1: Point,
    pub control2: Point,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrowhead: Option<Arrowhead>,
    /// `[dash, gap]` lengths, `None` for a solid line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<[f64; 2]>,
}

impl EdgeGeometry {
    /// Point on the bezier at parameter `t` in `[0, 1]`.
    pub fn point_at(&self, t: f64) -> Point {
        let u = 1.0 - t;
        let w0 = u * u * u;
        let w1 = 3.0 * u * u * t;
        let w2 = 3.0 * u * t * t;
        let w3 = t * t * t;
        Point {
            x: w0 * self.start.x + w1 * self.control1.x + w2 * self.control2.x + w3 * self.end.x,
            y: w0 * self.start.y + w1 * self.control1.y + w2 * self.control2.y + w3 * self.end.y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub parent: NodeId,
    pub child: NodeId,
    pub geometry: EdgeGeometry,
}

/// Unit vector along `(dx, dy)`; a zero-length input points along +x.
fn unit(dx: f64, dy: f64) -> (f64, f64) {
    let len = dx.hypot(dy);
    if len <= AXIS_EPSILON || !len.is_finite() {
        (1.0, 0.0)
    } else {
        (dx / len, dy / len)
    }
}

/// Where a ray from the node's center in direction `dir` leaves its outline.
///
/// Ellipses use the parametric form `center + (hw·cos θ, hh·sin θ)`. Every
/// other shape is treated as its bounding rectangle.
pub fn boundary_point(node: &Node, dir: (f64, f64)) -> Point {
    let (cx, cy) = node.center();
    let half_w = node.width() / 2.0;
    let half_h = node.height() / 2.0;
    let (dx, dy) = unit(dir.0, dir.1);
    match node.shape() {
        NodeShape::Ellipse => {
            let theta = dy.atan2(dx);
            Point::new(cx + half_w * theta.cos(), cy + half_h * theta.sin())
        }
        NodeShape::Rectangle
        | NodeShape::RoundedRectangle
        | NodeShape::Diamond
        | NodeShape::Hexagon => {
            let (ox, oy) = rect_exit(half_w, half_h, dx, dy);
            Point::new(cx + ox, cy + oy)
        }
    }
}

/// Offset from the center of a `2·half_w × 2·half_h` box to where the ray
/// `(dx, dy)` crosses its edge.
fn rect_exit(half_w: f64, half_h: f64, dx: f64, dy: f64) -> (f64, f64) {
    if dx.abs() < AXIS_EPSILON {
        return (0.0, half_h.copysign(dy));
    }
    if dy.abs() < AXIS_EPSILON {
        return (half_w.copysign(dx), 0.0);
    }
    let slope = dy / dx;
    let side_x = half_w.copysign(dx);
    let side_y = slope * side_x;
    if side_y.abs() <= half_h {
        return (side_x, side_y);
    }
    let cap_y = half_h.copysign(dy);
    (cap_y / slope, cap_y)
}

pub fn compute_edge(parent: &Node, child: &Node) -> EdgeGeometry {
    compute_edge_with(parent, child, &EdgeStyle::default())
}

pub fn compute_edge_with(parent: &Node, child: &Node, style: &EdgeStyle) -> EdgeGeometry {
    let (pcx, pcy) = parent.center();
    let (ccx, ccy) = child.center();
    let (dx, dy) = unit(ccx - pcx, ccy - pcy);

    let start = boundary_point(parent, (dx, dy));
    let end = boundary_point(child, (-dx, -dy));

    let (control1, control2) = if (end.x - start.x).abs() >= (end.y - start.y).abs() {
        let mid_x = (start.x + end.x) / 2.0;
        (Point::new(mid_x, start.y), Point::new(mid_x, end.y))
    } else {
        let mid_y = (start.y + end.y) / 2.0;
        (Point::new(start.x, mid_y), Point::new(end.x, mid_y))
    };

    let line_style = child.line_style();
    let arrowhead = line_style
        .has_arrow()
        .then(|| arrowhead_at(end, (-dx, -dy), style));
    let dash = line_style.is_dashed().then_some(style.dash);

    EdgeGeometry {
        start,
        end,
        control1,
        control2,
        arrowhead,
        dash,
    }
}

/// `back` points from the tip toward the parent.
fn arrowhead_at(tip: Point, back: (f64, f64), style: &EdgeStyle) -> Arrowhead {
    let angle = style.arrow_angle_deg.to_radians();
    let rotate = |theta: f64| {
        let (sin, cos) = theta.sin_cos();
        Point::new(
            tip.x + style.arrow_length * (back.0 * cos - back.1 * sin),
            tip.y + style.arrow_length * (back.0 * sin + back.1 * cos),
        )
    };
    Arrowhead {
        tip,
        left: rotate(angle),
        right: rotate(-angle),
    }
}

/// Geometry for every parent→child link, free subtrees included.
pub fn edges(map: &MindMap) -> Vec<Edge> {
    edges_with(map, &EdgeStyle::default())
}

pub fn edges_with(map: &MindMap, style: &EdgeStyle) -> Vec<Edge> {
    map.links()
        .map(|(parent, child)| Edge {
            parent: parent.id().clone(),
            child: child.id().clone(),
            geometry: compute_edge_with(parent, child, style),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineStyle;

    const EPS: f64 = 1e-9;

    fn placed(map: &mut MindMap, text: &str, x: f64, y: f64, w: f64, h: f64) -> NodeId {
        let id = map.add_free_node(text, x, y);
        map.set_size(&id, w, h).unwrap();
        id
    }

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
    }

    #[test]
    fn ellipse_anchor_follows_the_radii() {
        let mut map = MindMap::new("c");
        let id = placed(&mut map, "e", 60.0, 80.0, 80.0, 40.0);
        map.set_shape(&id, NodeShape::Ellipse).unwrap();
        let node = map.node(&id).unwrap();
        assert!(close(boundary_point(node, (1.0, 0.0)), Point::new(140.0, 100.0)));
        assert!(close(boundary_point(node, (0.0, -3.0)), Point::new(100.0, 80.0)));
    }

    #[test]
    fn zero_direction_points_right() {
        let mut map = MindMap::new("c");
        let id = placed(&mut map, "r", 0.0, 0.0, 100.0, 40.0);
        let node = map.node(&id).unwrap();
        assert!(close(boundary_point(node, (0.0, 0.0)), Point::new(100.0, 20.0)));
    }

    #[test]
    fn rectangle_anchor_lies_on_the_outline() {
        let mut map = MindMap::new("c");
        let id = placed(&mut map, "r", 0.0, 0.0, 120.0, 40.0);
        let node = map.node(&id).unwrap();
        for step in 0..72 {
            let theta = step as f64 * 5f64.to_radians();
            let dir = (theta.cos(), theta.sin());
            let p = boundary_point(node, dir);
            let (ox, oy) = (p.x - 60.0, p.y - 20.0);
            let on_side = (ox.abs() - 60.0).abs() < EPS && oy.abs() <= 20.0 + EPS;
            let on_cap = (oy.abs() - 20.0).abs() < EPS && ox.abs() <= 60.0 + EPS;
            assert!(on_side || on_cap, "({ox}, {oy}) at {step}");
            // same direction as the ray
            assert!((ox * dir.1 - oy * dir.0).abs() < 1e-6);
            assert!(ox * dir.0 + oy * dir.1 > 0.0);
        }
    }

    #[test]
    fn ellipse_anchor_lies_on_the_outline() {
        let mut map = MindMap::new("c");
        let id = placed(&mut map, "e", 0.0, 0.0, 90.0, 50.0);
        map.set_shape(&id, NodeShape::Ellipse).unwrap();
        let node = map.node(&id).unwrap();
        for step in 0..36 {
            let theta = step as f64 * 10f64.to_radians();
            let p = boundary_point(node, (theta.cos(), theta.sin()));
            let (ox, oy) = (p.x - 45.0, p.y - 25.0);
            let norm = (ox / 45.0).powi(2) + (oy / 25.0).powi(2);
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn horizontal_links_bend_at_the_x_midpoint() {
        let mut map = MindMap::new("c");
        let parent = placed(&mut map, "p", 0.0, 0.0, 100.0, 40.0);
        let child = placed(&mut map, "k", 300.0, 100.0, 100.0, 40.0);
        let edge = compute_edge(map.node(&parent).unwrap(), map.node(&child).unwrap());
        let mid_x = (edge.start.x + edge.end.x) / 2.0;
        assert_eq!(edge.control1, Point::new(mid_x, edge.start.y));
        assert_eq!(edge.control2, Point::new(mid_x, edge.end.y));
        assert!(close(edge.point_at(0.0), edge.start));
        assert!(close(edge.point_at(1.0), edge.end));
        assert!(edge.arrowhead.is_none());
        assert!(edge.dash.is_none());
    }

    #[test]
    fn vertical_links_bend_at_the_y_midpoint() {
        let mut map = MindMap::new("c");
        let parent = placed(&mut map, "p", 0.0, 0.0, 100.0, 40.0);
        let child = placed(&mut map, "k", 20.0, 300.0, 100.0, 40.0);
        let edge = compute_edge(map.node(&parent).unwrap(), map.node(&child).unwrap());
        let mid_y = (edge.start.y + edge.end.y) / 2.0;
        assert_eq!(edge.control1, Point::new(edge.start.x, mid_y));
        assert_eq!(edge.control2, Point::new(edge.end.x, mid_y));
        assert_eq!(edge.start.y, 40.0);
        assert_eq!(edge.end.y, 300.0);
    }

    #[test]
    fn arrowhead_and_dash_follow_the_child_style() {
        let mut map = MindMap::new("c");
        let parent = placed(&mut map, "p", 0.0, 0.0, 100.0, 40.0);
        let child = placed(&mut map, "k", 300.0, 0.0, 100.0, 40.0);
        map.set_line_style(&child, LineStyle::ArrowDashed).unwrap();
        let edge = compute_edge(map.node(&parent).unwrap(), map.node(&child).unwrap());
        assert_eq!(edge.dash, Some([5.0, 5.0]));
        let head = edge.arrowhead.unwrap();
        assert_eq!(head.tip, Point::new(300.0, 20.0));
        let wing = 10.0 * 30f64.to_radians().cos();
        let spread = 10.0 * 30f64.to_radians().sin();
        assert!(close(head.left, Point::new(300.0 - wing, 20.0 - spread)));
        assert!(close(head.right, Point::new(300.0 - wing, 20.0 + spread)));

        map.set_line_style(&child, LineStyle::ArrowSolid).unwrap();
        let edge = compute_edge(map.node(&parent).unwrap(), map.node(&child).unwrap());
        assert!(edge.arrowhead.is_some());
        assert!(edge.dash.is_none());
    }

    #[test]
    fn edges_cover_the_center_tree_and_free_subtrees() {
        let mut map = MindMap::new("c");
        let root = map.root_id().clone();
        let a = map.add_child(&root, "a").unwrap();
        map.add_child(&a, "a1").unwrap();
        let free = map.add_free_node("f", 500.0, 500.0);
        map.add_child(&free, "f1").unwrap();
        let all = edges(&map);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].parent, root);
        assert_eq!(all[0].child, a);
    }
}
