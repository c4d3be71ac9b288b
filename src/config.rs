use crate::layout::LayoutKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Inputs for deriving a node's box from its label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSizing {
    pub min_width: f64,
    pub base_height: f64,
    pub padding: f64,
    pub font_family: String,
    pub font_size: f64,
    pub fast_text_metrics: bool,
}

impl Default for NodeSizing {
    fn default() -> Self {
        Self {
            min_width: 120.0,
            base_height: 40.0,
            padding: 15.0,
            font_family: "Segoe UI".to_string(),
            font_size: 14.0,
            fast_text_metrics: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalancedConfig {
    pub horizontal_gap: f64,
    pub vertical_gap: f64,
    /// Extra vertical gap per depth step: the gap at depth `d` is
    /// `vertical_gap * (1 + depth_gap_scale * d)`.
    pub depth_gap_scale: f64,
    /// Per-level shrink factor. Recorded for renderers; never applied to node size.
    pub level_scale: f64,
    /// Center node x anchor as a fraction of the canvas width.
    pub anchor_x: f64,
    /// Share of the center's width that sits left of the anchor line:
    /// 0.5 centers it, 1.0 puts its right edge on the anchor.
    pub anchor_align: f64,
}

impl BalancedConfig {
    fn with_gaps(horizontal_gap: f64, vertical_gap: f64, depth_gap_scale: f64, anchor_x: f64) -> Self {
        Self {
            horizontal_gap,
            vertical_gap,
            depth_gap_scale,
            level_scale: 0.9,
            anchor_x,
            anchor_align: 0.5,
        }
    }

    fn right_aligned(mut self) -> Self {
        self.anchor_align = 1.0;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogicalConfig {
    pub horizontal_gap: f64,
    pub vertical_gap: f64,
    pub margin_x: f64,
}

impl Default for LogicalConfig {
    fn default() -> Self {
        Self {
            horizontal_gap: 120.0,
            vertical_gap: 40.0,
            margin_x: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub horizontal_gap: f64,
    pub vertical_gap: f64,
    pub margin_top: f64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            horizontal_gap: 150.0,
            vertical_gap: 60.0,
            margin_top: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlineConfig {
    pub horizontal_gap: f64,
    pub vertical_gap: f64,
    pub margin: f64,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            horizontal_gap: 250.0,
            vertical_gap: 50.0,
            margin: 50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub standard: BalancedConfig,
    pub balanced: BalancedConfig,
    pub left: BalancedConfig,
    pub right: BalancedConfig,
    pub logical: LogicalConfig,
    pub level: LevelConfig,
    pub outline: OutlineConfig,
    pub tree_clone: BalancedConfig,
    pub right_clone: BalancedConfig,
    pub left_clone: BalancedConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            standard: BalancedConfig::with_gaps(200.0, 40.0, 0.0, 0.5),
            balanced: BalancedConfig::with_gaps(100.0, 40.0, 0.2, 0.5),
            left: BalancedConfig::with_gaps(100.0, 40.0, 0.2, 0.7),
            right: BalancedConfig::with_gaps(100.0, 40.0, 0.2, 0.3),
            logical: LogicalConfig::default(),
            level: LevelConfig::default(),
            outline: OutlineConfig::default(),
            tree_clone: BalancedConfig::with_gaps(250.0, 80.0, 0.0, 0.5),
            right_clone: BalancedConfig::with_gaps(250.0, 80.0, 0.0, 0.2).right_aligned(),
            left_clone: BalancedConfig::with_gaps(250.0, 80.0, 0.0, 0.8),
        }
    }
}

impl LayoutConfig {
    pub fn balanced_for(&self, kind: LayoutKind) -> Option<&BalancedConfig> {
        match kind {
            LayoutKind::Standard => Some(&self.standard),
            LayoutKind::Balanced => Some(&self.balanced),
            LayoutKind::Left => Some(&self.left),
            LayoutKind::Right => Some(&self.right),
            LayoutKind::TreeClone => Some(&self.tree_clone),
            LayoutKind::RightClone => Some(&self.right_clone),
            LayoutKind::LeftClone => Some(&self.left_clone),
            LayoutKind::Logical | LayoutKind::Level | LayoutKind::Outline => None,
        }
    }

    fn balanced_for_mut(&mut self, kind: LayoutKind) -> Option<&mut BalancedConfig> {
        match kind {
            LayoutKind::Standard => Some(&mut self.standard),
            LayoutKind::Balanced => Some(&mut self.balanced),
            LayoutKind::Left => Some(&mut self.left),
            LayoutKind::Right => Some(&mut self.right),
            LayoutKind::TreeClone => Some(&mut self.tree_clone),
            LayoutKind::RightClone => Some(&mut self.right_clone),
            LayoutKind::LeftClone => Some(&mut self.left_clone),
            LayoutKind::Logical | LayoutKind::Level | LayoutKind::Outline => None,
        }
    }
}

/// Connector drawing constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
    pub arrow_length: f64,
    /// Half-angle of the arrowhead, in degrees.
    pub arrow_angle_deg: f64,
    pub dash: [f64; 2],
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            arrow_length: 10.0,
            arrow_angle_deg: 30.0,
            dash: [5.0, 5.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub sizing: NodeSizing,
    pub layout: LayoutConfig,
    pub edges: EdgeStyle,
    pub canvas: CanvasConfig,
    pub default_layout: LayoutKind,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SizingFile {
    min_width: Option<f64>,
    base_height: Option<f64>,
    padding: Option<f64>,
    font_family: Option<String>,
    font_size: Option<f64>,
    fast_text_metrics: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOverrides {
    horizontal_gap: Option<f64>,
    vertical_gap: Option<f64>,
    depth_gap_scale: Option<f64>,
    level_scale: Option<f64>,
    anchor_x: Option<f64>,
    anchor_align: Option<f64>,
    margin: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EdgesFile {
    arrow_length: Option<f64>,
    arrow_angle: Option<f64>,
    dash: Option<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CanvasFile {
    width: Option<f64>,
    height: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    sizing: Option<SizingFile>,
    layouts: Option<BTreeMap<String, LayoutOverrides>>,
    edges: Option<EdgesFile>,
    canvas: Option<CanvasFile>,
    default_layout: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Overlays a camelCase JSON (or JSON5) config document onto the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents)
            .map_err(|_| anyhow::anyhow!("invalid config file: {json_err}"))?,
    };
    let mut config = Config::default();

    if let Some(sizing) = parsed.sizing {
        if let Some(v) = sizing.min_width {
            config.sizing.min_width = v;
        }
        if let Some(v) = sizing.base_height {
            config.sizing.base_height = v;
        }
        if let Some(v) = sizing.padding {
            config.sizing.padding = v;
        }
        if let Some(v) = sizing.font_family {
            config.sizing.font_family = v;
        }
        if let Some(v) = sizing.font_size {
            config.sizing.font_size = v;
        }
        if let Some(v) = sizing.fast_text_metrics {
            config.sizing.fast_text_metrics = v;
        }
    }

    if let Some(layouts) = parsed.layouts {
        for (name, overrides) in &layouts {
            apply_layout_overrides(&mut config.layout, name, overrides)?;
        }
    }

    if let Some(edges) = parsed.edges {
        if let Some(v) = edges.arrow_length {
            config.edges.arrow_length = v;
        }
        if let Some(v) = edges.arrow_angle {
            config.edges.arrow_angle_deg = v;
        }
        if let Some(v) = edges.dash {
            config.edges.dash = v;
        }
    }

    if let Some(canvas) = parsed.canvas {
        if let Some(v) = canvas.width {
            config.canvas.width = v;
        }
        if let Some(v) = canvas.height {
            config.canvas.height = v;
        }
    }

    if let Some(name) = parsed.default_layout.as_deref() {
        config.default_layout = name.parse()?;
    }

    Ok(config)
}

fn apply_layout_overrides(
    layout: &mut LayoutConfig,
    name: &str,
    overrides: &LayoutOverrides,
) -> anyhow::Result<()> {
    let kind: LayoutKind = name.parse()?;
    if let Some(balanced) = layout.balanced_for_mut(kind) {
        if let Some(v) = overrides.horizontal_gap {
            balanced.horizontal_gap = v;
        }
        if let Some(v) = overrides.vertical_gap {
            balanced.vertical_gap = v;
        }
        if let Some(v) = overrides.depth_gap_scale {
            balanced.depth_gap_scale = v;
        }
        if let Some(v) = overrides.level_scale {
            balanced.level_scale = v;
        }
        if let Some(v) = overrides.anchor_x {
            balanced.anchor_x = v;
        }
        if let Some(v) = overrides.anchor_align {
            balanced.anchor_align = v;
        }
        return Ok(());
    }
    match kind {
        LayoutKind::Logical => {
            let logical = &mut layout.logical;
            if let Some(v) = overrides.horizontal_gap {
                logical.horizontal_gap = v;
            }
            if let Some(v) = overrides.vertical_gap {
                logical.vertical_gap = v;
            }
            if let Some(v) = overrides.margin {
                logical.margin_x = v;
            }
        }
        LayoutKind::Level => {
            let level = &mut layout.level;
            if let Some(v) = overrides.horizontal_gap {
                level.horizontal_gap = v;
            }
            if let Some(v) = overrides.vertical_gap {
                level.vertical_gap = v;
            }
            if let Some(v) = overrides.margin {
                level.margin_top = v;
            }
        }
        LayoutKind::Outline => {
            let outline = &mut layout.outline;
            if let Some(v) = overrides.horizontal_gap {
                outline.horizontal_gap = v;
            }
            if let Some(v) = overrides.vertical_gap {
                outline.vertical_gap = v;
            }
            if let Some(v) = overrides.margin {
                outline.margin = v;
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.standard.horizontal_gap, 200.0);
        assert_eq!(config.default_layout, LayoutKind::Standard);
    }

    #[test]
    fn overrides_are_layered_on_defaults() {
        let config = parse_config(
            r#"{
                "sizing": { "minWidth": 90, "fontSize": 18 },
                "layouts": {
                    "level": { "verticalGap": 75 },
                    "tree-clone": { "horizontalGap": 300 }
                },
                "edges": { "arrowLength": 14 },
                "defaultLayout": "logical"
            }"#,
        )
        .unwrap();
        assert_eq!(config.sizing.min_width, 90.0);
        assert_eq!(config.sizing.font_size, 18.0);
        assert_eq!(config.sizing.base_height, 40.0);
        assert_eq!(config.layout.level.vertical_gap, 75.0);
        assert_eq!(config.layout.level.horizontal_gap, 150.0);
        assert_eq!(config.layout.tree_clone.horizontal_gap, 300.0);
        assert_eq!(config.edges.arrow_length, 14.0);
        assert_eq!(config.default_layout, LayoutKind::Logical);
    }

    #[test]
    fn json5_config_is_accepted() {
        let config = parse_config("{ canvas: { width: 640, }, }").unwrap();
        assert_eq!(config.canvas.width, 640.0);
        assert_eq!(config.canvas.height, 800.0);
    }

    #[test]
    fn balanced_constants_are_looked_up_by_kind() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.balanced_for(LayoutKind::LeftClone).unwrap().anchor_x, 0.8);
        assert_eq!(layout.balanced_for(LayoutKind::Balanced).unwrap().level_scale, 0.9);
        assert!(layout.balanced_for(LayoutKind::Outline).is_none());
        assert_eq!(layout.right_clone.anchor_align, 1.0);
        assert_eq!(layout.left_clone.anchor_align, 0.5);
    }

    #[test]
    fn anchor_alignment_can_be_overridden() {
        let config =
            parse_config(r#"{ "layouts": { "right_clone": { "anchorAlign": 0.5 } } }"#).unwrap();
        assert_eq!(config.layout.right_clone.anchor_align, 0.5);
        assert_eq!(config.layout.right_clone.anchor_x, 0.2);
    }

    #[test]
    fn unknown_layout_name_is_rejected() {
        assert!(parse_config(r#"{ "layouts": { "spiral": {} } }"#).is_err());
    }
}
