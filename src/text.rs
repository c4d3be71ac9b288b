use crate::config::NodeSizing;

/// Approximate glyph advance as a fraction of the font size.
pub(crate) fn char_width_factor(ch: char) -> f64 {
    match ch {
        ' ' => 0.306,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' => 0.321,
        'i' | 'j' | 'l' | 'I' => 0.25,
        'f' | 't' | 'r' => 0.34,
        'm' | 'w' => 0.84,
        'M' | 'W' => 0.93,
        '@' | '#' | '%' | '&' => 0.946,
        'A'..='Z' => 0.66,
        'a'..='z' => 0.56,
        '0'..='9' => 0.59,
        ch if is_wide(ch) => 1.0,
        _ => 0.568,
    }
}

/// CJK ideographs, kana and full-width forms occupy a full em.
fn is_wide(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6)
}

fn fallback_text_width(text: &str, font_size: f64) -> f64 {
    text.chars()
        .filter(|ch| *ch != '\n')
        .map(char_width_factor)
        .sum::<f64>()
        * font_size
}

pub fn text_width(text: &str, font_size: f64, sizing: &NodeSizing) -> f64 {
    if sizing.fast_text_metrics {
        return fallback_text_width(text, font_size);
    }
    #[cfg(feature = "font-metrics")]
    {
        if let Some(width) =
            crate::text_metrics::measure_text_width(text, font_size, &sizing.font_family)
        {
            return width;
        }
    }
    fallback_text_width(text, font_size)
}

/// Box for a label: at least `min_width` wide, scaled by `scale`.
pub fn node_size(text: &str, font_size: f64, scale: f64, sizing: &NodeSizing) -> (f64, f64) {
    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    let label = text_width(text, font_size, sizing) + 2.0 * sizing.padding;
    let width = sizing.min_width.max(label) * scale;
    let height = (sizing.base_height * scale).max(1.0);
    (width, height)
}
