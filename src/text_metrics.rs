//! System font measurement, used when fast metrics are turned off.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Width of `text` in pixels for the first installed face matching
/// `font_family`. `None` when no face matches or the text has glyphs the
/// advance table does not cover.
pub fn measure_text_width(text: &str, font_size: f64, font_family: &str) -> Option<f64> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<String, Option<AdvanceTable>>,
}

/// ASCII horizontal advances in font units.
struct AdvanceTable {
    units_per_em: u16,
    ascii: [u16; 128],
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f64, font_family: &str) -> Option<f64> {
        if !text.is_ascii() {
            return None;
        }
        let key = normalize_family_key(font_family);
        if !self.cache.contains_key(&key) {
            let table = self.load_table(font_family);
            if table.is_none() {
                tracing::debug!(family = %key, "no system face found, using fallback widths");
            }
            self.cache.insert(key.clone(), table);
        }
        let table = self.cache.get(&key)?.as_ref()?;
        let scale = font_size / f64::from(table.units_per_em);
        let fallback = font_size * 0.56;
        let width = text
            .bytes()
            .filter(|byte| *byte != b'\n')
            .map(|byte| match table.ascii[byte as usize] {
                0 => fallback,
                advance => f64::from(advance) * scale,
            })
            .sum::<f64>();
        Some(width.max(0.0))
    }

    fn load_table(&mut self, font_family: &str) -> Option<AdvanceTable> {
        let names: Vec<&str> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\''))
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" | "system-ui" | "-apple-system" => Family::SansSerif,
                "monospace" | "ui-monospace" => Family::Monospace,
                _ => Family::Name(name),
            })
            .collect();
        families.push(Family::SansSerif);

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| {
                let face = Face::parse(data, index).ok()?;
                let mut ascii = [0u16; 128];
                for byte in 0u8..=127 {
                    if let Some(glyph) = face.glyph_index(byte as char) {
                        ascii[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
                    }
                }
                Some(AdvanceTable {
                    units_per_em: face.units_per_em().max(1),
                    ascii,
                })
            })
            .flatten()
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}
