use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use ttf_parser::name_id;
use ttf_parser::Face;

use crate::error::{ConvertError, Result};

#[derive(Debug, Clone)]
pub struct FontMetrics {
    data: Arc<Vec<u8>>,
    units_per_em: u16,
    space_advance: u16,
    family: Option<String>,
    face_index: u32,
}

impl FontMetrics {
    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_ref()
    }
}

// metrics is None when no system font resolved; the built-in Times face
// carries the overlay and widths come from the character estimate
#[derive(Debug)]
pub struct OverlayFont {
    pub(crate) metrics: Option<FontMetrics>,
    pub(crate) family: String,
}

impl OverlayFont {
    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn metrics(&self) -> Option<&FontMetrics> {
        self.metrics.as_ref()
    }
}

#[cfg(target_os = "macos")]
fn fallback_font_families() -> &'static [&'static str] {
    &["Times New Roman", "Georgia", "serif"]
}

#[cfg(target_os = "windows")]
fn fallback_font_families() -> &'static [&'static str] {
    &["Times New Roman", "Georgia", "serif"]
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn fallback_font_families() -> &'static [&'static str] {
    &["Liberation Serif", "DejaVu Serif", "serif"]
}

// only the explicit file and family requests can fail
pub(crate) fn resolve_overlay_font(
    font_path: Option<&Path>,
    font_family: Option<&str>,
) -> Result<OverlayFont> {
    if let Some(path) = font_path {
        let metrics = load_font_metrics(path)?;
        let family = metrics
            .family()
            .map(|name| name.to_string())
            .or_else(|| font_family.map(|name| name.to_string()))
            .unwrap_or_else(|| "serif".to_string());
        return Ok(OverlayFont {
            metrics: Some(metrics),
            family,
        });
    }

    let mut db = fontdb::Database::new();
    db.load_system_fonts();

    if let Some(family) = font_family {
        let metrics = load_font_metrics_from_family(&db, family)?;
        let family = metrics
            .family()
            .map(|name| name.to_string())
            .unwrap_or_else(|| family.to_string());
        return Ok(OverlayFont {
            metrics: Some(metrics),
            family,
        });
    }

    for candidate in fallback_font_families() {
        if let Ok(metrics) = load_font_metrics_from_family(&db, candidate) {
            let family = metrics
                .family()
                .map(|name| name.to_string())
                .unwrap_or_else(|| candidate.to_string());
            return Ok(OverlayFont {
                metrics: Some(metrics),
                family,
            });
        }
    }

    debug!("no system serif font found, using built-in Times metrics");
    Ok(OverlayFont {
        metrics: None,
        family: "Times-Roman".to_string(),
    })
}

pub(crate) fn load_font_metrics(path: &Path) -> Result<FontMetrics> {
    let data = std::fs::read(path)
        .map_err(|err| ConvertError::Font(format!("{}: {}", path.display(), err)))?;
    load_font_metrics_from_data(&data, None)
        .map_err(|err| ConvertError::Font(format!("{}: {}", path.display(), err)))
}

// both width sources are non-decreasing in the size argument
pub(crate) fn measure_text_width_pt(
    text: &str,
    font_size: f32,
    font: Option<&FontMetrics>,
) -> f32 {
    if let Some(font) = font {
        if let Ok(face) = Face::parse(&font.data, font.face_index) {
            let mut advance = 0u32;
            for ch in text.chars() {
                if ch == '\n' {
                    continue;
                }
                if ch == ' ' {
                    advance = advance.saturating_add(font.space_advance as u32);
                    continue;
                }
                if let Some(glyph) = face.glyph_index(ch) {
                    let glyph_advance = face.glyph_hor_advance(glyph).unwrap_or(font.space_advance);
                    advance = advance.saturating_add(glyph_advance as u32);
                } else {
                    advance = advance.saturating_add(font.space_advance as u32);
                }
            }
            let units = font.units_per_em.max(1) as f32;
            return advance as f32 * (font_size / units);
        }
    }
    estimate_text_width_units(text) * font_size
}

fn estimate_char_units_for_width(ch: char) -> f32 {
    if ch.is_whitespace() {
        0.25
    } else if ch.is_ascii_alphanumeric() {
        0.55
    } else if ch.is_ascii() {
        0.35
    } else if matches!(
        ch as u32,
        0x4E00..=0x9FFF | 0x3040..=0x30FF | 0x31F0..=0x31FF
    ) {
        1.0
    } else {
        0.9
    }
}

fn estimate_text_width_units(text: &str) -> f32 {
    text.chars().map(estimate_char_units_for_width).sum()
}

fn load_font_metrics_from_data(data: &[u8], preferred_family: Option<&str>) -> Result<FontMetrics> {
    let mut fallback = None;
    let count = ttf_parser::fonts_in_collection(data).unwrap_or(1);
    for index in 0..count {
        if let Ok(face) = Face::parse(data, index) {
            let family = extract_family_name(&face);
            let units_per_em = face.units_per_em().max(1);
            let space_advance = face
                .glyph_index(' ')
                .and_then(|id| face.glyph_hor_advance(id))
                .unwrap_or(units_per_em / 2);
            let metrics = FontMetrics {
                data: Arc::new(data.to_vec()),
                units_per_em,
                space_advance,
                family: family.clone(),
                face_index: index,
            };
            if let (Some(preferred), Some(found)) = (preferred_family, &family) {
                if found.eq_ignore_ascii_case(preferred) {
                    return Ok(metrics);
                }
            }
            if fallback.is_none() {
                fallback = Some(metrics);
            }
        }
    }
    fallback.ok_or_else(|| ConvertError::Font("failed to parse font data".to_string()))
}

fn load_font_metrics_from_family(db: &fontdb::Database, family: &str) -> Result<FontMetrics> {
    let families = if family.eq_ignore_ascii_case("serif") {
        vec![fontdb::Family::Serif]
    } else if family.eq_ignore_ascii_case("sans-serif") {
        vec![fontdb::Family::SansSerif]
    } else {
        vec![fontdb::Family::Name(family)]
    };
    let query = fontdb::Query {
        families: &families,
        ..Default::default()
    };
    let id = db
        .query(&query)
        .ok_or_else(|| ConvertError::Font(format!("font not found: {}", family)))?;
    let data = db
        .with_face_data(id, |data, _index| data.to_vec())
        .ok_or_else(|| ConvertError::Font(format!("failed to load font data: {}", family)))?;
    load_font_metrics_from_data(&data, Some(family))
}

fn extract_family_name(face: &Face<'_>) -> Option<String> {
    let mut fallback = None;
    for name in face.names() {
        if name.name_id == name_id::TYPOGRAPHIC_FAMILY {
            if let Some(value) = name.to_string() {
                return Some(value);
            }
        } else if name.name_id == name_id::FAMILY && fallback.is_none() {
            fallback = name.to_string();
        }
    }
    fallback
}
