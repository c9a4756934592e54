use crate::font::{measure_text_width_pt, FontMetrics};
use crate::geometry::PageGeometry;
use crate::hocr::BBoxPx;

pub(crate) const FIT_STEP_PT: f32 = 0.1;
pub(crate) const MIN_FONT_SIZE_PT: f32 = 1.0;
const MAX_FIT_ITERATIONS: usize = 10_000;

// page point coordinates, origin bottom-left
#[derive(Debug, Clone)]
pub(crate) struct PlacedRun {
    pub(crate) text: String,
    pub(crate) origin_x: f32,
    pub(crate) baseline_y: f32,
    pub(crate) font_size: f32,
}

pub(crate) fn place_word(
    text: &str,
    bbox: &BBoxPx,
    geom: &PageGeometry,
    metrics: Option<&FontMetrics>,
) -> PlacedRun {
    let box_width_pt = (bbox.right as f32 - bbox.left as f32) / geom.scale_x();
    let box_height_pt = (bbox.bottom as f32 - bbox.top as f32) / geom.scale_y();
    let font_size = fit_font_size(text, box_width_pt, box_height_pt, metrics);
    PlacedRun {
        text: text.to_string(),
        origin_x: geom.x_to_pt(bbox.left),
        baseline_y: geom.baseline_y_pt(bbox.bottom),
        font_size,
    }
}

// zero or inverted box widths and never-fitting words resolve to the floor
pub(crate) fn fit_font_size(
    text: &str,
    box_width_pt: f32,
    box_height_pt: f32,
    metrics: Option<&FontMetrics>,
) -> f32 {
    let mut size = if box_height_pt > MIN_FONT_SIZE_PT {
        box_height_pt
    } else {
        MIN_FONT_SIZE_PT
    };
    for _ in 0..MAX_FIT_ITERATIONS {
        if measure_text_width_pt(text, size, metrics) < box_width_pt {
            return size;
        }
        if size - FIT_STEP_PT <= MIN_FONT_SIZE_PT {
            break;
        }
        size -= FIT_STEP_PT;
    }
    MIN_FONT_SIZE_PT
}
