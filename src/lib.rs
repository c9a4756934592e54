use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace};

mod canvas;
mod debug;
mod dpi;
mod error;
mod font;
mod geometry;
mod hocr;
pub mod logging;
mod overlay;
mod raster;

pub use debug::words_dump_path;
pub use error::{ConvertError, Result};
pub use hocr::{parse_words, BBoxPx, OcrWord};

// components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayColor {
    Rgb { r: f32, g: f32, b: f32 },
    Cmyk { c: f32, m: f32, y: f32, k: f32 },
}

impl Default for OverlayColor {
    fn default() -> Self {
        OverlayColor::Cmyk {
            c: 0.0,
            m: 0.0,
            y: 0.0,
            k: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMode {
    #[default]
    Invisible,
    Visible,
}

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    // font_file takes precedence over font_family
    pub font_file: Option<PathBuf>,
    pub font_family: Option<String>,
    pub color: OverlayColor,
    pub text_mode: TextMode,
    pub title: Option<String>,
    pub words_dump: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvertOutcome {
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub words_placed: usize,
    pub words_skipped: usize,
}

// words without a usable bbox descriptor are skipped and counted, never
// fatal; after an error the sink contents are invalid
pub fn convert<W: Write>(
    hocr: &[u8],
    image: &[u8],
    sink: W,
    options: &ConvertOptions,
) -> Result<ConvertOutcome> {
    let page = raster::RasterPage::decode(image)?;
    let geom = page.geometry();
    match page.dpi() {
        Some((dpi_x, dpi_y)) => info!(
            px_width = geom.px_width(),
            px_height = geom.px_height(),
            dpi_x,
            dpi_y,
            "decoded page image"
        ),
        None => info!(
            px_width = geom.px_width(),
            px_height = geom.px_height(),
            "decoded page image without resolution metadata"
        ),
    }

    let overlay_font =
        font::resolve_overlay_font(options.font_file.as_deref(), options.font_family.as_deref())?;
    info!(family = %overlay_font.family(), "resolved overlay font");

    let markup = String::from_utf8_lossy(hocr);
    let words = hocr::parse_words(&markup);

    let title = options.title.as_deref().unwrap_or("Scanned document");
    let canvas = canvas::PageCanvas::open(
        title,
        &geom,
        &page,
        &overlay_font,
        options.color,
        options.text_mode,
    )?;

    let mut records = options
        .words_dump
        .as_ref()
        .map(|_| Vec::with_capacity(words.len()));
    let mut words_placed = 0usize;
    let mut words_skipped = 0usize;

    for word in &words {
        let Some(bbox) = word.bbox else {
            debug!(word = %word.text, "word without bbox descriptor, skipping");
            words_skipped += 1;
            if let Some(records) = records.as_mut() {
                records.push(debug::WordRecord {
                    text: word.text.clone(),
                    bbox: None,
                    placement: None,
                });
            }
            continue;
        };
        let run = overlay::place_word(&word.text, &bbox, &geom, overlay_font.metrics());
        trace!(
            word = %run.text,
            origin_x = run.origin_x,
            baseline_y = run.baseline_y,
            font_size = run.font_size,
            "placed word"
        );
        canvas.write_run(&run);
        words_placed += 1;
        if let Some(records) = records.as_mut() {
            records.push(debug::WordRecord {
                text: word.text.clone(),
                bbox: Some(bbox),
                placement: Some(debug::Placement::from(&run)),
            });
        }
    }

    canvas.finish(sink)?;
    info!(words_placed, words_skipped, "wrote searchable page");

    if let (Some(path), Some(records)) = (options.words_dump.as_ref(), records.as_ref()) {
        debug::write_words_dump(path, records)?;
        info!(path = %path.display(), "wrote word placement dump");
    }

    Ok(ConvertOutcome {
        page_width_pt: geom.page_width_pt(),
        page_height_pt: geom.page_height_pt(),
        words_placed,
        words_skipped,
    })
}

// the output file is written only after the whole conversion succeeded
pub fn convert_files(
    hocr_path: &Path,
    image_path: &Path,
    output_path: &Path,
    options: &ConvertOptions,
) -> Result<ConvertOutcome> {
    let hocr = std::fs::read(hocr_path)?;
    let image = std::fs::read(image_path)?;

    let mut options = options.clone();
    if options.title.is_none() {
        options.title = image_path
            .file_stem()
            .and_then(|value| value.to_str())
            .map(|value| value.to_string());
    }

    let mut buffer = Vec::new();
    let outcome = convert(&hocr, &image, &mut buffer, &options)?;
    std::fs::write(output_path, &buffer)?;
    Ok(outcome)
}
