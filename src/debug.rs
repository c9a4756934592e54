use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::hocr::BBoxPx;
use crate::overlay::PlacedRun;

#[derive(Debug, Serialize)]
pub(crate) struct WordRecord {
    pub(crate) text: String,
    pub(crate) bbox: Option<BBoxPx>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) placement: Option<Placement>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Placement {
    pub(crate) origin_x: f32,
    pub(crate) baseline_y: f32,
    pub(crate) font_size: f32,
}

impl From<&PlacedRun> for Placement {
    fn from(run: &PlacedRun) -> Self {
        Self {
            origin_x: run.origin_x,
            baseline_y: run.baseline_y,
            font_size: run.font_size,
        }
    }
}

pub fn words_dump_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|value| value.to_str())
        .unwrap_or("output");
    output.with_file_name(format!("{}_words.json", stem))
}

pub(crate) fn write_words_dump(path: &Path, records: &[WordRecord]) -> std::io::Result<()> {
    let json = serde_json::to_vec_pretty(records)?;
    std::fs::write(path, json)
}
