use std::io::Cursor;
use std::path::PathBuf;

use hocr2pdf::{
    convert, convert_files, words_dump_path, ConvertError, ConvertOptions, OverlayColor, TextMode,
};
use printpdf::image_crate::{DynamicImage, ImageFormat};

const SAMPLE_HOCR: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="en">
 <head>
  <title></title>
  <meta http-equiv="Content-Type" content="text/html;charset=utf-8"/>
  <meta name='ocr-system' content='tesseract 5.3.0'/>
 </head>
 <body>
  <div class='ocr_page' id='page_1' title='image "page.png"; bbox 0 0 288 384; ppageno 0'>
   <div class='ocr_carea' id='block_1_1' title="bbox 20 20 268 60">
    <p class='ocr_par' id='par_1_1' lang='eng' title="bbox 20 20 268 60">
     <span class='ocr_line' id='line_1_1' title="bbox 20 20 268 60; baseline 0 -8">
      <span class='ocrx_word' id='word_1_1' title='bbox 20 20 140 60; x_wconf 95'>Hello</span>
      <span class='ocrx_word' id='word_1_2' title='bbox 150 20 268 60; x_wconf 93'>world</span>
      <span class='ocrx_word' id='word_1_3'>orphan</span>
     </span>
    </p>
   </div>
  </div>
 </body>
</html>
"#;

fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::new_rgb8(width, height);
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

fn png_crc(bytes: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in bytes {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    crc ^ 0xFFFF_FFFF
}

// sample_png output with a pHYs chunk inserted after IHDR, same density on
// both axes
fn png_with_density(width: u32, height: u32, pixels_per_meter: u32) -> Vec<u8> {
    let base = sample_png(width, height);

    let mut chunk = Vec::with_capacity(21);
    chunk.extend_from_slice(&9u32.to_be_bytes());
    chunk.extend_from_slice(b"pHYs");
    chunk.extend_from_slice(&pixels_per_meter.to_be_bytes());
    chunk.extend_from_slice(&pixels_per_meter.to_be_bytes());
    chunk.push(1);
    let crc = png_crc(&chunk[4..]);
    chunk.extend_from_slice(&crc.to_be_bytes());

    // 8-byte signature plus the 25-byte IHDR chunk.
    let ihdr_end = 33;
    let mut bytes = Vec::with_capacity(base.len() + chunk.len());
    bytes.extend_from_slice(&base[..ihdr_end]);
    bytes.extend_from_slice(&chunk);
    bytes.extend_from_slice(&base[ihdr_end..]);
    bytes
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[test]
fn converts_page_with_invisible_text_layer() {
    let png = sample_png(288, 384);
    let mut out = Vec::new();

    let outcome = convert(
        SAMPLE_HOCR.as_bytes(),
        &png,
        &mut out,
        &ConvertOptions::default(),
    )
    .unwrap();

    assert_eq!(outcome.words_placed, 2);
    assert_eq!(outcome.words_skipped, 1);
    assert_eq!(outcome.page_width_pt, 288.0);
    assert_eq!(outcome.page_height_pt, 384.0);

    assert!(out.starts_with(b"%PDF"));
    assert!(contains_subslice(&out, b"%%EOF"));
    assert!(contains_subslice(&out, b"/Pages"));
    assert!(contains_subslice(&out, b"/XObject"));
    assert!(contains_subslice(&out, b"/Font"));
}

#[test]
fn declared_density_scales_the_page() {
    // 5906 px/m is what a 150 dpi scan declares.
    let png = png_with_density(300, 600, 5906);
    let mut out = Vec::new();

    let outcome = convert(
        SAMPLE_HOCR.as_bytes(),
        &png,
        &mut out,
        &ConvertOptions::default(),
    )
    .unwrap();

    assert!((outcome.page_width_pt - 144.0).abs() < 0.5);
    assert!((outcome.page_height_pt - 288.0).abs() < 0.5);
    assert!(out.starts_with(b"%PDF"));
}

#[test]
fn page_without_words_is_still_written() {
    let png = sample_png(64, 64);
    let mut out = Vec::new();

    let outcome = convert(
        b"<html><body><p>no ocr markup</p></body></html>",
        &png,
        &mut out,
        &ConvertOptions::default(),
    )
    .unwrap();

    assert_eq!(outcome.words_placed, 0);
    assert_eq!(outcome.words_skipped, 0);
    assert!(out.starts_with(b"%PDF"));
}

#[test]
fn empty_word_text_still_emits_a_run() {
    let png = sample_png(64, 64);
    let mut out = Vec::new();

    let outcome = convert(
        b"<html><body><span class='ocrx_word' title='bbox 10 10 50 30'></span></body></html>",
        &png,
        &mut out,
        &ConvertOptions::default(),
    )
    .unwrap();

    assert_eq!(outcome.words_placed, 1);
    assert_eq!(outcome.words_skipped, 0);
    assert!(out.starts_with(b"%PDF"));
}

#[test]
fn visible_text_mode_draws_colored_overlay() {
    let png = sample_png(288, 384);
    let options = ConvertOptions {
        color: OverlayColor::Rgb {
            r: 0.8,
            g: 0.1,
            b: 0.1,
        },
        text_mode: TextMode::Visible,
        ..ConvertOptions::default()
    };
    let mut out = Vec::new();

    let outcome = convert(SAMPLE_HOCR.as_bytes(), &png, &mut out, &options).unwrap();

    assert_eq!(outcome.words_placed, 2);
    assert!(out.starts_with(b"%PDF"));
}

#[test]
fn rejects_bytes_that_are_not_an_image() {
    let mut out = Vec::new();
    let err = convert(
        SAMPLE_HOCR.as_bytes(),
        b"not an image",
        &mut out,
        &ConvertOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(err, ConvertError::ImageDecode(_)));
}

#[test]
fn missing_font_file_fails_before_writing() {
    let png = sample_png(64, 64);
    let options = ConvertOptions {
        font_file: Some(PathBuf::from("/nonexistent/overlay-font.ttf")),
        ..ConvertOptions::default()
    };
    let mut out = Vec::new();

    let err = convert(SAMPLE_HOCR.as_bytes(), &png, &mut out, &options).unwrap_err();

    assert!(matches!(err, ConvertError::Font(_)));
}

#[test]
fn unknown_font_family_fails_before_writing() {
    let png = sample_png(64, 64);
    let options = ConvertOptions {
        font_family: Some("No Such Family 9000".to_string()),
        ..ConvertOptions::default()
    };
    let mut out = Vec::new();

    let err = convert(SAMPLE_HOCR.as_bytes(), &png, &mut out, &options).unwrap_err();

    assert!(matches!(err, ConvertError::Font(_)));
}

#[test]
fn convert_files_writes_pdf_and_word_dump() {
    let dir = tempfile::tempdir().unwrap();
    let hocr_path = dir.path().join("page.html");
    let image_path = dir.path().join("page.png");
    let output_path = dir.path().join("page.pdf");

    std::fs::write(&hocr_path, SAMPLE_HOCR).unwrap();
    std::fs::write(&image_path, sample_png(288, 384)).unwrap();

    let dump_path = words_dump_path(&output_path);
    let options = ConvertOptions {
        words_dump: Some(dump_path.clone()),
        ..ConvertOptions::default()
    };

    let outcome = convert_files(&hocr_path, &image_path, &output_path, &options).unwrap();
    assert_eq!(outcome.words_placed, 2);

    let pdf = std::fs::read(&output_path).unwrap();
    assert!(pdf.starts_with(b"%PDF"));

    assert_eq!(dump_path.file_name().unwrap(), "page_words.json");
    let dump: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&dump_path).unwrap()).unwrap();
    let records = dump.as_array().unwrap();
    assert_eq!(records.len(), 3);

    assert_eq!(records[0]["text"], "Hello");
    let origin_x = records[0]["placement"]["origin_x"].as_f64().unwrap();
    let baseline_y = records[0]["placement"]["baseline_y"].as_f64().unwrap();
    assert!((origin_x - 20.0).abs() < 0.01);
    assert!((baseline_y - 324.0).abs() < 0.01);
    assert!(records[0]["placement"]["font_size"].as_f64().unwrap() > 0.0);

    assert_eq!(records[2]["text"], "orphan");
    assert!(records[2]["bbox"].is_null());
    assert!(records[2].get("placement").is_none());
}
