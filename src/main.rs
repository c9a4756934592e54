use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use hocr2pdf::{ConvertOptions, OverlayColor, TextMode};

#[derive(Parser, Debug)]
#[command(
    name = "hocr2pdf",
    version,
    about = "Overlay hOCR text on a scanned page image as a searchable PDF"
)]
struct Cli {
    /// hOCR file produced by the OCR engine
    hocr: PathBuf,

    /// Scanned page image (png/jpeg/tiff/bmp/gif)
    image: PathBuf,

    /// Output PDF path
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    /// Overlay font family, resolved from the system fonts
    #[arg(long = "font-family")]
    font_family: Option<String>,

    /// Overlay font file (ttf/otf), takes precedence over --font-family
    #[arg(long = "font-file")]
    font_file: Option<PathBuf>,

    /// Overlay text color as "r,g,b" with components in 0..=1
    #[arg(long = "text-color")]
    text_color: Option<String>,

    /// Draw the overlay text visibly instead of invisibly (debugging)
    #[arg(long = "visible-text")]
    visible_text: bool,

    /// Write a JSON dump of word placements next to the output
    #[arg(long = "debug-words")]
    debug_words: bool,

    /// Document title metadata (default: image file name)
    #[arg(long = "title")]
    title: Option<String>,

    /// Enable verbose logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    hocr2pdf::logging::init(cli.verbose);

    let color = match cli.text_color.as_deref() {
        Some(value) => parse_text_color(value)?,
        None => OverlayColor::default(),
    };
    let text_mode = if cli.visible_text {
        TextMode::Visible
    } else {
        TextMode::Invisible
    };
    let words_dump = cli
        .debug_words
        .then(|| hocr2pdf::words_dump_path(&cli.output));

    let options = ConvertOptions {
        font_file: cli.font_file.clone(),
        font_family: cli.font_family.clone(),
        color,
        text_mode,
        title: cli.title.clone(),
        words_dump,
    };

    let outcome = hocr2pdf::convert_files(&cli.hocr, &cli.image, &cli.output, &options)
        .with_context(|| {
            format!(
                "failed to convert {} with {}",
                cli.hocr.display(),
                cli.image.display()
            )
        })?;

    println!(
        "wrote {} ({:.1}x{:.1}pt, {} words placed, {} skipped)",
        cli.output.display(),
        outcome.page_width_pt,
        outcome.page_height_pt,
        outcome.words_placed,
        outcome.words_skipped
    );
    Ok(())
}

fn parse_text_color(value: &str) -> Result<OverlayColor> {
    let parts: Vec<f32> = value
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("invalid --text-color: {}", value))?;
    if parts.len() != 3 || parts.iter().any(|c| !(0.0..=1.0).contains(c)) {
        anyhow::bail!("invalid --text-color: {} (expected r,g,b in 0..=1)", value);
    }
    Ok(OverlayColor::Rgb {
        r: parts[0],
        g: parts[1],
        b: parts[2],
    })
}
