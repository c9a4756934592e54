use std::io::{BufWriter, Write};

use printpdf::{
    BuiltinFont, Color, Cmyk, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Pt, Rgb, TextRenderingMode,
};

use crate::error::{ConvertError, Result};
use crate::font::OverlayFont;
use crate::geometry::PageGeometry;
use crate::overlay::PlacedRun;
use crate::raster::RasterPage;
use crate::{OverlayColor, TextMode};

pub(crate) struct PageCanvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    color: OverlayColor,
    mode: TextMode,
}

impl PageCanvas {
    pub(crate) fn open(
        title: &str,
        geom: &PageGeometry,
        page: &RasterPage,
        overlay_font: &OverlayFont,
        color: OverlayColor,
        mode: TextMode,
    ) -> Result<Self> {
        let (doc, page_index, layer_index) = PdfDocument::new(
            title,
            Mm::from(Pt(geom.page_width_pt())),
            Mm::from(Pt(geom.page_height_pt())),
            "Layer 1",
        );
        let layer = doc.get_page(page_index).get_layer(layer_index);

        // 72dpi embed makes one pixel one point, the per-axis scale then
        // maps pixels to page points so the image lands exactly on the edges
        let background = Image::from_dynamic_image(page.image());
        background.add_to_layer(
            layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(0.0)),
                translate_y: Some(Mm(0.0)),
                rotate: None,
                scale_x: Some(1.0 / geom.scale_x()),
                scale_y: Some(1.0 / geom.scale_y()),
                dpi: Some(72.0),
            },
        );

        let font = match overlay_font.metrics() {
            Some(metrics) => doc
                .add_external_font(metrics.data())
                .map_err(|err| ConvertError::Artifact(err.to_string()))?,
            None => doc
                .add_builtin_font(BuiltinFont::TimesRoman)
                .map_err(|err| ConvertError::Artifact(err.to_string()))?,
        };

        Ok(Self {
            doc,
            layer,
            font,
            color,
            mode,
        })
    }

    pub(crate) fn write_run(&self, run: &PlacedRun) {
        self.layer.begin_text_section();
        self.layer.set_font(&self.font, run.font_size);
        self.layer.set_text_rendering_mode(render_mode(self.mode));
        self.layer.set_fill_color(fill_color(self.color));
        self.layer
            .set_text_cursor(Mm::from(Pt(run.origin_x)), Mm::from(Pt(run.baseline_y)));
        self.layer.write_text(run.text.as_str(), &self.font);
        self.layer.end_text_section();
    }

    pub(crate) fn finish<W: Write>(self, sink: W) -> Result<()> {
        let mut writer = BufWriter::new(sink);
        self.doc
            .save(&mut writer)
            .map_err(|err| ConvertError::Artifact(err.to_string()))?;
        writer.flush()?;
        Ok(())
    }
}

fn render_mode(mode: TextMode) -> TextRenderingMode {
    match mode {
        TextMode::Invisible => TextRenderingMode::Invisible,
        TextMode::Visible => TextRenderingMode::Fill,
    }
}

fn fill_color(color: OverlayColor) -> Color {
    match color {
        OverlayColor::Rgb { r, g, b } => Color::Rgb(Rgb::new(r, g, b, None)),
        OverlayColor::Cmyk { c, m, y, k } => Color::Cmyk(Cmyk::new(c, m, y, k, None)),
    }
}
