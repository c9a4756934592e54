use printpdf::image_crate::DynamicImage;

use crate::dpi;
use crate::error::{ConvertError, Result};
use crate::geometry::PageGeometry;

#[derive(Debug)]
pub(crate) struct RasterPage {
    image: DynamicImage,
    px_width: u32,
    px_height: u32,
    dpi: Option<(f32, f32)>,
}

impl RasterPage {
    pub(crate) fn decode(bytes: &[u8]) -> Result<Self> {
        let image = printpdf::image_crate::load_from_memory(bytes)
            .map_err(|err| ConvertError::ImageDecode(err.to_string()))?;
        let px_width = image.width();
        let px_height = image.height();
        let dpi = dpi::probe(bytes);
        Ok(Self {
            image,
            px_width,
            px_height,
            dpi,
        })
    }

    pub(crate) fn geometry(&self) -> PageGeometry {
        let (dpi_x, dpi_y) = self.dpi.unwrap_or((0.0, 0.0));
        PageGeometry::new(self.px_width, self.px_height, dpi_x, dpi_y)
    }

    pub(crate) fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub(crate) fn dpi(&self) -> Option<(f32, f32)> {
        self.dpi
    }
}
