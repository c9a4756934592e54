pub(crate) const POINTS_PER_INCH: f32 = 72.0;

#[derive(Debug, Clone, Copy)]
pub(crate) struct PageGeometry {
    px_width: u32,
    px_height: u32,
    scale_x: f32,
    scale_y: f32,
}

impl PageGeometry {
    pub fn new(px_width: u32, px_height: u32, dpi_x: f32, dpi_y: f32) -> Self {
        Self {
            px_width,
            px_height,
            scale_x: scale_for_dpi(dpi_x),
            scale_y: scale_for_dpi(dpi_y),
        }
    }

    pub fn px_width(&self) -> u32 {
        self.px_width
    }

    pub fn px_height(&self) -> u32 {
        self.px_height
    }

    pub fn scale_x(&self) -> f32 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f32 {
        self.scale_y
    }

    pub fn page_width_pt(&self) -> f32 {
        self.px_width as f32 / self.scale_x
    }

    pub fn page_height_pt(&self) -> f32 {
        self.px_height as f32 / self.scale_y
    }

    pub fn x_to_pt(&self, px: u32) -> f32 {
        px as f32 / self.scale_x
    }

    // word rows count down from the top of the image, page points count up
    pub fn baseline_y_pt(&self, bottom_px: u32) -> f32 {
        (self.px_height as f32 - bottom_px as f32) / self.scale_y
    }
}

fn scale_for_dpi(dpi: f32) -> f32 {
    if dpi > 0.0 {
        dpi / POINTS_PER_INCH
    } else {
        1.0
    }
}
