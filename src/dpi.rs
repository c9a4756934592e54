const METERS_PER_INCH: f32 = 0.0254;
const CM_PER_INCH: f32 = 2.54;

pub(crate) fn probe(bytes: &[u8]) -> Option<(f32, f32)> {
    let kind = infer::get(bytes)?;
    match kind.mime_type() {
        "image/png" => png_dpi(bytes),
        "image/jpeg" => jpeg_dpi(bytes),
        "image/tiff" => tiff_dpi(bytes),
        _ => None,
    }
}

fn png_dpi(bytes: &[u8]) -> Option<(f32, f32)> {
    // chunk stream starts after the 8-byte signature
    let mut offset = 8usize;
    loop {
        let length = read_u32_be(bytes, offset)? as usize;
        let kind = bytes.get(offset + 4..offset + 8)?;
        match kind {
            b"pHYs" => {
                let data = bytes.get(offset + 8..offset + 8 + length)?;
                if data.len() < 9 || data[8] != 1 {
                    return None;
                }
                let x_ppm = read_u32_be(data, 0)?;
                let y_ppm = read_u32_be(data, 4)?;
                return Some((
                    x_ppm as f32 * METERS_PER_INCH,
                    y_ppm as f32 * METERS_PER_INCH,
                ));
            }
            // pHYs must precede image data
            b"IDAT" | b"IEND" => return None,
            _ => {}
        }
        offset = offset.checked_add(12 + length)?;
    }
}

fn jpeg_dpi(bytes: &[u8]) -> Option<(f32, f32)> {
    let mut i = 2usize;
    loop {
        if *bytes.get(i)? != 0xFF {
            return None;
        }
        let marker = *bytes.get(i + 1)?;
        match marker {
            // fill byte before a marker
            0xFF => {
                i += 1;
                continue;
            }
            // standalone markers carry no length
            0x01 | 0xD0..=0xD8 => {
                i += 2;
                continue;
            }
            // end of image or start of scan: no density header present
            0xD9 | 0xDA => return None,
            _ => {}
        }
        let length = read_u16_be(bytes, i + 2)? as usize;
        if marker == 0xE0 {
            let data = bytes.get(i + 4..i + 2 + length)?;
            if data.len() >= 12 && data.starts_with(b"JFIF\0") {
                let x_density = read_u16_be(data, 8)? as f32;
                let y_density = read_u16_be(data, 10)? as f32;
                return match data[7] {
                    1 => Some((x_density, y_density)),
                    2 => Some((x_density * CM_PER_INCH, y_density * CM_PER_INCH)),
                    _ => None,
                };
            }
        }
        i = i.checked_add(2 + length)?;
    }
}

fn tiff_dpi(bytes: &[u8]) -> Option<(f32, f32)> {
    let big_endian = match bytes.get(0..4)? {
        [0x49, 0x49, 0x2A, 0x00] => false,
        [0x4D, 0x4D, 0x00, 0x2A] => true,
        _ => return None,
    };
    let ifd = read_u32(bytes, 4, big_endian)? as usize;
    let entry_count = read_u16(bytes, ifd, big_endian)? as usize;

    let mut x_res = None;
    let mut y_res = None;
    // ResolutionUnit defaults to inches when the tag is absent
    let mut unit = 2u16;

    for index in 0..entry_count {
        let entry = ifd + 2 + index * 12;
        let tag = read_u16(bytes, entry, big_endian)?;
        let field_type = read_u16(bytes, entry + 2, big_endian)?;
        match (tag, field_type) {
            // XResolution / YResolution, RATIONAL
            (282, 5) => x_res = read_rational(bytes, entry + 8, big_endian),
            (283, 5) => y_res = read_rational(bytes, entry + 8, big_endian),
            // ResolutionUnit, SHORT stored inline
            (296, 3) => unit = read_u16(bytes, entry + 8, big_endian)?,
            _ => {}
        }
    }

    let (x, y) = (x_res?, y_res?);
    match unit {
        2 => Some((x, y)),
        3 => Some((x * CM_PER_INCH, y * CM_PER_INCH)),
        _ => None,
    }
}

fn read_rational(bytes: &[u8], value_field: usize, big_endian: bool) -> Option<f32> {
    let offset = read_u32(bytes, value_field, big_endian)? as usize;
    let numerator = read_u32(bytes, offset, big_endian)?;
    let denominator = read_u32(bytes, offset + 4, big_endian)?;
    if denominator == 0 {
        return None;
    }
    Some(numerator as f32 / denominator as f32)
}

fn read_u16_be(bytes: &[u8], offset: usize) -> Option<u16> {
    let raw = bytes.get(offset..offset + 2)?;
    Some(u16::from_be_bytes([raw[0], raw[1]]))
}

fn read_u32_be(bytes: &[u8], offset: usize) -> Option<u32> {
    let raw = bytes.get(offset..offset + 4)?;
    Some(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

fn read_u16(bytes: &[u8], offset: usize, big_endian: bool) -> Option<u16> {
    let raw = bytes.get(offset..offset + 2)?;
    let pair = [raw[0], raw[1]];
    Some(if big_endian {
        u16::from_be_bytes(pair)
    } else {
        u16::from_le_bytes(pair)
    })
}

fn read_u32(bytes: &[u8], offset: usize, big_endian: bool) -> Option<u32> {
    let raw = bytes.get(offset..offset + 4)?;
    let quad = [raw[0], raw[1], raw[2], raw[3]];
    Some(if big_endian {
        u32::from_be_bytes(quad)
    } else {
        u32::from_le_bytes(quad)
    })
}
