//! Image encoding: `DynamicImage` → RGB PNG bytes.
//!
//! PNG is lossless, so text on the rendered page stays crisp. The alpha
//! channel is dropped before encoding; page previews are always opaque.

use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::debug;

/// Encode a rasterised page as an RGB PNG.
pub fn encode_page(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buf = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;

    debug!(
        "Encoded {}x{} page → {} bytes PNG",
        rgb.width(),
        rgb.height(),
        buf.len()
    );
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ColorType, Rgba, RgbaImage};

    #[test]
    fn encode_drops_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 4, Rgba([255, 0, 0, 128])));
        let png = encode_page(&img).expect("encode should succeed");
        assert_eq!(&png[1..4], b"PNG");

        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
        assert_eq!(decoded.color(), ColorType::Rgb8);
        assert_eq!((decoded.width(), decoded.height()), (10, 4));
    }
}
