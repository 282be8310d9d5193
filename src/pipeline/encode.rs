//! Image encoding: `DynamicImage` → bytes in the target codec.
//!
//! JPEG has no alpha channel. Rather than letting the encoder reject RGBA
//! input (or silently drop the channel), transparent pixels are composited
//! onto the configured background colour first. PNG keeps alpha as-is.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use tracing::debug;

/// Composite `img` over an opaque `background`, yielding 8-bit RGB.
pub fn flatten(img: &DynamicImage, background: [u8; 3]) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }
    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let a = u16::from(a);
        let blend = |c: u8, bg: u8| -> u8 {
            ((u16::from(c) * a + u16::from(bg) * (255 - a) + 127) / 255) as u8
        };
        Rgb([
            blend(r, background[0]),
            blend(g, background[1]),
            blend(b, background[2]),
        ])
    })
}

/// Encode `img` as `format` (PNG or JPEG).
pub fn encode_image(
    img: &DynamicImage,
    format: ImageFormat,
    jpeg_quality: u8,
    background: [u8; 3],
) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    if format == ImageFormat::Jpeg {
        let rgb = flatten(img, background);
        let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buf), jpeg_quality);
        rgb.write_with_encoder(encoder)?;
    } else {
        img.write_to(&mut Cursor::new(&mut buf), format)?;
    }
    debug!(
        "Encoded {}x{} image → {} bytes {:?}",
        img.width(),
        img.height(),
        buf.len(),
        format
    );
    Ok(buf)
}
