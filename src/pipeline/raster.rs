//! Raster-image delegates: image→image re-encoding and image→pdf wrapping.

use crate::config::ConverterConfig;
use crate::error::ConvertError;
use crate::format::{Delegate, FormatTag};
use crate::output::StagedFile;
use crate::pipeline::encode::{encode_image, flatten};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::codecs::jpeg::JpegDecoder;
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageFormat};
use lopdf::{dictionary, Document, Object, Stream};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Decode `input` and re-encode it as `target` at `output`.
pub fn image_to_image(
    input: &Path,
    output: &Path,
    target: FormatTag,
    config: &ConverterConfig,
) -> Result<PathBuf, ConvertError> {
    let fail = |e: &dyn std::fmt::Display| ConvertError::delegate(Delegate::ImageToImage, e);

    let format = target
        .image_format()
        .ok_or_else(|| fail(&format!("no image encoder for {}", target.encoder_name())))?;
    let img = decode(input).map_err(|e| fail(&e))?;
    info!(
        "Re-encoding {} ({}x{}) as {}",
        input.display(),
        img.width(),
        img.height(),
        target.encoder_name()
    );

    let bytes =
        encode_image(&img, format, config.jpeg_quality, config.background).map_err(|e| fail(&e))?;
    let mut staged = StagedFile::create(output)?;
    staged
        .file()
        .write_all(&bytes)
        .map_err(|e| ConvertError::write_failed(output, e))?;
    staged.commit()
}

/// Wrap the image at `input` as a single-page PDF at `output`.
///
/// The page measures the image's pixel size at [`ConverterConfig::image_dpi`].
/// Opaque JPEGs are embedded as-is; everything else becomes Flate-compressed
/// RGB, flattened onto [`ConverterConfig::background`].
pub fn image_to_pdf(
    input: &Path,
    output: &Path,
    config: &ConverterConfig,
) -> Result<PathBuf, ConvertError> {
    let fail = |e: &dyn std::fmt::Display| ConvertError::delegate(Delegate::ImageToPdf, e);

    let bytes = std::fs::read(input).map_err(|e| fail(&e))?;
    let img = image::load_from_memory(&bytes).map_err(|e| fail(&e))?;
    let (width, height) = (img.width(), img.height());

    let xobject = match passthrough_jpeg(&bytes) {
        Some(color_space) => {
            debug!("Embedding JPEG stream verbatim ({color_space})");
            image_xobject(width, height, color_space, "DCTDecode", bytes)
        }
        None => {
            let rgb = flatten(&img, config.background);
            let mut z = ZlibEncoder::new(Vec::new(), Compression::default());
            z.write_all(rgb.as_raw()).map_err(|e| fail(&e))?;
            let data = z.finish().map_err(|e| fail(&e))?;
            debug!("Embedding {} bytes of Flate RGB", data.len());
            image_xobject(width, height, "DeviceRGB", "FlateDecode", data)
        }
    };

    let points = |px: u32| px as f32 * config.points_per_pixel();
    let (page_w, page_h) = (points(width), points(height));
    info!(
        "Wrapping {} ({}x{} px) as a {:.1}x{:.1} pt page",
        input.display(),
        width,
        height,
        page_w,
        page_h
    );

    let mut doc = single_image_document(xobject, page_w, page_h);
    let mut staged = StagedFile::create(output)?;
    doc.save_to(staged.file()).map_err(|e| fail(&e))?;
    staged.commit()
}

fn decode(path: &Path) -> Result<DynamicImage, image::ImageError> {
    image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
}

/// PDF colour space for a JPEG that can be embedded without re-encoding.
fn passthrough_jpeg(bytes: &[u8]) -> Option<&'static str> {
    if image::guess_format(bytes).ok()? != ImageFormat::Jpeg {
        return None;
    }
    match JpegDecoder::new(Cursor::new(bytes)).ok()?.original_color_type() {
        ExtendedColorType::Rgb8 => Some("DeviceRGB"),
        ExtendedColorType::L8 => Some("DeviceGray"),
        _ => None,
    }
}

fn image_xobject(width: u32, height: u32, color_space: &str, filter: &str, data: Vec<u8>) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => Object::Name(color_space.as_bytes().to_vec()),
            "BitsPerComponent" => 8_i64,
            "Filter" => Object::Name(filter.as_bytes().to_vec()),
        },
        data,
    )
}

fn single_image_document(image: Stream, page_w: f32, page_h: f32) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let image_id = doc.add_object(image);

    let content = format!("q {page_w:.4} 0 0 {page_h:.4} 0 0 cm /Im0 Do Q");
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
        "MediaBox" => vec![0.into(), 0.into(), Object::Real(page_w), Object::Real(page_h)],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1_i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}
