//! pdfium access: library binding, document loading and page rasterisation.
//!
//! Binding happens per call and the handle is dropped when the delegate
//! returns, so no pdfium state outlives one conversion.
//!
//! Library lookup order:
//!
//! 1. [`ConverterConfig::pdfium_library`]
//! 2. the `PDFIUM_LIB_PATH` environment variable (a file, or a directory
//!    holding the platform's library name)
//! 3. the system loader

use crate::config::{ConverterConfig, PDFIUM_ENV};
use crate::error::ConvertError;
use crate::format::{Delegate, FormatTag};
use crate::output::{parent_dir, StagedDir};
use crate::pipeline::encode::encode_image;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[cfg(target_os = "macos")]
const LIBRARY_NAME: &str = "libpdfium.dylib";
#[cfg(windows)]
const LIBRARY_NAME: &str = "pdfium.dll";
#[cfg(not(any(windows, target_os = "macos")))]
const LIBRARY_NAME: &str = "libpdfium.so";

/// Bind to a pdfium shared library.
pub fn bind(config: &ConverterConfig) -> Result<Pdfium, ConvertError> {
    let explicit = config
        .pdfium_library
        .clone()
        .or_else(|| std::env::var_os(PDFIUM_ENV).map(PathBuf::from));

    let bindings = match explicit {
        Some(path) => {
            let lib = if path.is_dir() {
                path.join(LIBRARY_NAME)
            } else {
                path
            };
            debug!("Binding pdfium from {}", lib.display());
            Pdfium::bind_to_library(&lib)
        }
        None => Pdfium::bind_to_system_library(),
    };

    bindings
        .map(Pdfium::new)
        .map_err(|e| ConvertError::PdfiumBindingFailed(e.to_string()))
}

/// `true` when [`bind`] would succeed with this configuration.
pub fn is_available(config: &ConverterConfig) -> bool {
    bind(config).is_ok()
}

/// Open `path`, mapping password and parse failures to their own variants.
pub fn load<'a>(
    pdfium: &'a Pdfium,
    path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, ConvertError> {
    pdfium.load_pdf_from_file(path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            ConvertError::PasswordRequired {
                path: path.to_path_buf(),
            }
        } else {
            ConvertError::CorruptPdf {
                path: path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

/// Directory that pdf→image output lands in.
///
/// The requested path itself when it is an existing directory, ends in a
/// separator, or has no extension. Otherwise it names a file and its parent
/// is used.
pub fn image_output_dir(requested: &Path) -> PathBuf {
    let names_dir = requested.is_dir()
        || ends_with_separator(requested)
        || requested.extension().is_none();
    if names_dir && !requested.as_os_str().is_empty() {
        requested.to_path_buf()
    } else {
        parent_dir(requested)
    }
}

fn ends_with_separator(path: &Path) -> bool {
    let s = path.as_os_str().to_string_lossy();
    s.ends_with('/') || (cfg!(windows) && s.ends_with('\\'))
}

/// File name of the image for 1-based `page`.
pub fn page_image_name(page: usize, format: FormatTag) -> String {
    format!("{page}.{format}")
}

/// Rasterise every page of `input` into `<n>.<format>` files.
///
/// Returns the written paths in page order. Files appear only once every page
/// has rendered.
pub fn pdf_to_images(
    input: &Path,
    output: &Path,
    target: FormatTag,
    config: &ConverterConfig,
) -> Result<Vec<PathBuf>, ConvertError> {
    let format = target.image_format().ok_or_else(|| {
        ConvertError::delegate(
            Delegate::PdfToImages,
            format!("no image encoder for {}", target.encoder_name()),
        )
    })?;
    let dir = image_output_dir(output);

    let pdfium = bind(config)?;
    let document = load(&pdfium, input, config.password.as_deref())?;
    let pages = document.pages();
    info!(
        "Rasterising {} pages of {} at {} DPI into {}",
        pages.len(),
        input.display(),
        config.dpi,
        dir.display()
    );

    let render_config = PdfRenderConfig::new().scale_page_by_factor(config.render_scale());
    let mut staged = StagedDir::create(&dir)?;

    for (idx, page) in pages.iter().enumerate() {
        let page_no = idx + 1;
        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            ConvertError::RasterisationFailed {
                page: page_no,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        let bytes = encode_image(&image, format, config.jpeg_quality, config.background)
            .map_err(|e| ConvertError::RasterisationFailed {
                page: page_no,
                detail: e.to_string(),
            })?;

        let path = staged.stage(page_image_name(page_no, target));
        std::fs::write(&path, &bytes).map_err(|e| ConvertError::write_failed(&path, e))?;
        debug!(
            "Rendered page {} → {}x{} px",
            page_no,
            image.width(),
            image.height()
        );
    }

    staged.commit()
}
