//! The conversion dispatcher.
//!
//! [`Converter::convert`] validates a [`ConversionRequest`], resolves its
//! (input, output) pair against [`crate::format::CAPABILITY_MATRIX`] and runs
//! the matching delegate. Every check that can fail without touching the
//! output runs before any delegate starts:
//!
//! 1. the input is an existing, readable regular file
//! 2. its extension names a supported input format
//! 3. the pair has a route (otherwise [`ConversionOutcome::Unsupported`])
//! 4. a platform-constrained route has its native renderer (looked up before
//!    the renderer is started)

use crate::config::{ConverterConfig, SOFFICE_ENV};
use crate::error::ConvertError;
use crate::format::{resolve, Delegate, FormatTag, NativeRenderer};
use crate::output::{ConversionOutcome, ConvertedOutput};
use crate::pipeline::{docx, office, raster, render, sheet, xlsx};
use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One conversion job, built per user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub input_path: PathBuf,
    /// Destination file. For pdf→image this names the output directory
    /// instead (see [`crate::pipeline::render::image_output_dir`]).
    pub output_path: PathBuf,
    pub output_format: FormatTag,
}

impl ConversionRequest {
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        output_format: FormatTag,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            output_format,
        }
    }
}

/// Runs conversions with one configuration on one host.
#[derive(Debug, Clone)]
pub struct Converter {
    config: ConverterConfig,
    platform: Platform,
}

impl Converter {
    /// Build a converter, probing the host for native renderers once.
    pub fn new(config: ConverterConfig) -> Self {
        let platform = Platform::detect(&config);
        Self { config, platform }
    }

    /// Build a converter for an already-known host.
    pub fn with_platform(config: ConverterConfig, platform: Platform) -> Self {
        Self { config, platform }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// `true` when `input → output` has a route and this host can run it.
    pub fn can_convert(&self, input: FormatTag, output: FormatTag) -> bool {
        resolve(input, output).is_some_and(|d| self.platform.supports(d))
    }

    /// Run one conversion.
    ///
    /// # Returns
    /// * `Ok(Converted)`: output is in place
    /// * `Ok(Unsupported)`: the pair has no route; nothing was done
    ///
    /// # Errors
    /// Validation, delegate and platform failures, see [`ConvertError::kind`].
    /// No output exists at the destination after an error.
    pub fn convert(&self, request: &ConversionRequest) -> Result<ConversionOutcome, ConvertError> {
        let input = request.input_path.as_path();
        let output = request.output_path.as_path();
        let target = request.output_format;

        // ── Step 1: Input file ───────────────────────────────────────────
        check_input_file(input)?;

        // ── Step 2: Input format ─────────────────────────────────────────
        let source = FormatTag::from_input_path(input)?;

        // ── Step 3: Route ────────────────────────────────────────────────
        let Some(delegate) = resolve(source, target) else {
            info!("No route for {} → {}", source, target);
            return Ok(ConversionOutcome::Unsupported {
                input: source,
                output: target,
            });
        };

        // ── Step 4: Delegate ─────────────────────────────────────────────
        info!(
            "Converting {} ({} → {}) via {}",
            input.display(),
            source,
            target,
            delegate
        );
        let config = &self.config;
        let produced = match delegate {
            Delegate::ImageToImage => {
                ConvertedOutput::SingleFile(raster::image_to_image(input, output, target, config)?)
            }
            Delegate::ImageToPdf => {
                ConvertedOutput::SingleFile(raster::image_to_pdf(input, output, config)?)
            }
            Delegate::PdfToImages => {
                ConvertedOutput::MultiFile(render::pdf_to_images(input, output, target, config)?)
            }
            Delegate::PdfToDocx => {
                ConvertedOutput::SingleFile(docx::pdf_to_docx(input, output, config)?)
            }
            Delegate::PdfToXlsx => {
                ConvertedOutput::SingleFile(xlsx::pdf_to_xlsx(input, output, config)?)
            }
            Delegate::XlsxToCsv => {
                ConvertedOutput::SingleFile(sheet::xlsx_to_csv(input, output)?)
            }
            Delegate::DocxToPdf | Delegate::PptxToPdf => {
                let program = self.office_program(delegate, target)?;
                ConvertedOutput::SingleFile(office::office_to_pdf(program, input, output, delegate)?)
            }
        };

        debug!("{} produced {} file(s)", delegate, produced.paths().len());
        Ok(ConversionOutcome::Converted { output: produced })
    }

    fn office_program(&self, delegate: Delegate, target: FormatTag) -> Result<&Path, ConvertError> {
        let renderer = match delegate {
            Delegate::PptxToPdf => NativeRenderer::Presentation,
            _ => NativeRenderer::Document,
        };
        self.platform
            .renderer_for(renderer)
            .ok_or_else(|| unavailable(renderer, target))
    }
}

/// Run one conversion with a throwaway [`Converter`].
///
/// Probes the host on every call; keep a [`Converter`] around when converting
/// more than once.
pub fn convert(
    request: &ConversionRequest,
    config: &ConverterConfig,
) -> Result<ConversionOutcome, ConvertError> {
    Converter::new(config.clone()).convert(request)
}

fn unavailable(renderer: NativeRenderer, target: FormatTag) -> ConvertError {
    let name = match renderer {
        NativeRenderer::Document => "LibreOffice (Writer)",
        NativeRenderer::Presentation => "LibreOffice (Impress)",
    };
    ConvertError::platform_unavailable(
        target,
        name,
        &format!("Install LibreOffice, or set {SOFFICE_ENV} to the soffice executable."),
    )
}

/// Fail with [`ConvertError::InvalidFile`] unless `path` is a readable regular file.
pub(crate) fn check_input_file(path: &Path) -> Result<(), ConvertError> {
    let invalid = |reason: String| ConvertError::InvalidFile {
        path: path.to_path_buf(),
        reason,
    };
    let meta = std::fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => invalid("no such file".into()),
        _ => invalid(e.to_string()),
    })?;
    if !meta.is_file() {
        return Err(invalid("not a regular file".into()));
    }
    std::fs::File::open(path).map_err(|e| invalid(format!("cannot be read: {e}")))?;
    Ok(())
}
