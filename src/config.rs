//! Configuration for conversions and page slicing.
//!
//! Every knob lives in [`ConverterConfig`], built via
//! [`ConverterConfig::builder()`]. Callers set only what they care about and
//! rely on the documented defaults for the rest.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Environment variable naming the office renderer executable.
pub const SOFFICE_ENV: &str = "UCONVERT_SOFFICE";

/// Environment variable naming the pdfium shared library.
pub const PDFIUM_ENV: &str = "PDFIUM_LIB_PATH";

/// Configuration shared by every conversion a [`crate::Converter`] runs.
///
/// # Example
/// ```rust
/// use universal_convert::ConverterConfig;
///
/// let config = ConverterConfig::builder()
///     .dpi(300)
///     .jpeg_quality(90)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 300);
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Resolution used when rasterising PDF pages to images. Range: 72–600. Default: 200.
    pub dpi: u32,

    /// Pixel density assumed when wrapping an image into a PDF page. Default: 96.
    ///
    /// A 960 × 480 px image becomes a 720 × 360 pt page at 96 DPI.
    pub image_dpi: u32,

    /// JPEG encoder quality, 1–100. Default: 75.
    pub jpeg_quality: u8,

    /// Colour that transparent pixels are composited onto when the target
    /// format has no alpha channel (JPEG, PDF image streams). Default: white.
    pub background: [u8; 3],

    /// PDF user password for encrypted sources.
    pub password: Option<String>,

    /// Explicit office renderer executable (`soffice`). When `None`, the
    /// `UCONVERT_SOFFICE` variable and then `PATH` are searched.
    pub office_program: Option<PathBuf>,

    /// Explicit pdfium shared library. When `None`, `PDFIUM_LIB_PATH` and then
    /// the system loader are tried.
    pub pdfium_library: Option<PathBuf>,

    /// Minimum number of aligned rows for a region to count as a table. Default: 2.
    pub table_min_rows: usize,

    /// Minimum number of columns for a region to count as a table. Default: 2.
    pub table_min_columns: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            image_dpi: 96,
            jpeg_quality: 75,
            background: [255, 255, 255],
            password: None,
            office_program: None,
            pdfium_library: None,
            table_min_rows: 2,
            table_min_columns: 2,
        }
    }
}

impl fmt::Debug for ConverterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterConfig")
            .field("dpi", &self.dpi)
            .field("image_dpi", &self.image_dpi)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("background", &self.background)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("office_program", &self.office_program)
            .field("pdfium_library", &self.pdfium_library)
            .field("table_min_rows", &self.table_min_rows)
            .field("table_min_columns", &self.table_min_columns)
            .finish()
    }
}

impl ConverterConfig {
    /// Create a new builder for `ConverterConfig`.
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder {
            config: Self::default(),
        }
    }

    /// Rasterisation scale relative to PDF user space (72 units per inch).
    ///
    /// `dpi` is clamped to 72–600 here as well, since the fields are public
    /// and a struct literal never passes through [`ConverterConfigBuilder::build`].
    pub fn render_scale(&self) -> f32 {
        self.dpi.clamp(72, 600) as f32 / 72.0
    }

    /// PDF points per image pixel when wrapping an image into a page.
    ///
    /// An `image_dpi` of 0 falls back to the 96 DPI default.
    pub fn points_per_pixel(&self) -> f32 {
        let dpi = match self.image_dpi {
            0 => Self::default().image_dpi,
            n => n,
        };
        72.0 / dpi as f32
    }
}

/// Builder for [`ConverterConfig`].
#[derive(Debug)]
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn image_dpi(mut self, dpi: u32) -> Self {
        self.config.image_dpi = dpi;
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn background(mut self, rgb: [u8; 3]) -> Self {
        self.config.background = rgb;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn office_program(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.office_program = Some(path.into());
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn table_min_rows(mut self, n: usize) -> Self {
        self.config.table_min_rows = n;
        self
    }

    pub fn table_min_columns(mut self, n: usize) -> Self {
        self.config.table_min_columns = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConverterConfig, ConvertError> {
        let c = &self.config;
        if !(72..=600).contains(&c.dpi) {
            return Err(ConvertError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.image_dpi == 0 {
            return Err(ConvertError::InvalidConfig("image DPI must be ≥ 1".into()));
        }
        if c.table_min_rows < 2 {
            return Err(ConvertError::InvalidConfig(
                "a table needs at least 2 rows".into(),
            ));
        }
        if c.table_min_columns < 2 {
            return Err(ConvertError::InvalidConfig(
                "a table needs at least 2 columns".into(),
            ));
        }
        Ok(self.config)
    }
}
