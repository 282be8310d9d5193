//! CLI binary for universal-convert.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConverterConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use universal_convert::pipeline::render;
use universal_convert::{
    capabilities_for, check_slice_request, default_output_path, default_slice_output_path,
    slice_range,
    ConversionOutcome, ConversionRequest, ConvertError, Converter, ConverterConfig, FailureKind,
    FormatTag, CAPABILITY_MATRIX,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Image to PDF (writes scan.pdf next to the input)
  uconvert convert scan.png --to pdf

  # Every page of a PDF as PNG files 1.png, 2.png, … in out/
  uconvert convert report.pdf --to png -o out/

  # Tables in a PDF to a workbook
  uconvert convert invoice.pdf --to xlsx -o invoice-tables.xlsx

  # Pages 2 to 4 into report_pages_2_to_4.pdf
  uconvert slice report.pdf 2 4

  # What can a docx become, and can this machine do it?
  uconvert formats docx
  uconvert platform

SUPPORTED CONVERSIONS:
  Input   Outputs
  ─────   ──────────────────────────────
  jpg     png, jpeg, pdf
  jpeg    jpg, png, pdf
  png     jpg, jpeg, pdf
  pdf     jpg, jpeg, png, docx, xlsx
  docx    pdf            (needs LibreOffice)
  xlsx    csv            (first worksheet)
  pptx    pdf            (needs LibreOffice)

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH     Path to libpdfium (file or containing directory)
  UCONVERT_SOFFICE    Path to the LibreOffice soffice executable
  RUST_LOG            Override the log filter (e.g. universal_convert=debug)
"#;

/// Convert images, PDFs and office documents between formats.
#[derive(Parser, Debug)]
#[command(
    name = "uconvert",
    version,
    about = "Convert images, PDFs and office documents between formats",
    long_about = "Convert between jpg, jpeg, png, pdf, docx, xlsx, pptx and csv, \
and cut page ranges out of PDF documents. Unsupported pairs are reported and \
leave the file system untouched.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output structured JSON instead of human-readable text.
    #[arg(long, global = true, env = "UCONVERT_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "UCONVERT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "UCONVERT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert one file to another format.
    Convert {
        /// File to convert (jpg, jpeg, png, pdf, docx, xlsx or pptx).
        input: PathBuf,

        /// Target format.
        #[arg(short, long, value_parser = parse_format)]
        to: FormatTag,

        /// Destination file. For pdf → image this names the output folder.
        /// Default: the input's name with the target extension.
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: ConvertOptions,
    },

    /// Copy a 1-based inclusive page range of a PDF into a new PDF.
    Slice {
        /// Source PDF.
        input: PathBuf,

        /// First page to keep (1-based).
        start: String,

        /// Last page to keep (inclusive).
        end: String,

        /// Destination PDF. Default: <stem>_pages_<start>_to_<end>.pdf.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the formats a file type can be converted to.
    Formats {
        /// Input format (omit to list the whole table).
        #[arg(value_parser = parse_format)]
        input: Option<FormatTag>,

        #[command(flatten)]
        options: ConvertOptions,
    },

    /// Show which native renderers this machine has.
    Platform {
        #[command(flatten)]
        options: ConvertOptions,
    },
}

#[derive(Args, Debug, Clone)]
struct ConvertOptions {
    /// Rendering DPI for pdf → image (72–600).
    #[arg(long, env = "UCONVERT_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Pixel density assumed when wrapping an image into a PDF page.
    #[arg(long, env = "UCONVERT_IMAGE_DPI", default_value_t = 96)]
    image_dpi: u32,

    /// JPEG quality (1–100).
    #[arg(long, env = "UCONVERT_JPEG_QUALITY", default_value_t = 75,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "UCONVERT_PASSWORD")]
    password: Option<String>,

    /// LibreOffice `soffice` executable for docx/pptx → pdf.
    #[arg(long, env = "UCONVERT_SOFFICE")]
    soffice: Option<PathBuf>,

    /// pdfium shared library (file or containing directory).
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,
}

fn parse_format(s: &str) -> std::result::Result<FormatTag, String> {
    s.parse::<FormatTag>().map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || cli.json {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        Command::Convert {
            input,
            to,
            output,
            options,
        } => run_convert(&cli, input, *to, output.as_deref(), options),
        Command::Slice {
            input,
            start,
            end,
            output,
        } => run_slice(&cli, input, start, end, output.as_deref()),
        Command::Formats { input, options } => run_formats(&cli, *input, options),
        Command::Platform { options } => run_platform(&cli, options),
    }
}

/// Map CLI args to `ConverterConfig`.
fn build_config(options: &ConvertOptions) -> Result<ConverterConfig> {
    let mut builder = ConverterConfig::builder()
        .dpi(options.dpi)
        .image_dpi(options.image_dpi)
        .jpeg_quality(options.jpeg_quality);
    if let Some(ref pwd) = options.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(ref program) = options.soffice {
        builder = builder.office_program(program);
    }
    if let Some(ref lib) = options.pdfium_lib {
        builder = builder.pdfium_library(lib);
    }
    builder.build().context("Invalid configuration")
}

// ── convert ─────────────────────────────────────────────────────────────────

fn run_convert(
    cli: &Cli,
    input: &Path,
    to: FormatTag,
    output: Option<&Path>,
    options: &ConvertOptions,
) -> Result<()> {
    let config = build_config(options)?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input, to));

    let converter = Converter::new(config);
    let request = ConversionRequest::new(input, &output, to);
    let outcome = converter
        .convert(&request)
        .map_err(explain)
        .with_context(|| format!("Conversion of {} failed", input.display()))?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Failed to serialise outcome")?
        );
        return Ok(());
    }
    if cli.quiet {
        return Ok(());
    }
    match &outcome {
        ConversionOutcome::Converted { output } => {
            eprintln!("{} {}", green("✔"), outcome.message());
            if output.paths().len() > 1 {
                for p in output.paths() {
                    eprintln!("   {}", dim(&p.display().to_string()));
                }
            }
        }
        ConversionOutcome::Unsupported { input, .. } => {
            let offered: Vec<&str> = capabilities_for(*input).iter().map(|t| t.as_str()).collect();
            eprintln!("{} {}", yellow("⚠"), outcome.message());
            eprintln!("   {} can become: {}", input, offered.join(", "));
        }
    }
    Ok(())
}

/// Prefix platform failures so they read as a host limitation.
fn explain(e: ConvertError) -> anyhow::Error {
    match e.kind() {
        FailureKind::PlatformUnavailable => {
            anyhow::Error::new(e).context("This conversion is not available on this machine")
        }
        _ => anyhow::Error::new(e),
    }
}

// ── slice ───────────────────────────────────────────────────────────────────

fn run_slice(cli: &Cli, input: &Path, start: &str, end: &str, output: Option<&Path>) -> Result<()> {
    let range = check_slice_request(input, start, end)?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_slice_output_path(input, range));

    let written = slice_range(input, range, &output)
        .with_context(|| format!("Could not extract pages {range} of {}", input.display()))?;

    if cli.json {
        let report = serde_json::json!({
            "status": "sliced",
            "range": range,
            "output": written,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise result")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{} Pages {} saved to {}",
            green("✔"),
            range,
            bold(&written.display().to_string())
        );
    }
    Ok(())
}

// ── formats ─────────────────────────────────────────────────────────────────

fn run_formats(cli: &Cli, input: Option<FormatTag>, options: &ConvertOptions) -> Result<()> {
    let converter = Converter::new(build_config(options)?);
    let inputs: Vec<FormatTag> = match input {
        Some(tag) => vec![tag],
        None => CAPABILITY_MATRIX.iter().map(|c| c.input).collect(),
    };

    if cli.json {
        let rows: Vec<serde_json::Value> = inputs
            .iter()
            .map(|&i| {
                let outputs: Vec<serde_json::Value> = capabilities_for(i)
                    .into_iter()
                    .map(|o| serde_json::json!({ "format": o, "available": converter.can_convert(i, o) }))
                    .collect();
                serde_json::json!({ "input": i, "outputs": outputs })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).context("Failed to serialise formats")?
        );
        return Ok(());
    }

    for i in inputs {
        let outputs = capabilities_for(i);
        if outputs.is_empty() {
            println!("{:<6} {}", bold(i.as_str()), dim("(output only)"));
            continue;
        }
        let shown: Vec<String> = outputs
            .into_iter()
            .map(|o| {
                if converter.can_convert(i, o) {
                    o.to_string()
                } else {
                    red(&format!("{o} (unavailable)"))
                }
            })
            .collect();
        println!("{:<6} {}", bold(i.as_str()), shown.join(", "));
    }
    Ok(())
}

// ── platform ────────────────────────────────────────────────────────────────

fn run_platform(cli: &Cli, options: &ConvertOptions) -> Result<()> {
    let config = build_config(options)?;
    let converter = Converter::new(config.clone());
    let pdfium = render::is_available(&config);
    let office = converter.platform().office_program();

    if cli.json {
        let report = serde_json::json!({
            "pdfium": pdfium,
            "office_program": office,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise platform")?
        );
        return Ok(());
    }

    let mark = |ok: bool| if ok { green("✓") } else { red("✗") };
    println!(
        "{} pdfium      {}",
        mark(pdfium),
        dim("pdf → jpg/jpeg/png/docx/xlsx")
    );
    match office {
        Some(p) => println!("{} LibreOffice {}", mark(true), p.display()),
        None => println!(
            "{} LibreOffice {}",
            mark(false),
            dim("docx/pptx → pdf disabled (set UCONVERT_SOFFICE)")
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn convert_args_parse() {
        let cli = Cli::try_parse_from(["uconvert", "convert", "a.PNG", "--to", "JPG"]).unwrap();
        match cli.command {
            Command::Convert { to, output, .. } => {
                assert_eq!(to, FormatTag::Jpg);
                assert!(output.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_target_is_rejected() {
        assert!(Cli::try_parse_from(["uconvert", "convert", "a.png", "--to", "gif"]).is_err());
    }

    #[test]
    fn slice_of_missing_input_reports_the_file_first() {
        let cli = Cli::try_parse_from(["uconvert", "-q", "slice", "/nonexistent/missing.pdf", "a", "3"])
            .unwrap();
        let Command::Slice { input, start, end, output } = &cli.command else {
            panic!("expected slice");
        };
        let err = run_slice(&cli, input, start, end, output.as_deref()).unwrap_err();
        let e = err.downcast_ref::<ConvertError>().unwrap();
        assert!(matches!(e, ConvertError::InvalidFile { .. }), "{e}");
    }

    #[test]
    fn slice_keeps_raw_bounds() {
        let cli = Cli::try_parse_from(["uconvert", "slice", "r.pdf", "2", "x"]).unwrap();
        match cli.command {
            Command::Slice { start, end, .. } => {
                assert_eq!(start, "2");
                assert_eq!(end, "x");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
