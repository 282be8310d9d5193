//! docx→pdf and pptx→pdf through a headless LibreOffice.
//!
//! `soffice --headless --convert-to pdf --outdir <dir> <input>` writes
//! `<dir>/<input stem>.pdf`. The bridge points `--outdir` at a scratch
//! directory inside the destination directory and renames the result into
//! place, so the destination only ever holds a complete PDF.
//!
//! LibreOffice refuses to run two conversions against one user profile, so
//! each call gets a throwaway profile and calls are serialised by a
//! process-wide lock.

use crate::error::ConvertError;
use crate::format::Delegate;
use crate::output::{ensure_dir, parent_dir};
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

static OFFICE_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// Render `input` to PDF at `output` with the office program at `program`.
pub fn office_to_pdf(
    program: &Path,
    input: &Path,
    output: &Path,
    delegate: Delegate,
) -> Result<PathBuf, ConvertError> {
    let _guard = OFFICE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

    let dest_dir = parent_dir(output);
    ensure_dir(&dest_dir)?;
    let scratch = tempfile::Builder::new()
        .prefix(".uconvert-")
        .tempdir_in(&dest_dir)
        .map_err(|e| ConvertError::write_failed(&dest_dir, e))?;
    let outdir = scratch.path().join("out");
    let profile = scratch.path().join("profile");

    info!(
        "Rendering {} with {} → {}",
        input.display(),
        program.display(),
        output.display()
    );

    let mut cmd = Command::new(program);
    cmd.arg(format!("-env:UserInstallation={}", file_url(&profile)))
        .args(["--headless", "--norestore", "--convert-to", "pdf", "--outdir"])
        .arg(&outdir)
        .arg(input);
    hide_console_window(&mut cmd);
    debug!("Running {:?}", cmd);

    let run = cmd.output().map_err(|e| {
        ConvertError::delegate(
            delegate,
            format!("could not launch {}: {}", program.display(), e),
        )
    })?;
    let stderr = String::from_utf8_lossy(&run.stderr).trim().to_string();
    if !run.status.success() {
        return Err(ConvertError::delegate(
            delegate,
            format!("{} exited with {}: {}", program.display(), run.status, stderr),
        ));
    }

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let produced = outdir.join(format!("{stem}.pdf"));
    if !produced.is_file() {
        warn!("Office renderer exited cleanly but wrote nothing: {}", stderr);
        return Err(ConvertError::delegate(
            delegate,
            format!("no PDF was produced for {}: {}", input.display(), stderr),
        ));
    }

    std::fs::rename(&produced, output).map_err(|e| ConvertError::write_failed(output, e))?;
    Ok(output.to_path_buf())
}

/// `file://` URL for `path`, as LibreOffice expects for `-env:` options.
fn file_url(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    if raw.starts_with('/') {
        format!("file://{raw}")
    } else {
        format!("file:///{raw}")
    }
}

#[cfg(windows)]
fn hide_console_window(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn hide_console_window(_cmd: &mut Command) {}
