//! Host capability detection.
//!
//! docx→pdf and pptx→pdf need a native office renderer. Whether one exists is
//! decided once, when a [`crate::Converter`] is built, and recorded in
//! [`Platform`]. Requests for those pairs on a host without a renderer fail
//! with [`crate::ConvertError::PlatformUnavailable`] before anything runs.
//!
//! Lookup order for the renderer executable:
//!
//! 1. [`ConverterConfig::office_program`]
//! 2. the `UCONVERT_SOFFICE` environment variable
//! 3. `soffice` / `libreoffice` on `PATH`
//! 4. the platform's default install location

use crate::config::{ConverterConfig, SOFFICE_ENV};
use crate::format::{Delegate, NativeRenderer};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[cfg(windows)]
const PROGRAM_NAMES: &[&str] = &["soffice.exe", "soffice.com"];
#[cfg(not(windows))]
const PROGRAM_NAMES: &[&str] = &["soffice", "libreoffice"];

#[cfg(target_os = "macos")]
const WELL_KNOWN: &[&str] = &["/Applications/LibreOffice.app/Contents/MacOS/soffice"];
#[cfg(windows)]
const WELL_KNOWN: &[&str] = &[
    r"C:\Program Files\LibreOffice\program\soffice.exe",
    r"C:\Program Files (x86)\LibreOffice\program\soffice.exe",
];
#[cfg(not(any(windows, target_os = "macos")))]
const WELL_KNOWN: &[&str] = &[
    "/usr/lib/libreoffice/program/soffice",
    "/opt/libreoffice/program/soffice",
    "/snap/bin/libreoffice",
];

/// Native applications available on this host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Platform {
    office_program: Option<PathBuf>,
}

impl Platform {
    /// Probe the host once.
    pub fn detect(config: &ConverterConfig) -> Self {
        let office_program = find_office_program(config.office_program.as_deref());
        match &office_program {
            Some(p) => info!("Office renderer: {}", p.display()),
            None => info!("No office renderer found; docx/pptx → pdf disabled"),
        }
        Self { office_program }
    }

    /// A host with no native renderers at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// A host whose office renderer is `program`, without probing.
    pub fn with_office_program(program: impl Into<PathBuf>) -> Self {
        Self {
            office_program: Some(program.into()),
        }
    }

    pub fn office_program(&self) -> Option<&Path> {
        self.office_program.as_deref()
    }

    /// Executable implementing `renderer`, if installed.
    ///
    /// LibreOffice handles both documents and presentations.
    pub fn renderer_for(&self, renderer: NativeRenderer) -> Option<&Path> {
        match renderer {
            NativeRenderer::Document | NativeRenderer::Presentation => self.office_program(),
        }
    }

    /// `true` when `delegate` can run on this host.
    pub fn supports(&self, delegate: Delegate) -> bool {
        delegate
            .native_renderer()
            .map_or(true, |r| self.renderer_for(r).is_some())
    }
}

fn find_office_program(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = configured {
        if is_executable(p) {
            return Some(p.to_path_buf());
        }
        warn!("Configured office program {} is not executable", p.display());
    }

    if let Some(p) = std::env::var_os(SOFFICE_ENV).map(PathBuf::from) {
        if is_executable(&p) {
            return Some(p);
        }
        warn!("{}={} is not executable", SOFFICE_ENV, p.display());
    }

    if let Some(p) = search_path(PROGRAM_NAMES) {
        return Some(p);
    }

    WELL_KNOWN
        .iter()
        .map(PathBuf::from)
        .find(|p| is_executable(p))
}

/// First match for any of `names` in the directories listed in `PATH`.
fn search_path(names: &[&str]) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .flat_map(|dir| names.iter().map(move |n| dir.join(n)))
        .find(|candidate| {
            debug!("Probing {}", candidate.display());
            is_executable(candidate)
        })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
