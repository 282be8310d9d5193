//! Output-path suggestions.
//!
//! A UI suggests an output path as soon as the user picks an input file and a
//! target format, and re-suggests it whenever the format changes. Two modes:
//!
//! * **regenerate**. The current output is still the suggestion we made last
//!   time, so the user has not touched it: suggest
//!   `<input dir>/<input stem>.<format>` afresh.
//! * **re-extension**. The user typed their own path: keep its directory and
//!   stem, swap only the extension.
//!
//! Comparing the current output with the last suggestion (after lexical
//! normalisation, `\` and `/` treated alike) is the only discriminator.

use crate::format::FormatTag;
use crate::slice::PageRange;
use std::path::{Path, PathBuf};

/// `<input dir>/<input stem>.<format>`.
pub fn default_output_path(input: &Path, format: FormatTag) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}.{format}"))
}

/// Suggest the output path after the input or the format changed.
///
/// `previous` is the output path currently shown to the user, if any. It is
/// treated as untouched when it equals the default suggestion for `input`
/// under either the new format or its own extension, i.e. when it is what
/// this function would have suggested last time. Use
/// [`OutputPathSuggester`] when the last suggestion is tracked explicitly.
pub fn derive_output_path(input: &Path, format: FormatTag, previous: Option<&Path>) -> PathBuf {
    let default = default_output_path(input, format);
    let Some(prev) = previous.filter(|p| !p.as_os_str().is_empty()) else {
        return default;
    };

    let last_default = match prev.extension() {
        Some(ext) => default.with_extension(ext),
        None => default.with_extension(""),
    };
    if same_path(prev, &default) || same_path(prev, &last_default) {
        default
    } else {
        replace_extension(prev, format)
    }
}

/// Stateful variant of [`derive_output_path`] that remembers its last suggestion.
#[derive(Debug, Default, Clone)]
pub struct OutputPathSuggester {
    last_suggested: Option<PathBuf>,
}

impl OutputPathSuggester {
    pub fn new() -> Self {
        Self::default()
    }

    /// The suggestion made by the most recent call to [`Self::suggest`].
    pub fn last_suggested(&self) -> Option<&Path> {
        self.last_suggested.as_deref()
    }

    /// Suggest an output path given what the output field currently holds.
    pub fn suggest(&mut self, input: &Path, format: FormatTag, current: Option<&Path>) -> PathBuf {
        let default = default_output_path(input, format);
        let untouched = match current.filter(|p| !p.as_os_str().is_empty()) {
            None => true,
            Some(cur) => self
                .last_suggested
                .as_deref()
                .is_some_and(|last| same_path(last, cur)),
        };
        let next = match current {
            Some(cur) if !untouched => replace_extension(cur, format),
            _ => default.clone(),
        };
        self.last_suggested = Some(default);
        next
    }

    /// Forget the last suggestion (e.g. the output field was cleared).
    pub fn reset(&mut self) {
        self.last_suggested = None;
    }
}

/// `<input dir>/<input stem>_pages_<start>_to_<end>.pdf`.
pub fn default_slice_output_path(input: &Path, range: PageRange) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!(
        "{stem}_pages_{}_to_{}.pdf",
        range.start(),
        range.end()
    ))
}

/// Keep directory and stem of `path`, set the extension to `format`.
pub fn replace_extension(path: &Path, format: FormatTag) -> PathBuf {
    path.with_extension(format.as_str())
}

/// Lexically normalised form of `path` with `/` separators.
///
/// Resolves `.` and `..` without touching the file system and accepts both
/// separator styles, so `C:\out\.\a.pdf` and `C:/out/a.pdf` compare equal.
pub fn normalize(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let absolute = raw.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in raw.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            p => parts.push(p),
        }
    }
    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// `true` when both paths normalise to the same string.
pub fn same_path(a: &Path, b: &Path) -> bool {
    normalize(a) == normalize(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_input_dir_and_stem() {
        let p = derive_output_path(Path::new("/a/b/report.docx"), FormatTag::Pdf, None);
        assert_eq!(p, PathBuf::from("/a/b/report.pdf"));
    }

    #[test]
    fn custom_output_keeps_dir_and_stem() {
        let input = Path::new("/a/b/report.docx");
        let p = derive_output_path(input, FormatTag::Png, Some(Path::new("/x/renamed.pdf")));
        assert_eq!(p, PathBuf::from("/x/renamed.png"));
    }

    #[test]
    fn untouched_suggestion_is_regenerated() {
        let input = Path::new("/a/b/scan.pdf");
        let first = derive_output_path(input, FormatTag::Jpg, None);
        assert_eq!(first, PathBuf::from("/a/b/scan.jpg"));
        let second = derive_output_path(input, FormatTag::Docx, Some(&first));
        assert_eq!(second, PathBuf::from("/a/b/scan.docx"));
    }

    #[test]
    fn separator_style_does_not_matter() {
        let input = Path::new("/a/b/report.docx");
        let p = derive_output_path(input, FormatTag::Pdf, Some(Path::new("\\a\\b\\.\\report.pdf")));
        assert_eq!(p, PathBuf::from("/a/b/report.pdf"));
    }

    #[test]
    fn empty_previous_counts_as_none() {
        let p = derive_output_path(Path::new("/a/photo.png"), FormatTag::Jpg, Some(Path::new("")));
        assert_eq!(p, PathBuf::from("/a/photo.jpg"));
    }

    #[test]
    fn relative_input_without_dir() {
        let p = derive_output_path(Path::new("photo.PNG"), FormatTag::Pdf, None);
        assert_eq!(p, PathBuf::from("photo.pdf"));
    }

    #[test]
    fn suggester_tracks_last_suggestion() {
        let mut s = OutputPathSuggester::new();
        let input = Path::new("/a/b/report.docx");

        let first = s.suggest(input, FormatTag::Pdf, None);
        assert_eq!(first, PathBuf::from("/a/b/report.pdf"));
        assert_eq!(s.last_suggested(), Some(Path::new("/a/b/report.pdf")));

        // User edits the field, then changes the format.
        let custom = PathBuf::from("/x/renamed.pdf");
        let next = s.suggest(input, FormatTag::Png, Some(&custom));
        assert_eq!(next, PathBuf::from("/x/renamed.png"));

        // A different input while the field still holds our suggestion.
        let mut s = OutputPathSuggester::new();
        let shown = s.suggest(input, FormatTag::Pdf, None);
        let other = s.suggest(Path::new("/c/deck.pptx"), FormatTag::Pdf, Some(&shown));
        assert_eq!(other, PathBuf::from("/c/deck.pdf"));
    }

    #[test]
    fn slice_output_name() {
        let range = PageRange::new(2, 4).unwrap();
        let p = default_slice_output_path(Path::new("/docs/book.pdf"), range);
        assert_eq!(p, PathBuf::from("/docs/book_pages_2_to_4.pdf"));
    }

    #[test]
    fn normalize_collapses_dots() {
        assert_eq!(normalize(Path::new("/a/./b/../c.pdf")), "/a/c.pdf");
        assert_eq!(normalize(Path::new("a\\b\\c.pdf")), "a/b/c.pdf");
        assert_eq!(normalize(Path::new("../x")), "../x");
        assert_eq!(normalize(Path::new("/../x")), "/x");
        assert_eq!(normalize(Path::new("./")), ".");
    }
}
