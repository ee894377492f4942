//! Font discovery for the Times New Roman family every document is typeset in.
//!
//! Directories are searched in this order:
//!
//! 1. the directory named by `DOCUMENT_BUILDER_FONTS_DIR`;
//! 2. `assets/fonts` next to the running executable;
//! 3. `assets/fonts` inside this crate;
//! 4. the system font directory, `DOCUMENT_BUILDER_SYSTEM_FONTS_DIR` or `%WINDIR%\Fonts`.
//!
//! A directory is usable when it holds one complete set of the four faces, either under the
//! bundled `TimesNewRoman-*.ttf` names or under the names Windows installs them with
//! (`TIMES.ttf`, `TIMESBD.ttf`, `TIMESI.ttf`, `TIMESBI.ttf`, in either case).

use std::env;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::Error;
use genpdf::fonts::{FontData, FontFamily};
use log::{debug, warn};

use crate::model::DEFAULT_FONT_FAMILY;

/// Overrides the bundled font directory.
pub const FONTS_DIR_ENV: &str = "DOCUMENT_BUILDER_FONTS_DIR";

/// Overrides the system font directory searched last.
pub const SYSTEM_FONTS_DIR_ENV: &str = "DOCUMENT_BUILDER_SYSTEM_FONTS_DIR";

/// File names of the four faces of one installation of the family.
#[derive(Debug, PartialEq, Eq)]
pub struct FontFiles {
    pub regular: &'static str,
    pub bold: &'static str,
    pub italic: &'static str,
    pub bold_italic: &'static str,
}

impl FontFiles {
    fn names(&self) -> [&'static str; 4] {
        [self.regular, self.bold, self.italic, self.bold_italic]
    }

    fn complete_in(&self, directory: &Path) -> bool {
        self.names().iter().all(|name| directory.join(name).is_file())
    }
}

/// The file name sets recognised in every searched directory, in order of preference.
pub const FONT_FILE_SETS: &[FontFiles] = &[
    FontFiles {
        regular: "TimesNewRoman-Regular.ttf",
        bold: "TimesNewRoman-Bold.ttf",
        italic: "TimesNewRoman-Italic.ttf",
        bold_italic: "TimesNewRoman-BoldItalic.ttf",
    },
    FontFiles {
        regular: "TIMES.ttf",
        bold: "TIMESBD.ttf",
        italic: "TIMESI.ttf",
        bold_italic: "TIMESBI.ttf",
    },
    FontFiles {
        regular: "times.ttf",
        bold: "timesbd.ttf",
        italic: "timesi.ttf",
        bold_italic: "timesbi.ttf",
    },
];

/// Where a searched directory came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontOrigin {
    Bundled,
    System,
}

/// A directory holding a complete set of faces.
#[derive(Debug, PartialEq, Eq)]
pub struct FontSource {
    pub directory: PathBuf,
    pub files: &'static FontFiles,
    pub origin: FontOrigin,
}

impl fmt::Display for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.directory.display(), self.files.regular)
    }
}

/// The `assets/fonts` directory shipped with the crate sources.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
}

fn system_font_directory() -> Option<PathBuf> {
    if let Some(path) = env_path(SYSTEM_FONTS_DIR_ENV) {
        return Some(path);
    }

    #[cfg(windows)]
    {
        for var in ["WINDIR", "SystemRoot"] {
            if let Some(root) = env_path(var) {
                return Some(root.join("Fonts"));
            }
        }
    }

    None
}

fn font_directory_candidates() -> Vec<(PathBuf, FontOrigin)> {
    let mut candidates: Vec<(PathBuf, FontOrigin)> = Vec::new();
    let mut push = |candidate: PathBuf, origin| {
        if !candidates.iter().any(|(existing, _)| existing == &candidate) {
            candidates.push((candidate, origin));
        }
    };

    if let Some(path) = env_path(FONTS_DIR_ENV) {
        push(path, FontOrigin::Bundled);
    }
    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            push(bin_dir.join("assets/fonts"), FontOrigin::Bundled);
        }
    }
    push(bundled_fonts_source_dir(), FontOrigin::Bundled);
    if let Some(path) = system_font_directory() {
        push(path, FontOrigin::System);
    }
    candidates
}

/// The first file name set present in full in `directory`.
pub fn font_files_in(directory: &Path) -> Option<&'static FontFiles> {
    FONT_FILE_SETS.iter().find(|files| files.complete_in(directory))
}

fn not_found(message: String) -> Error {
    Error::new(
        message,
        io::Error::new(io::ErrorKind::NotFound, "font files not found"),
    )
}

/// Picks the first candidate directory that holds a complete set of faces.
pub fn find_font_source(candidates: &[(PathBuf, FontOrigin)]) -> Result<FontSource, Error> {
    let mut attempts = Vec::with_capacity(candidates.len());

    for (directory, origin) in candidates {
        if !directory.is_dir() {
            attempts.push(format!("{} (directory missing)", directory.display()));
            continue;
        }
        match font_files_in(directory) {
            Some(files) => {
                return Ok(FontSource {
                    directory: directory.clone(),
                    files,
                    origin: *origin,
                })
            }
            None => attempts.push(format!("{} (no complete set)", directory.display())),
        }
    }

    Err(not_found(format!(
        "{} fonts unavailable. Checked: {}. Set {} to a directory holding {}.",
        DEFAULT_FONT_FAMILY,
        attempts.join(", "),
        FONTS_DIR_ENV,
        FONT_FILE_SETS[0].names().join(", ")
    )))
}

fn load_face(source: &FontSource, file: &str) -> Result<FontData, Error> {
    let path = source.directory.join(file);
    FontData::load(&path, None).map_err(|err| {
        Error::new(
            format!("Failed to load {} font {}: {}", DEFAULT_FONT_FAMILY, path.display(), err),
            io::Error::new(io::ErrorKind::InvalidData, err.to_string()),
        )
    })
}

/// Loads the four faces named by `source`.
pub fn load_font_family(source: &FontSource) -> Result<FontFamily<FontData>, Error> {
    Ok(FontFamily {
        regular: load_face(source, source.files.regular)?,
        bold: load_face(source, source.files.bold)?,
        italic: load_face(source, source.files.italic)?,
        bold_italic: load_face(source, source.files.bold_italic)?,
    })
}

/// Loads the Times New Roman family from the first directory that has it.
pub fn default_font_family() -> Result<FontFamily<FontData>, Error> {
    let source = find_font_source(&font_directory_candidates())?;
    match source.origin {
        FontOrigin::Bundled => debug!("Loading {} fonts from {}", DEFAULT_FONT_FAMILY, source),
        FontOrigin::System => warn!(
            "Bundled {} fonts unavailable; using the system files in {}",
            DEFAULT_FONT_FAMILY, source
        ),
    }
    load_font_family(&source)
}

/// Whether any searched directory holds a complete set of faces.
pub fn fonts_available() -> bool {
    find_font_source(&font_directory_candidates()).is_ok()
}
