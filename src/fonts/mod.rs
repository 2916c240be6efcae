//! Font discovery shared by the PDF renderer and the chart renderer.
//!
//! Both consumers need the same family: `genpdf` loads all four styles, while the chart renderer
//! only needs the raw bytes of the regular face.  Lookup order:
//!
//! 1. `LCA_REPORT_FONTS_DIR`
//! 2. `assets/fonts` next to the running executable
//! 3. `assets/fonts` inside this crate
//!
//! When none of these contain the bundled Roboto files, the Windows Arial family is tried from
//! `LCA_REPORT_WINDOWS_FONTS_DIR` (or `%WINDIR%\Fonts` on Windows).

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{FontData, FontFamily};
use log::{debug, warn};

/// Environment variable overriding the bundled font directory.
pub const FONTS_DIR_ENV: &str = "LCA_REPORT_FONTS_DIR";

/// Environment variable pointing at a directory with the Windows Arial files.
pub const WINDOWS_FONTS_DIR_ENV: &str = "LCA_REPORT_WINDOWS_FONTS_DIR";

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

/// File names of one font family, one per style.
#[derive(Clone, Copy, Debug)]
struct FamilyFiles {
    name: &'static str,
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

impl FamilyFiles {
    fn all(&self) -> [&'static str; 4] {
        [self.regular, self.bold, self.italic, self.bold_italic]
    }

    fn missing_in(&self, directory: &Path) -> Vec<&'static str> {
        self.all()
            .into_iter()
            .filter(|file| !directory.join(file).is_file())
            .collect()
    }
}

const BUNDLED: FamilyFiles = FamilyFiles {
    name: DEFAULT_FONT_FAMILY_NAME,
    regular: "Roboto-Regular.ttf",
    bold: "Roboto-Bold.ttf",
    italic: "Roboto-Italic.ttf",
    bold_italic: "Roboto-BoldItalic.ttf",
};

const WINDOWS_FALLBACK: FamilyFiles = FamilyFiles {
    name: "Arial",
    regular: "arial.ttf",
    bold: "arialbd.ttf",
    italic: "ariali.ttf",
    bold_italic: "arialbi.ttf",
};

/// A directory known to contain every style of a font family.
#[derive(Clone, Debug)]
pub struct FontSource {
    directory: PathBuf,
    files: FamilyFiles,
}

impl FontSource {
    /// Directory holding the font files.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Name of the resolved family.
    pub fn family_name(&self) -> &'static str {
        self.files.name
    }

    /// Path of the regular face.
    pub fn regular_path(&self) -> PathBuf {
        self.directory.join(self.files.regular)
    }

    /// Loads all four styles for use with `genpdf`.
    pub fn load_family(&self) -> Result<FontFamily<FontData>, Error> {
        Ok(FontFamily {
            regular: self.load_style(self.files.regular, "regular")?,
            bold: self.load_style(self.files.bold, "bold")?,
            italic: self.load_style(self.files.italic, "italic")?,
            bold_italic: self.load_style(self.files.bold_italic, "bold italic")?,
        })
    }

    /// Reads the raw bytes of the regular face.
    pub fn read_regular(&self) -> io::Result<Vec<u8>> {
        fs::read(self.regular_path())
    }

    fn load_style(&self, file: &str, style: &str) -> Result<FontData, Error> {
        let path = self.directory.join(file);
        FontData::load(&path, None).map_err(|err| {
            Error::new(
                format!(
                    "Failed to load {} {} font at {}: {}",
                    self.files.name,
                    style,
                    path.display(),
                    err
                ),
                io::Error::new(io::ErrorKind::Other, err.to_string()),
            )
        })
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
}

/// Returns the directory that ships with the crate sources.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn bundled_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    let mut push_unique = |candidate: PathBuf| {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    };

    if let Some(path) = env_path(FONTS_DIR_ENV) {
        push_unique(path);
    }

    if let Some(bin_dir) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        push_unique(bin_dir.join("assets/fonts"));
    }

    push_unique(bundled_fonts_source_dir());
    candidates
}

fn resolve_bundled() -> Result<FontSource, Error> {
    let mut attempts = Vec::new();

    for candidate in bundled_directory_candidates() {
        if !candidate.is_dir() {
            attempts.push(format!("{} (directory missing)", candidate.display()));
            continue;
        }

        let missing = BUNDLED.missing_in(&candidate);
        if missing.is_empty() {
            debug!("Using bundled fonts from {}", candidate.display());
            return Ok(FontSource {
                directory: candidate,
                files: BUNDLED,
            });
        }

        attempts.push(format!(
            "{} (missing files [{}])",
            candidate.display(),
            missing.join(", ")
        ));
    }

    Err(Error::new(
        format!(
            "Unable to locate bundled font directory. Checked: {}. See assets/fonts/README.md or set {}.",
            attempts.join(", "),
            FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "bundled fonts directory not found"),
    ))
}

fn windows_font_directory() -> Option<PathBuf> {
    if let Some(path) = env_path(WINDOWS_FONTS_DIR_ENV) {
        return Some(path);
    }

    #[cfg(windows)]
    {
        for var in ["WINDIR", "SystemRoot"] {
            if let Some(candidate) = env_path(var).map(|root| root.join("Fonts")) {
                if candidate.is_dir() {
                    return Some(candidate);
                }
            }
        }
    }

    None
}

fn resolve_windows_fallback() -> Result<FontSource, Error> {
    let directory = windows_font_directory().ok_or_else(|| {
        Error::new(
            "Windows font directory not found for fallback",
            io::Error::new(io::ErrorKind::NotFound, "windows fonts directory not found"),
        )
    })?;

    let missing = WINDOWS_FALLBACK.missing_in(&directory);
    if !missing.is_empty() {
        return Err(Error::new(
            format!(
                "Windows fallback fonts missing in {}: {}",
                directory.display(),
                missing.join(", ")
            ),
            io::Error::new(io::ErrorKind::NotFound, "windows fallback fonts missing"),
        ));
    }

    Ok(FontSource {
        directory,
        files: WINDOWS_FALLBACK,
    })
}

fn is_not_found(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Finds the font directory, preferring the bundled Roboto family over the Windows fallback.
pub fn resolve_font_source() -> Result<FontSource, Error> {
    match resolve_bundled() {
        Ok(source) => Ok(source),
        Err(err) if is_not_found(&err) => match resolve_windows_fallback() {
            Ok(fallback) => {
                warn!(
                    "Bundled fonts unavailable ({}); falling back to '{}' in {}.",
                    err,
                    fallback.family_name(),
                    fallback.directory().display()
                );
                Ok(fallback)
            }
            Err(fallback_err) => Err(Error::new(
                format!(
                    "Bundled fonts unavailable ({}) and Windows fallback failed: {}",
                    err, fallback_err
                ),
                io::Error::new(io::ErrorKind::NotFound, "default fonts are not available"),
            )),
        },
        Err(err) => Err(err),
    }
}

/// Returns the default font family for new documents.
pub fn default_font_family() -> Result<FontFamily<FontData>, Error> {
    resolve_font_source()?.load_family()
}

/// Indicates whether any usable font family can be found.
pub fn default_fonts_available() -> bool {
    resolve_font_source().is_ok()
}
