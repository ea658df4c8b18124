//! Format registry
//!
//! Input files are matched to a leaf adapter by extension through a fixed
//! table built at compile time.

use crate::source::{ConcatSource, ImageSource, PageSource};
use crate::types::*;
use std::path::{Path, PathBuf};

#[cfg(feature = "pdfium")]
use crate::source::PdfiumSource;

type Opener = fn(&Path) -> Result<Box<dyn PageSource>>;

/// One supported input format
pub struct Format {
    pub name: &'static str,
    /// Lower-case extensions without the dot
    pub extensions: &'static [&'static str],
    open: Opener,
}

impl Format {
    pub fn open(&self, path: &Path) -> Result<Box<dyn PageSource>> {
        (self.open)(path)
    }
}

#[cfg(feature = "pdfium")]
fn open_pdf(path: &Path) -> Result<Box<dyn PageSource>> {
    Ok(Box::new(PdfiumSource::open(path)?))
}

fn open_image(path: &Path) -> Result<Box<dyn PageSource>> {
    Ok(Box::new(ImageSource::open(path)?))
}

static FORMATS: &[Format] = &[
    #[cfg(feature = "pdfium")]
    Format {
        name: "PDF",
        extensions: &["pdf"],
        open: open_pdf,
    },
    Format {
        name: "Image",
        extensions: &[
            "png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp", "tga", "pnm", "ico",
        ],
        open: open_image,
    },
];

/// Format registered for `path`'s extension
pub fn format_for(path: &Path) -> Option<&'static Format> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    FORMATS
        .iter()
        .find(|format| format.extensions.contains(&extension.as_str()))
}

/// Open one file with the adapter registered for its extension
pub fn open_source(path: &Path) -> Result<Box<dyn PageSource>> {
    if !path.exists() {
        return Err(PressError::SourceUnavailable(format!(
            "{} does not exist",
            path.display()
        )));
    }
    let format = format_for(path).ok_or_else(|| {
        PressError::Unsupported(format!("{} is not a supported format", path.display()))
    })?;
    format.open(path)
}

/// Open inputs as one logical document.
///
/// A single directory reads its entries sorted by file name. A single file is
/// opened directly. Several paths are concatenated in order; with
/// `ignore_errors`, inputs that fail to open are skipped with a warning.
pub fn open_sources(paths: &[PathBuf], ignore_errors: bool) -> Result<Box<dyn PageSource>> {
    match paths {
        [] => Err(PressError::InvalidArgument("No input files given".to_string())),
        [path] if path.is_dir() => {
            let mut entries = std::fs::read_dir(path)?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<std::io::Result<Vec<_>>>()?;
            entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
            log::debug!("{} holds {} entries", path.display(), entries.len());
            open_many(&entries, ignore_errors)
        }
        [path] => open_source(path),
        _ => open_many(paths, ignore_errors),
    }
}

fn open_many(paths: &[PathBuf], ignore_errors: bool) -> Result<Box<dyn PageSource>> {
    let mut children = Vec::with_capacity(paths.len());
    for path in paths {
        match open_sources(std::slice::from_ref(path), ignore_errors) {
            Ok(source) => children.push(source),
            Err(e) if ignore_errors => log::warn!("Ignored {}: {}", path.display(), e),
            Err(e) => return Err(e),
        }
    }
    Ok(Box::new(ConcatSource::new(children)))
}
