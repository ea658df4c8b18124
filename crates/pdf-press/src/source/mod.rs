//! Paginated, renderable documents
//!
//! A [`PageSource`] is anything with numbered pages that can be rasterized.
//! Leaf adapters wrap one file each; [`ConcatSource`] and [`PageRange`]
//! compose other sources so many files read as one document.

mod concat;
mod image;
#[cfg(feature = "pdfium")]
mod pdfium;
mod range;
mod selection;

pub use self::image::ImageSource;
pub use concat::ConcatSource;
#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumSource;
pub use range::PageRange;
pub use selection::{PageSelection, parse_page_selection};

use crate::constants::PREVIEW_SIZE;
use crate::types::*;
use ::image::DynamicImage;
use std::sync::Arc;

/// Read-only paginated document
pub trait PageSource: Send + Sync {
    /// Number of pages
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rasterize page `index` to fit inside `target` (width, height) pixels,
    /// keeping the page's aspect ratio.
    ///
    /// Fails with `OutOfRange` past the last page and `InvalidArgument` when
    /// either target dimension is 0.
    fn render(&self, index: usize, target: (u32, u32)) -> Result<DynamicImage>;

    /// Small rendering for thumbnails
    fn render_preview(&self, index: usize) -> Result<DynamicImage> {
        self.render(index, PREVIEW_SIZE)
    }

    /// Text layer of page `index`. Formats without one fail with `Unsupported`.
    fn text(&self, index: usize) -> Result<String>;
}

impl<S: PageSource + ?Sized> PageSource for Arc<S> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn render(&self, index: usize, target: (u32, u32)) -> Result<DynamicImage> {
        (**self).render(index, target)
    }

    fn render_preview(&self, index: usize) -> Result<DynamicImage> {
        (**self).render_preview(index)
    }

    fn text(&self, index: usize) -> Result<String> {
        (**self).text(index)
    }
}

impl<S: PageSource + ?Sized> PageSource for Box<S> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn render(&self, index: usize, target: (u32, u32)) -> Result<DynamicImage> {
        (**self).render(index, target)
    }

    fn render_preview(&self, index: usize) -> Result<DynamicImage> {
        (**self).render_preview(index)
    }

    fn text(&self, index: usize) -> Result<String> {
        (**self).text(index)
    }
}

pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(PressError::OutOfRange { index, len });
    }
    Ok(())
}

pub(crate) fn check_target(target: (u32, u32)) -> Result<()> {
    if target.0 == 0 || target.1 == 0 {
        return Err(PressError::InvalidArgument(format!(
            "Render target must be non-zero, got {}x{}",
            target.0, target.1
        )));
    }
    Ok(())
}

/// Uniform scale fitting a `page` (width, height) inside `target`
pub fn fit_scale(page: (f32, f32), target: (u32, u32)) -> f32 {
    let sx = target.0 as f32 / page.0;
    let sy = target.1 as f32 / page.1;
    sx.min(sy)
}
