use super::{PageSelection, PageSource, check_index, parse_page_selection};
use crate::types::*;
use image::DynamicImage;
use std::sync::Arc;

/// A reordered or filtered view of another source
///
/// Page `i` of the view is page `indices()[i]` of the backing source.
pub struct PageRange {
    source: Arc<dyn PageSource>,
    indices: Vec<usize>,
}

impl PageRange {
    /// Build a view from single pages and half-open ranges, in the given order.
    ///
    /// Fails with `OutOfRange` if any selected page is past the end of `source`.
    pub fn new<I>(source: Arc<dyn PageSource>, selections: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<PageSelection>,
    {
        let mut indices = Vec::new();
        for selection in selections {
            match selection.into() {
                PageSelection::Single(index) => indices.push(index),
                PageSelection::Range(range) => indices.extend(range),
            }
        }

        let len = source.len();
        if let Some(&index) = indices.iter().find(|&&index| index >= len) {
            return Err(PressError::OutOfRange { index, len });
        }

        Ok(Self { source, indices })
    }

    /// Build a view from a 1-based page list such as `"1-4,7,10-"`
    pub fn parse(source: Arc<dyn PageSource>, selection: &str) -> Result<Self> {
        let selections = parse_page_selection(selection, source.len())?;
        Self::new(source, selections)
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    fn backing_index(&self, index: usize) -> Result<usize> {
        check_index(index, self.indices.len())?;
        Ok(self.indices[index])
    }
}

impl PageSource for PageRange {
    fn len(&self) -> usize {
        self.indices.len()
    }

    fn render(&self, index: usize, target: (u32, u32)) -> Result<DynamicImage> {
        self.source.render(self.backing_index(index)?, target)
    }

    fn render_preview(&self, index: usize) -> Result<DynamicImage> {
        self.source.render_preview(self.backing_index(index)?)
    }

    fn text(&self, index: usize) -> Result<String> {
        self.source.text(self.backing_index(index)?)
    }
}
