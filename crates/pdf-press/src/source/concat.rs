use super::PageSource;
use crate::types::*;
use image::DynamicImage;

/// Several sources read back to back as one document
pub struct ConcatSource {
    children: Vec<Box<dyn PageSource>>,
}

impl ConcatSource {
    pub fn new(children: Vec<Box<dyn PageSource>>) -> Self {
        Self { children }
    }

    /// Child holding page `index` and the page's index within that child
    fn locate(&self, index: usize) -> Result<(&dyn PageSource, usize)> {
        let mut local = index;
        for child in &self.children {
            let len = child.len();
            if local < len {
                return Ok((child.as_ref(), local));
            }
            local -= len;
        }
        Err(PressError::OutOfRange {
            index,
            len: self.len(),
        })
    }
}

impl PageSource for ConcatSource {
    fn len(&self) -> usize {
        self.children.iter().map(|child| child.len()).sum()
    }

    fn render(&self, index: usize, target: (u32, u32)) -> Result<DynamicImage> {
        let (child, local) = self.locate(index)?;
        child.render(local, target)
    }

    fn render_preview(&self, index: usize) -> Result<DynamicImage> {
        let (child, local) = self.locate(index)?;
        child.render_preview(local)
    }

    fn text(&self, index: usize) -> Result<String> {
        let (child, local) = self.locate(index)?;
        child.text(local)
    }
}
