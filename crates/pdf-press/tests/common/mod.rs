#![allow(dead_code)]

use image::{DynamicImage, Rgb, RgbImage};
use pdf_press::*;
use std::sync::Mutex;

/// In-memory document whose pages are solid colour rasters.
///
/// `text(i)` returns `"<tag>:<i>"` so tests can see which child served a page.
pub struct SolidSource {
    tag: String,
    pages: Vec<(f32, f32)>,
}

impl SolidSource {
    pub fn new(tag: &str, count: usize) -> Self {
        Self::with_page_size(tag, count, (612.0, 792.0))
    }

    pub fn with_page_size(tag: &str, count: usize, size: (f32, f32)) -> Self {
        Self {
            tag: tag.to_string(),
            pages: vec![size; count],
        }
    }
}

impl PageSource for SolidSource {
    fn len(&self) -> usize {
        self.pages.len()
    }

    fn render(&self, index: usize, target: (u32, u32)) -> Result<DynamicImage> {
        let (pw, ph) = *self.pages.get(index).ok_or(PressError::OutOfRange {
            index,
            len: self.pages.len(),
        })?;
        if target.0 == 0 || target.1 == 0 {
            return Err(PressError::InvalidArgument("zero target".to_string()));
        }

        let scale = (target.0 as f32 / pw).min(target.1 as f32 / ph);
        let width = ((pw * scale).round() as u32).max(1);
        let height = ((ph * scale).round() as u32).max(1);
        let shade = (index * 37 % 256) as u8;
        Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Rgb([shade, 255 - shade, 128]),
        )))
    }

    fn text(&self, index: usize) -> Result<String> {
        if index >= self.pages.len() {
            return Err(PressError::OutOfRange {
                index,
                len: self.pages.len(),
            });
        }
        Ok(format!("{}:{}", self.tag, index))
    }
}

/// Source whose page `broken` fails to render and has no text
pub struct BrokenPageSource {
    inner: SolidSource,
    broken: usize,
}

impl BrokenPageSource {
    pub fn new(count: usize, broken: usize) -> Self {
        Self {
            inner: SolidSource::new("broken", count),
            broken,
        }
    }
}

impl PageSource for BrokenPageSource {
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn render(&self, index: usize, target: (u32, u32)) -> Result<DynamicImage> {
        if index == self.broken {
            return Err(PressError::InvalidArgument("broken page".to_string()));
        }
        self.inner.render(index, target)
    }

    fn text(&self, index: usize) -> Result<String> {
        if index == self.broken {
            return Err(PressError::InvalidArgument("broken page".to_string()));
        }
        self.inner.text(index)
    }
}

/// Solid source that remembers which pages were rendered, in call order
pub struct RecordingSource {
    inner: SolidSource,
    rendered: Mutex<Vec<usize>>,
}

impl RecordingSource {
    pub fn new(count: usize) -> Self {
        Self {
            inner: SolidSource::new("rec", count),
            rendered: Mutex::new(Vec::new()),
        }
    }

    pub fn rendered(&self) -> Vec<usize> {
        self.rendered.lock().unwrap().clone()
    }
}

impl PageSource for RecordingSource {
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn render(&self, index: usize, target: (u32, u32)) -> Result<DynamicImage> {
        let image = self.inner.render(index, target)?;
        self.rendered.lock().unwrap().push(index);
        Ok(image)
    }

    fn text(&self, index: usize) -> Result<String> {
        self.inner.text(index)
    }
}
