use super::{PageSource, check_index, check_target, fit_scale};
use crate::types::*;
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// A single raster image read as a one-page document
pub struct ImageSource {
    path: PathBuf,
    dimensions: (u32, u32),
}

impl ImageSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_owned();
        if !path.is_file() {
            return Err(PressError::SourceUnavailable(format!(
                "{} does not exist",
                path.display()
            )));
        }
        let dimensions = image::image_dimensions(&path)?;
        Ok(Self { path, dimensions })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pixel size of the stored image
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }
}

impl PageSource for ImageSource {
    fn len(&self) -> usize {
        1
    }

    /// Images are shrunk to fit `target` but never enlarged
    fn render(&self, index: usize, target: (u32, u32)) -> Result<DynamicImage> {
        check_index(index, 1)?;
        check_target(target)?;

        let image = flatten_onto_white(image::open(&self.path)?);
        let (width, height) = (image.width(), image.height());
        let scale = fit_scale((width as f32, height as f32), target);
        if scale >= 1.0 {
            return Ok(image);
        }

        let new_width = ((width as f32 * scale).round() as u32).max(1);
        let new_height = ((height as f32 * scale).round() as u32).max(1);
        Ok(image.resize_exact(new_width, new_height, FilterType::Triangle))
    }

    fn text(&self, index: usize) -> Result<String> {
        check_index(index, 1)?;
        Err(PressError::Unsupported(format!(
            "{} has no text layer",
            self.path.display()
        )))
    }
}

/// Composite any transparency over a white background
fn flatten_onto_white(image: DynamicImage) -> DynamicImage {
    if !image.color().has_alpha() {
        return image;
    }

    let rgba = image.to_rgba8();
    let flattened = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| ((c as u16 * a as u16 + 255 * (255 - a as u16)) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    });
    DynamicImage::ImageRgb8(flattened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_flatten_transparent_pixel_is_white() {
        let mut rgba = RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        rgba.put_pixel(1, 0, Rgba([10, 20, 30, 255]));

        let flat = flatten_onto_white(DynamicImage::ImageRgba8(rgba)).to_rgb8();
        assert_eq!(flat.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(flat.get_pixel(1, 0).0, [10, 20, 30]);
    }
}
