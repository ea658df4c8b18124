use crate::constants::*;
use crate::geometry::{Margins, PaperSize};
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Single-stack midpage configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct MidpageOptions {
    // Geometry
    pub paper_size: PaperSize,
    pub margins: Margins,
    /// Pixel density pages are rendered at
    pub ppi: f32,

    // Orientation
    pub right_to_left: bool,
    /// Turn every second output page 180° for duplex printers that flip on the short edge
    pub flip_even: bool,

    // Output
    /// One face per output page instead of front/back pairs
    pub single_sided: bool,
    /// Write odd and even output pages to two files
    pub separate_even_odd: bool,
}

impl Default for MidpageOptions {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::Letter,
            margins: Margins::default(),
            ppi: DEFAULT_PPI,
            right_to_left: false,
            flip_even: false,
            single_sided: false,
            separate_even_odd: false,
        }
    }
}

impl MidpageOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        self.paper_size.validate()?;
        Margins::from_values(&[
            self.margins.top_mm,
            self.margins.outer_mm,
            self.margins.bottom_mm,
            self.margins.inner_mm,
        ])?;

        if !(self.ppi.is_finite() && self.ppi > 0.0) {
            return Err(PressError::InvalidArgument(format!(
                "Pixel density must be positive, got {}",
                self.ppi
            )));
        }

        if self.single_sided && self.separate_even_odd {
            return Err(PressError::InvalidArgument(
                "Separating even and odd pages needs double-sided output".to_string(),
            ));
        }

        Ok(())
    }
}

/// Multi-stack midpage configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct StackOptions {
    pub midpage: MidpageOptions,
    /// Pages per stack, a positive multiple of 4
    pub stack_size: usize,
    /// Write each stack to its own file inside the output directory
    pub separate_stacks: bool,
    /// File name prefix for separately written stacks
    pub stack_prefix: String,
}

impl Default for StackOptions {
    fn default() -> Self {
        Self {
            midpage: MidpageOptions::default(),
            stack_size: DEFAULT_STACK_SIZE,
            separate_stacks: false,
            stack_prefix: DEFAULT_STACK_PREFIX.to_string(),
        }
    }
}

impl StackOptions {
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.midpage.validate()?;

        if self.stack_size == 0 || self.stack_size % 4 != 0 {
            return Err(PressError::InvalidArgument(format!(
                "Stack size must be a positive multiple of 4, got {}",
                self.stack_size
            )));
        }

        if self.stack_prefix.contains(['/', '\\']) {
            return Err(PressError::InvalidArgument(format!(
                "Stack prefix '{}' must not contain path separators",
                self.stack_prefix
            )));
        }

        Ok(())
    }
}

/// Page-per-image export configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ImageExportOptions {
    /// Prepended to the 1-based page number in each file name
    pub prefix: String,
    /// Bounding box each page is rendered into
    pub resolution: (u32, u32),
    /// File extension selecting the encoder, e.g. `png` or `jpg`
    pub format: String,
    /// Encoder quality for JPEG output, 1 to 100
    pub jpeg_quality: u8,
}

impl Default for ImageExportOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            resolution: DEFAULT_RESOLUTION,
            format: "png".to_string(),
            jpeg_quality: JPEG_QUALITY,
        }
    }
}

impl ImageExportOptions {
    pub fn validate(&self) -> Result<()> {
        if self.resolution.0 == 0 || self.resolution.1 == 0 {
            return Err(PressError::InvalidArgument(format!(
                "Resolution must be non-zero, got {}x{}",
                self.resolution.0, self.resolution.1
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(PressError::InvalidArgument(format!(
                "JPEG quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }
        self.image_format()?;
        Ok(())
    }

    pub(crate) fn image_format(&self) -> Result<image::ImageFormat> {
        image::ImageFormat::from_extension(&self.format)
            .filter(|format| format.writing_enabled())
            .ok_or_else(|| {
                PressError::Unsupported(format!("Cannot write '{}' images", self.format))
            })
    }
}
