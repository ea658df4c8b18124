//! Sheet geometry for midpage imposition
//!
//! All lengths are PDF points unless a name says otherwise. Output sheets are
//! portrait; the fold runs horizontally across the middle, so each half is a
//! landscape slot holding one book page turned a quarter.

use crate::constants::{POINTS_PER_INCH, mm_to_pt, pt_to_px};
use crate::types::*;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Output sheet sizes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PaperSize {
    A4,
    #[default]
    Letter,
    Legal,
    Ledger,
    /// `ratio` is width / height, `width_in` the sheet width in inches
    Custom { ratio: f32, width_in: f32 },
}

impl PaperSize {
    /// (width / height, width in inches)
    pub fn ratio_width(self) -> (f32, f32) {
        match self {
            PaperSize::A4 => (1.0 / std::f32::consts::SQRT_2, 8.3),
            PaperSize::Letter => (8.5 / 11.0, 8.5),
            PaperSize::Legal => (8.5 / 14.0, 8.5),
            PaperSize::Ledger => (11.0 / 17.0, 11.0),
            PaperSize::Custom { ratio, width_in } => (ratio, width_in),
        }
    }

    /// Sheet dimensions in points, portrait
    pub fn dimensions_pt(self) -> (f32, f32) {
        let (ratio, width_in) = self.ratio_width();
        pixels_from_ppi(ratio, width_in, POINTS_PER_INCH)
    }

    pub fn validate(self) -> Result<()> {
        let (ratio, width_in) = self.ratio_width();
        if !(ratio.is_finite() && ratio > 0.0 && width_in.is_finite() && width_in > 0.0) {
            return Err(PressError::InvalidArgument(format!(
                "Paper ratio and width must be positive, got {ratio} and {width_in}"
            )));
        }
        Ok(())
    }
}

impl FromStr for PaperSize {
    type Err = PressError;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(PaperSize::A4),
            "letter" => Ok(PaperSize::Letter),
            "legal" => Ok(PaperSize::Legal),
            "ledger" => Ok(PaperSize::Ledger),
            other => Err(PressError::InvalidArgument(format!(
                "Unknown paper size '{other}' (expected A4, Letter, Legal or Ledger)"
            ))),
        }
    }
}

/// Size of a sheet `width_in` inches wide at `ppi`: `(width * ppi, width / ratio * ppi)`
pub fn pixels_from_ppi(ratio: f32, width_in: f32, ppi: f32) -> (f32, f32) {
    (width_in * ppi, width_in / ratio * ppi)
}

/// Largest size with the page's aspect ratio that fits inside `bounds`
pub fn fit_within(page: (f32, f32), bounds: (f32, f32)) -> (f32, f32) {
    let (pw, ph) = page;
    let (bw, bh) = bounds;
    if ph / pw >= bh / bw {
        (pw / ph * bh, bh)
    } else {
        (bw, ph / pw * bw)
    }
}

/// Page margins in millimetres, relative to the bound book page
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Margins {
    pub top_mm: f32,
    /// Fore edge, away from the fold
    pub outer_mm: f32,
    pub bottom_mm: f32,
    /// Gutter, at the fold
    pub inner_mm: f32,
}

impl Margins {
    pub fn uniform(margin_mm: f32) -> Self {
        Self {
            top_mm: margin_mm,
            outer_mm: margin_mm,
            bottom_mm: margin_mm,
            inner_mm: margin_mm,
        }
    }

    /// Expand 1–4 values the way CSS margin shorthand does, in the order
    /// (top, outer, bottom, inner)
    pub fn from_values(values: &[f32]) -> Result<Self> {
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(PressError::InvalidArgument(format!(
                "Margins must be non-negative, got {values:?}"
            )));
        }
        let (top, outer, bottom, inner) = match *values {
            [all] => (all, all, all, all),
            [vertical, horizontal] => (vertical, horizontal, vertical, horizontal),
            [top, horizontal, bottom] => (top, horizontal, bottom, horizontal),
            [top, outer, bottom, inner] => (top, outer, bottom, inner),
            _ => {
                return Err(PressError::InvalidArgument(format!(
                    "Expected 1 to 4 margin values, got {}",
                    values.len()
                )));
            }
        };
        Ok(Self {
            top_mm: top,
            outer_mm: outer,
            bottom_mm: bottom,
            inner_mm: inner,
        })
    }
}

impl FromStr for Margins {
    type Err = PressError;

    /// Parse comma separated millimetre values, e.g. `"5"` or `"10,5,10,15"`
    fn from_str(text: &str) -> Result<Self> {
        let values = text
            .split(',')
            .map(|part| {
                part.trim().parse::<f32>().map_err(|_| {
                    PressError::InvalidArgument(format!("Invalid margin value '{}'", part.trim()))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_values(&values)
    }
}

/// A rectangular area in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (bottom edge)
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge y coordinate
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// This rect after turning a `sheet_width` × `sheet_height` page 180° about its centre
    pub fn half_turn(&self, sheet_width: f32, sheet_height: f32) -> Rect {
        Rect::new(
            sheet_width - self.right(),
            sheet_height - self.top(),
            self.width,
            self.height,
        )
    }

    /// Largest rect with the aspect of `content` that fits in this one, centred
    pub fn fit_centered(&self, content: (f32, f32)) -> Rect {
        let (width, height) = fit_within(content, (self.width, self.height));
        Rect::new(
            self.center_x() - width / 2.0,
            self.center_y() - height / 2.0,
            width,
            height,
        )
    }
}

/// Where the two halves of a midpage face go on the output sheet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceLayout {
    pub sheet_width: f32,
    pub sheet_height: f32,
    /// Working box of the upper half, after margins
    pub top: Rect,
    /// Working box of the lower half, after margins
    pub bottom: Rect,
    /// Quarter turn applied to both halves
    pub rotation: Rotation,
    /// Pixel size to render a source page at, in page orientation
    pub render_target: (u32, u32),
}

impl FaceLayout {
    /// Lay out a portrait sheet folded across the middle.
    ///
    /// Book pages are turned clockwise so their inner edge meets the fold,
    /// or counter-clockwise for right-to-left books. The inner margin sits at
    /// the fold and the outer margin at the sheet edge; the page's own top
    /// margin follows the page top to whichever side it is turned towards.
    pub fn midpage(paper: PaperSize, margins: &Margins, right_to_left: bool, ppi: f32) -> Result<Self> {
        paper.validate()?;
        if !(ppi.is_finite() && ppi > 0.0) {
            return Err(PressError::InvalidArgument(format!(
                "Pixel density must be positive, got {ppi}"
            )));
        }

        let (sheet_width, sheet_height) = paper.dimensions_pt();
        let half = sheet_height / 2.0;

        let top_pt = mm_to_pt(margins.top_mm);
        let bottom_pt = mm_to_pt(margins.bottom_mm);
        let outer_pt = mm_to_pt(margins.outer_mm);
        let inner_pt = mm_to_pt(margins.inner_mm);

        // Clockwise: page top faces the sheet's right edge
        let (rotation, left_pt, right_pt) = if right_to_left {
            (Rotation::Clockwise270, top_pt, bottom_pt)
        } else {
            (Rotation::Clockwise90, bottom_pt, top_pt)
        };

        let width = sheet_width - left_pt - right_pt;
        let height = half - inner_pt - outer_pt;
        if width <= 0.0 || height <= 0.0 {
            return Err(PressError::InvalidArgument(
                "Margins leave no room for the page".to_string(),
            ));
        }

        let bottom = Rect::new(left_pt, outer_pt, width, height);
        let top = Rect::new(left_pt, half + inner_pt, width, height);

        Ok(Self {
            sheet_width,
            sheet_height,
            top,
            bottom,
            rotation,
            render_target: (pt_to_px(height, ppi), pt_to_px(width, ppi)),
        })
    }

    /// Occupied box for an image of `image_size` pixels placed in `slot`
    pub fn place(&self, slot: &Rect, image_size: (u32, u32)) -> Rect {
        let (w, h) = (image_size.0 as f32, image_size.1 as f32);
        let visual = if self.rotation.is_quarter_turn() { (h, w) } else { (w, h) };
        slot.fit_centered(visual)
    }
}
