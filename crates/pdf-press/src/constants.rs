//! Shared constants for pressing
//!
//! This module centralizes magic numbers and constants used throughout
//! the imposition process.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per inch in PDF user space
pub const POINTS_PER_INCH: f32 = 72.0;

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = POINTS_PER_INCH / 25.4; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert a length in points to pixels at `ppi`
#[inline]
pub fn pt_to_px(pt: f32, ppi: f32) -> u32 {
    (pt * ppi / POINTS_PER_INCH).round().max(1.0) as u32
}

// =============================================================================
// Rendering
// =============================================================================

/// Bounding box used by `render_preview`
pub const PREVIEW_SIZE: (u32, u32) = (420, 420);

/// Default bounding resolution for merge and image export
pub const DEFAULT_RESOLUTION: (u32, u32) = (1600, 1600);

/// Default pixel density for midpage rendering
pub const DEFAULT_PPI: f32 = 300.0;

/// JPEG quality for embedded page images and exported JPEG files
pub const JPEG_QUALITY: u8 = 95;

// =============================================================================
// Stacks
// =============================================================================

/// Default pages per stack for multi-stack imposition
pub const DEFAULT_STACK_SIZE: usize = 40;

/// Default file name prefix for separately written stacks
pub const DEFAULT_STACK_PREFIX: &str = "stack_";
