//! Engine configuration
//!
//! One value object carries every geometry default and font size. It is
//! handed to the assembler at construction and never read from ambient state.

use crate::layout::GlobalDefaults;
use crate::units::{mm_to_points, points_to_mm};
use crate::{GenerateError, Result};
use serde::{Deserialize, Serialize};

/// Print document configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintConfig {
    /// Default page width in mm
    pub page_width_mm: f64,
    /// Default page height in mm
    pub page_height_mm: f64,
    /// Default page margin in mm
    pub margin_mm: f64,
    /// QR code raster size in pixels
    pub code_size_pixels: u32,
    /// Printed QR code edge length in mm
    pub code_size_mm: f64,
    /// Header font size in points
    pub header_font_size: f32,
    /// Product info font size in points
    pub info_font_size: f32,
    /// "Image not available" font size in points
    pub placeholder_font_size: f32,
    /// Order id fallback font size in points
    pub fallback_font_size: f32,
    /// Distance of the header and product info lines from the margin, in points
    pub header_inset_pt: f64,
    /// Vertical offset of the order id fallback above the margin, in points
    pub fallback_text_offset_pt: f64,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            page_width_mm: 239.0,
            page_height_mm: 99.0,
            margin_mm: 1.0,
            code_size_pixels: 100,
            code_size_mm: points_to_mm(40.0),
            header_font_size: 14.0,
            info_font_size: 14.0,
            placeholder_font_size: 12.0,
            fallback_font_size: 8.0,
            header_inset_pt: 15.0,
            fallback_text_offset_pt: 10.0,
        }
    }
}

impl PrintConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PrintConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every dimension can produce a drawable page
    pub fn validate(&self) -> Result<()> {
        positive("pageWidthMm", self.page_width_mm)?;
        positive("pageHeightMm", self.page_height_mm)?;
        positive("codeSizeMm", self.code_size_mm)?;
        positive("headerFontSize", self.header_font_size as f64)?;
        positive("infoFontSize", self.info_font_size as f64)?;
        positive("placeholderFontSize", self.placeholder_font_size as f64)?;
        positive("fallbackFontSize", self.fallback_font_size as f64)?;

        if !self.margin_mm.is_finite() || self.margin_mm < 0.0 {
            return Err(GenerateError::Config(format!(
                "marginMm must be zero or positive, got {}",
                self.margin_mm
            )));
        }
        if self.code_size_pixels == 0 {
            return Err(GenerateError::Config(
                "codeSizePixels must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Global page defaults in points
    pub fn defaults(&self) -> GlobalDefaults {
        GlobalDefaults {
            width_pt: mm_to_points(self.page_width_mm),
            height_pt: mm_to_points(self.page_height_mm),
            margin_pt: mm_to_points(self.margin_mm),
        }
    }

    /// Printed QR code edge length in points
    pub fn code_size_pt(&self) -> f64 {
        mm_to_points(self.code_size_mm)
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GenerateError::Config(format!(
            "{name} must be positive, got {value}"
        )))
    }
}
