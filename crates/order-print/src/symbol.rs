//! QR code symbols for order lookup
//!
//! The order id is encoded as raw bytes at error correction level L and
//! rendered black on white, with a quiet zone, into a square PNG.

use crate::outcome::AssetOutcome;
use image::{DynamicImage, GrayImage, Luma};
use log::warn;
use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode};
use thiserror::Error;

/// Modules of quiet zone on each side of the symbol
const QUIET_ZONE_MODULES: usize = 4;

/// Errors that can occur while encoding a symbol
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Content of {len} bytes exceeds QR code capacity")]
    CapacityExceeded { len: usize },

    #[error("QR code needs {modules} modules but only {pixels} pixels are available")]
    TooSmall { modules: usize, pixels: u32 },

    #[error("QR raster error: {0}")]
    Raster(String),
}

/// Square raster image encoded as PNG
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Encode `content` into a `size_pixels` square QR code
///
/// The symbol is scaled by a whole number of pixels per module and centered
/// on a white canvas of exactly the requested size.
pub fn encode(content: &str, size_pixels: u32) -> Result<RasterImage, EncodingError> {
    let code = QrCode::with_error_correction_level(content.as_bytes(), EcLevel::L).map_err(
        |e| match e {
            QrError::DataTooLong => EncodingError::CapacityExceeded { len: content.len() },
            other => EncodingError::Raster(other.to_string()),
        },
    )?;

    let modules = code.width() + 2 * QUIET_ZONE_MODULES;
    if modules > size_pixels as usize {
        return Err(EncodingError::TooSmall {
            modules,
            pixels: size_pixels,
        });
    }

    let symbol = code
        .render::<Luma<u8>>()
        .quiet_zone(true)
        .max_dimensions(size_pixels, size_pixels)
        .build();

    let mut canvas = GrayImage::from_pixel(size_pixels, size_pixels, Luma([255]));
    let x = (size_pixels.saturating_sub(symbol.width())) / 2;
    let y = (size_pixels.saturating_sub(symbol.height())) / 2;
    image::imageops::overlay(&mut canvas, &symbol, x as i64, y as i64);

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(canvas)
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| EncodingError::Raster(e.to_string()))?;

    Ok(RasterImage {
        width: size_pixels,
        height: size_pixels,
        png,
    })
}

/// Render the order symbol as an asset outcome
///
/// Empty content yields `NotFound`; any encoding failure is a `DecodeError`.
pub fn render(content: &str, size_pixels: u32) -> AssetOutcome {
    if content.is_empty() {
        return AssetOutcome::NotFound;
    }

    match encode(content, size_pixels) {
        Ok(raster) => AssetOutcome::Ready(raster.png),
        Err(e) => {
            warn!("QR code for order id {content:?} could not be encoded: {e}");
            AssetOutcome::DecodeError(e.to_string())
        }
    }
}
