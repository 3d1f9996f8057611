//! PDF Core - Low-level PDF page building
//!
//! Covers:
//! - Building a PDF document from scratch, one page at a time
//! - Pages of individual sizes within one document
//! - Inserting text (upright or rotated) with the standard Helvetica faces
//! - Inserting images (JPEG, PNG) at exact point dimensions
//!
//! All coordinates are PDF user space: points, origin at the bottom-left
//! corner of the page.
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Align, PdfDocument, Rotation, StandardFont};
//!
//! let mut doc = PdfDocument::new();
//! let page = doc.add_page(677.48, 280.63)?;
//! doc.set_font(StandardFont::HelveticaBold, 14.0);
//! doc.insert_text_rotated("A-1 (1/1)", page, 17.8, 140.3, Align::Center, Rotation::Ccw90)?;
//! let bytes = doc.to_bytes()?;
//! ```

mod document;
mod font;
mod image;
mod text;

pub use document::{Color, PdfDocument};
pub use font::StandardFont;
pub use image::{detect_format, image_dimensions, ImageDimensions, ImageFormat};
pub use text::{encode_hex, generate_text_operators, Rotation, TextRenderContext};

use thiserror::Error;

/// Failures while building or serializing a document
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to write PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Invalid page size: {0} x {1} points")]
    InvalidPageSize(f64, f64),

    #[error("Cannot embed image: {0}")]
    ImageError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment along the text baseline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}
