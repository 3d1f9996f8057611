//! The document-mutation primitive used by the page composer

use pdf_core::{Align, PdfDocument, Rotation, StandardFont};

/// Where and how to draw a line of text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPlacement {
    /// Anchor point in points, origin at the bottom-left of the page
    pub x: f64,
    pub y: f64,
    pub font: StandardFont,
    pub size: f32,
    pub rotation: Rotation,
    /// Alignment along the baseline, relative to the anchor
    pub align: Align,
}

/// Rectangle in points, `(x, y)` is the lower-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A document that pages can be appended to
///
/// Pages are numbered from 1. Errors are the backend's own; the composer
/// decides which of them are fatal.
pub trait DocumentHandle {
    /// Append a page of the given size in points and return its number
    fn add_page(&mut self, width: f64, height: f64) -> pdf_core::Result<usize>;

    fn draw_text(&mut self, page: usize, text: &str, placement: TextPlacement) -> pdf_core::Result<()>;

    /// Draw encoded image bytes stretched to `rect`
    ///
    /// Bytes that cannot be embedded fail with [`pdf_core::PdfError::ImageError`].
    fn draw_image(&mut self, page: usize, data: &[u8], rect: Rect) -> pdf_core::Result<()>;

    fn page_count(&self) -> usize;

    fn serialize(&mut self) -> pdf_core::Result<Vec<u8>>;
}

impl DocumentHandle for PdfDocument {
    fn add_page(&mut self, width: f64, height: f64) -> pdf_core::Result<usize> {
        PdfDocument::add_page(self, width, height)
    }

    fn draw_text(&mut self, page: usize, text: &str, placement: TextPlacement) -> pdf_core::Result<()> {
        self.set_font(placement.font, placement.size);
        self.insert_text_rotated(
            text,
            page,
            placement.x,
            placement.y,
            placement.align,
            placement.rotation,
        )
    }

    fn draw_image(&mut self, page: usize, data: &[u8], rect: Rect) -> pdf_core::Result<()> {
        self.insert_image(data, page, rect.x, rect.y, rect.width, rect.height)
    }

    fn page_count(&self) -> usize {
        PdfDocument::page_count(self)
    }

    fn serialize(&mut self) -> pdf_core::Result<Vec<u8>> {
        self.to_bytes()
    }
}
