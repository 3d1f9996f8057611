//! Artwork loading with placeholder fallback

use crate::model::LineItem;
use crate::outcome::AssetOutcome;
use crate::store::ImageStore;
use image::{DynamicImage, Rgb, RgbImage};
use log::{debug, info, warn};
use spleen_font::{PSF2Font, FONT_12X24};
use std::borrow::Cow;
use std::sync::OnceLock;

/// Placeholder raster size in pixels
pub const PLACEHOLDER_WIDTH: u32 = 400;
pub const PLACEHOLDER_HEIGHT: u32 = 300;

const PLACEHOLDER_TEXT: &str = "No Image Available";
const PLACEHOLDER_FILL: Rgb<u8> = Rgb([192, 192, 192]);
const PLACEHOLDER_BORDER: Rgb<u8> = Rgb([64, 64, 64]);
const PLACEHOLDER_INK: Rgb<u8> = Rgb([0, 0, 0]);

/// Spleen 12x24 cell size
const GLYPH_WIDTH: u32 = 12;
const GLYPH_HEIGHT: u32 = 24;

static PLACEHOLDER: OnceLock<Vec<u8>> = OnceLock::new();

/// Loads line item artwork from an [`ImageStore`]
pub struct ImageLoader<'a, S: ImageStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: ImageStore + ?Sized> ImageLoader<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Fetch and check an image without substituting the placeholder
    ///
    /// Store failures of any kind are `NotFound`; bytes that are not a
    /// readable JPEG or PNG are `DecodeError`.
    pub fn fetch(&self, image_ref: Option<&str>, owner_id: i64) -> AssetOutcome {
        let Some(image_ref) = image_ref else {
            return AssetOutcome::NotFound;
        };

        match self.store.get(image_ref, owner_id) {
            Ok(bytes) => probe(bytes),
            Err(e) => {
                warn!("Could not load image {image_ref} for owner {owner_id}: {e}");
                AssetOutcome::NotFound
            }
        }
    }

    /// Fetch the artwork of a line item; inline bytes win over the reference
    pub fn fetch_item(&self, item: &LineItem, owner_id: i64) -> AssetOutcome {
        match &item.image_bytes {
            Some(bytes) => probe(bytes.clone()),
            None => self.fetch(item.image_ref.as_deref(), owner_id),
        }
    }

    /// Image bytes for `image_ref`, or the placeholder if unavailable
    pub fn load(&self, image_ref: Option<&str>, owner_id: i64) -> Cow<'static, [u8]> {
        or_placeholder(self.fetch(image_ref, owner_id), image_ref.unwrap_or("<none>"))
    }

    /// Artwork bytes of a line item, or the placeholder if unavailable
    pub fn load_item(&self, item: &LineItem, owner_id: i64) -> Cow<'static, [u8]> {
        let label = if item.image_bytes.is_some() {
            "<inline>"
        } else {
            item.image_ref.as_deref().unwrap_or("<none>")
        };
        or_placeholder(self.fetch_item(item, owner_id), label)
    }
}

fn or_placeholder(outcome: AssetOutcome, label: &str) -> Cow<'static, [u8]> {
    match outcome {
        AssetOutcome::Ready(bytes) => Cow::Owned(bytes),
        AssetOutcome::NotFound => {
            info!("No image for {label}, using placeholder");
            Cow::Borrowed(placeholder_png())
        }
        AssetOutcome::DecodeError(reason) => {
            warn!("Unreadable image {label} ({reason}), using placeholder");
            Cow::Borrowed(placeholder_png())
        }
    }
}

/// Check magic bytes and header dimensions
fn probe(bytes: Vec<u8>) -> AssetOutcome {
    if bytes.is_empty() {
        return AssetOutcome::NotFound;
    }

    match pdf_core::image_dimensions(&bytes) {
        Ok(dims) if dims.width > 0 && dims.height > 0 => {
            debug!("Loaded image {}x{} px", dims.width, dims.height);
            AssetOutcome::Ready(bytes)
        }
        Ok(_) => AssetOutcome::DecodeError("image has zero dimensions".to_string()),
        Err(e) => AssetOutcome::DecodeError(e.to_string()),
    }
}

/// The shared "No Image Available" PNG
///
/// Rendered on first use and reused for the life of the process. Empty if
/// rendering failed, which embedding then reports as an image error.
pub fn placeholder_png() -> &'static [u8] {
    PLACEHOLDER.get_or_init(|| match render_placeholder() {
        Ok(png) => png,
        Err(e) => {
            warn!("Failed to render placeholder image: {e}");
            Vec::new()
        }
    })
}

fn render_placeholder() -> Result<Vec<u8>, String> {
    let mut canvas = RgbImage::from_pixel(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT, PLACEHOLDER_FILL);

    for x in 0..PLACEHOLDER_WIDTH {
        canvas.put_pixel(x, 0, PLACEHOLDER_BORDER);
        canvas.put_pixel(x, PLACEHOLDER_HEIGHT - 1, PLACEHOLDER_BORDER);
    }
    for y in 0..PLACEHOLDER_HEIGHT {
        canvas.put_pixel(0, y, PLACEHOLDER_BORDER);
        canvas.put_pixel(PLACEHOLDER_WIDTH - 1, y, PLACEHOLDER_BORDER);
    }

    let mut font = PSF2Font::new(FONT_12X24).map_err(|e| format!("{e:?}"))?;
    let text_width = PLACEHOLDER_TEXT.chars().count() as u32 * GLYPH_WIDTH;
    let origin_x = (PLACEHOLDER_WIDTH - text_width) / 2;
    let origin_y = (PLACEHOLDER_HEIGHT - GLYPH_HEIGHT) / 2;

    for (index, ch) in PLACEHOLDER_TEXT.chars().enumerate() {
        let cell_x = origin_x + index as u32 * GLYPH_WIDTH;
        let utf8 = ch.to_string();
        let Some(glyph) = font.glyph_for_utf8(utf8.as_bytes()) else {
            continue;
        };

        for (row_y, row) in glyph.enumerate() {
            for (col_x, on) in row.enumerate() {
                let x = cell_x + col_x as u32;
                let y = origin_y + row_y as u32;
                if on && x < PLACEHOLDER_WIDTH && y < PLACEHOLDER_HEIGHT {
                    canvas.put_pixel(x, y, PLACEHOLDER_INK);
                }
            }
        }
    }

    let mut png = Vec::new();
    DynamicImage::ImageRgb8(canvas)
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| e.to_string())?;
    Ok(png)
}
