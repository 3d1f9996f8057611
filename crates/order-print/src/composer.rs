//! Page composition
//!
//! One page per product unit:
//! - header `"{order number} ({page}/{total})"` rotated along the left edge
//! - product info rotated along the right edge
//! - artwork centered at its resolved size
//! - QR code with the order id in the bottom-left corner
//!
//! Image and QR failures degrade to visible text. Only page allocation and
//! other backend failures abort the page.

use crate::config::PrintConfig;
use crate::handle::{DocumentHandle, Rect, TextPlacement};
use crate::layout::ResolvedPageLayout;
use crate::loader::ImageLoader;
use crate::model::LineItem;
use crate::outcome::AssetOutcome;
use crate::store::ImageStore;
use crate::symbol;
use crate::{GenerateError, Result};
use log::{debug, warn};
use pdf_core::{Align, PdfError, Rotation, StandardFont};

/// Header order number used when the order has none
pub const UNKNOWN_ORDER_NUMBER: &str = "UNKNOWN";

/// Centered text drawn when the artwork cannot be embedded
pub const IMAGE_UNAVAILABLE_TEXT: &str = "Image not available";

const INFO_SEPARATOR: &str = " | ";

/// Order-level facts a page needs
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub order_number: &'a str,
    pub order_id: &'a str,
    pub owner_id: i64,
    pub page_number: usize,
    pub total_pages: usize,
}

/// Header line, e.g. `"ABC-123 (1/3)"`
pub fn header_text(order_number: &str, page_number: usize, total_pages: usize) -> String {
    let order_number = if order_number.is_empty() {
        UNKNOWN_ORDER_NUMBER
    } else {
        order_number
    };
    format!("{order_number} ({page_number}/{total_pages})")
}

/// Product name, number and variant joined by `" | "`; `None` if all are absent
pub fn product_info_line(item: &LineItem) -> Option<String> {
    let parts: Vec<&str> = [
        item.product_name.as_deref(),
        item.product_number.as_deref(),
        item.variant_label.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.trim().is_empty())
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(INFO_SEPARATOR))
    }
}

/// Append one composed page to `doc`
///
/// Returns the new page number.
pub fn compose_page<H, S>(
    doc: &mut H,
    layout: &ResolvedPageLayout,
    item: &LineItem,
    ctx: &PageContext<'_>,
    loader: &ImageLoader<'_, S>,
    config: &PrintConfig,
) -> Result<usize>
where
    H: DocumentHandle + ?Sized,
    S: ImageStore + ?Sized,
{
    let fatal = |source: PdfError| GenerateError::PageComposition {
        page: ctx.page_number,
        source,
    };

    let page = doc
        .add_page(layout.page_width_pt, layout.page_height_pt)
        .map_err(fatal)?;
    debug!(
        "Page {}/{}: {:.2} x {:.2} pt, margin {:.2} pt",
        ctx.page_number, ctx.total_pages, layout.page_width_pt, layout.page_height_pt, layout.margin_pt
    );

    let middle_y = layout.page_height_pt / 2.0;

    let header = header_text(ctx.order_number, ctx.page_number, ctx.total_pages);
    doc.draw_text(
        page,
        &header,
        TextPlacement {
            x: layout.margin_pt + config.header_inset_pt,
            y: middle_y,
            font: StandardFont::HelveticaBold,
            size: config.header_font_size,
            rotation: Rotation::Ccw90,
            align: Align::Center,
        },
    )
    .map_err(fatal)?;

    if let Some(info) = product_info_line(item) {
        doc.draw_text(
            page,
            &info,
            TextPlacement {
                x: layout.page_width_pt - layout.margin_pt - config.header_inset_pt,
                y: middle_y,
                font: StandardFont::Helvetica,
                size: config.info_font_size,
                rotation: Rotation::Ccw90,
                align: Align::Center,
            },
        )
        .map_err(fatal)?;
    }

    place_artwork(doc, page, layout, item, ctx, loader, config).map_err(fatal)?;
    place_symbol(doc, page, layout, ctx, config).map_err(fatal)?;

    Ok(page)
}

fn place_artwork<H, S>(
    doc: &mut H,
    page: usize,
    layout: &ResolvedPageLayout,
    item: &LineItem,
    ctx: &PageContext<'_>,
    loader: &ImageLoader<'_, S>,
    config: &PrintConfig,
) -> pdf_core::Result<()>
where
    H: DocumentHandle + ?Sized,
    S: ImageStore + ?Sized,
{
    if layout.image_width_pt <= 0.0 || layout.image_height_pt <= 0.0 {
        warn!(
            "Page {}: no room for artwork of item {}, skipping image",
            ctx.page_number, item.id
        );
        return Ok(());
    }

    let artwork = loader.load_item(item, ctx.owner_id);
    let (x, y) = layout.image_origin();
    let rect = Rect {
        x,
        y,
        width: layout.image_width_pt,
        height: layout.image_height_pt,
    };

    match doc.draw_image(page, &artwork, rect) {
        Ok(()) => {
            debug!(
                "Page {}: artwork {:.2} x {:.2} pt at ({:.2}, {:.2})",
                ctx.page_number, rect.width, rect.height, rect.x, rect.y
            );
            Ok(())
        }
        Err(PdfError::ImageError(reason)) => {
            warn!(
                "Page {}: artwork of item {} could not be embedded ({reason}), drawing text instead",
                ctx.page_number, item.id
            );
            doc.draw_text(
                page,
                IMAGE_UNAVAILABLE_TEXT,
                TextPlacement {
                    x: layout.page_width_pt / 2.0,
                    y: layout.page_height_pt / 2.0,
                    font: StandardFont::Helvetica,
                    size: config.placeholder_font_size,
                    rotation: Rotation::Upright,
                    align: Align::Center,
                },
            )
        }
        Err(e) => Err(e),
    }
}

fn place_symbol<H>(
    doc: &mut H,
    page: usize,
    layout: &ResolvedPageLayout,
    ctx: &PageContext<'_>,
    config: &PrintConfig,
) -> pdf_core::Result<()>
where
    H: DocumentHandle + ?Sized,
{
    let size = config.code_size_pt();
    let rect = Rect {
        x: layout.margin_pt,
        y: layout.margin_pt,
        width: size,
        height: size,
    };

    let failure = match symbol::render(ctx.order_id, config.code_size_pixels) {
        AssetOutcome::NotFound => {
            debug!("Page {}: no order id, skipping QR code", ctx.page_number);
            return Ok(());
        }
        AssetOutcome::Ready(png) => match doc.draw_image(page, &png, rect) {
            Ok(()) => return Ok(()),
            Err(PdfError::ImageError(reason)) => reason,
            Err(e) => return Err(e),
        },
        AssetOutcome::DecodeError(reason) => reason,
    };

    warn!(
        "Page {}: QR code unavailable ({failure}), writing order id as text",
        ctx.page_number
    );
    doc.draw_text(
        page,
        ctx.order_id,
        TextPlacement {
            x: layout.margin_pt,
            y: layout.margin_pt + config.fallback_text_offset_pt,
            font: StandardFont::Helvetica,
            size: config.fallback_font_size,
            rotation: Rotation::Upright,
            align: Align::Left,
        },
    )
}
