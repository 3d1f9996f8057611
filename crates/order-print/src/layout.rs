//! Page layout resolution
//!
//! Turns optional per-product dimensions into concrete page and artwork
//! sizes in points. Pure: no I/O, never fails.

use crate::model::{LineItem, ProductDimensions};
use crate::units::mm_to_points;

/// Height reserved for header and QR clearance when no print template is set, in mm
pub const DEFAULT_IMAGE_MARGIN_MM: f64 = 15.0;

/// Global page defaults in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalDefaults {
    pub width_pt: f64,
    pub height_pt: f64,
    pub margin_pt: f64,
}

/// Effective geometry of one page, in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPageLayout {
    pub page_width_pt: f64,
    pub page_height_pt: f64,
    pub margin_pt: f64,
    pub image_width_pt: f64,
    pub image_height_pt: f64,
}

impl ResolvedPageLayout {
    /// Lower-left corner that centers the artwork on the page
    pub fn image_origin(&self) -> (f64, f64) {
        (
            (self.page_width_pt - self.image_width_pt) / 2.0,
            (self.page_height_pt - self.image_height_pt) / 2.0,
        )
    }
}

/// Resolve the layout of a line item from its own dimensions
pub fn resolve_layout(item: &LineItem, defaults: &GlobalDefaults) -> ResolvedPageLayout {
    resolve_dimensions(item.dimensions.as_ref(), defaults)
}

/// Resolve a layout field by field
///
/// Present values are converted to points; absent, non-finite or
/// non-positive values fall back to `defaults` (a margin of zero is kept).
/// Print template sizes are reproduced exactly, even when they overflow
/// the page.
pub fn resolve_dimensions(
    dimensions: Option<&ProductDimensions>,
    defaults: &GlobalDefaults,
) -> ResolvedPageLayout {
    let dims = dimensions.copied().unwrap_or_default();

    let page_width_pt = size_pt(dims.document_width_mm).unwrap_or(defaults.width_pt);
    let page_height_pt = size_pt(dims.document_height_mm).unwrap_or(defaults.height_pt);
    let margin_pt = dims
        .margin_bottom_mm
        .filter(|mm| mm.is_finite() && *mm >= 0.0)
        .map(mm_to_points)
        .unwrap_or(defaults.margin_pt);

    let image_width_pt = size_pt(dims.print_width_mm)
        .unwrap_or_else(|| (page_width_pt - 2.0 * margin_pt).max(0.0));
    let image_height_pt = size_pt(dims.print_height_mm).unwrap_or_else(|| {
        (page_height_pt - 2.0 * margin_pt - mm_to_points(DEFAULT_IMAGE_MARGIN_MM)).max(0.0)
    });

    ResolvedPageLayout {
        page_width_pt,
        page_height_pt,
        margin_pt,
        image_width_pt,
        image_height_pt,
    }
}

fn size_pt(mm: Option<f64>) -> Option<f64> {
    mm.filter(|v| v.is_finite() && *v > 0.0).map(mm_to_points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn defaults() -> GlobalDefaults {
        GlobalDefaults {
            width_pt: mm_to_points(239.0),
            height_pt: mm_to_points(99.0),
            margin_pt: mm_to_points(1.0),
        }
    }

    #[test]
    fn test_no_dimensions_uses_defaults() {
        let layout = resolve_layout(&LineItem::new(1, 1, 1), &defaults());
        let d = defaults();

        assert_eq!(layout.page_width_pt, d.width_pt);
        assert_eq!(layout.page_height_pt, d.height_pt);
        assert_eq!(layout.margin_pt, d.margin_pt);
        assert!((layout.image_width_pt - mm_to_points(237.0)).abs() < 1e-9);
        assert!((layout.image_height_pt - mm_to_points(99.0 - 2.0 - 15.0)).abs() < 1e-9);
    }

    #[test]
    fn test_print_template_is_exact() {
        let item = LineItem::new(1, 1, 1).with_dimensions(ProductDimensions::print_template(80.0, 80.0));
        let layout = resolve_layout(&item, &defaults());

        assert!((layout.image_width_pt - 80.0 * 72.0 / 25.4).abs() < 1e-6);
        assert!((layout.image_height_pt - 80.0 * 72.0 / 25.4).abs() < 1e-6);
        assert_eq!(layout.page_width_pt, defaults().width_pt);
    }

    #[test]
    fn test_print_template_may_overflow_page() {
        let item = LineItem::new(1, 1, 1).with_dimensions(ProductDimensions {
            document_width_mm: Some(100.0),
            document_height_mm: Some(50.0),
            print_width_mm: Some(150.0),
            print_height_mm: Some(60.0),
            ..ProductDimensions::default()
        });
        let layout = resolve_layout(&item, &defaults());

        assert!((layout.image_width_pt - mm_to_points(150.0)).abs() < 1e-9);
        let (x, y) = layout.image_origin();
        assert!(x < 0.0);
        assert!(y < 0.0);
    }

    #[test]
    fn test_fields_resolve_independently() {
        let dims = ProductDimensions {
            document_width_mm: Some(200.0),
            margin_bottom_mm: Some(5.0),
            print_height_mm: Some(70.0),
            ..ProductDimensions::default()
        };
        let layout = resolve_dimensions(Some(&dims), &defaults());

        assert!((layout.page_width_pt - mm_to_points(200.0)).abs() < 1e-9);
        assert_eq!(layout.page_height_pt, defaults().height_pt);
        assert!((layout.margin_pt - mm_to_points(5.0)).abs() < 1e-9);
        // 200 - 2 * 5
        assert!((layout.image_width_pt - mm_to_points(190.0)).abs() < 1e-9);
        assert!((layout.image_height_pt - mm_to_points(70.0)).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let dims = ProductDimensions {
            document_width_mm: Some(0.0),
            document_height_mm: Some(f64::NAN),
            margin_bottom_mm: Some(-3.0),
            print_width_mm: Some(-10.0),
            print_height_mm: Some(f64::INFINITY),
        };
        let from_invalid = resolve_dimensions(Some(&dims), &defaults());
        let from_none = resolve_dimensions(None, &defaults());

        assert_eq!(from_invalid, from_none);
    }

    #[test]
    fn test_zero_margin_kept() {
        let dims = ProductDimensions {
            margin_bottom_mm: Some(0.0),
            ..ProductDimensions::default()
        };
        let layout = resolve_dimensions(Some(&dims), &defaults());
        assert_eq!(layout.margin_pt, 0.0);
        assert_eq!(layout.image_width_pt, defaults().width_pt);
    }

    #[test]
    fn test_tiny_page_image_box_not_negative() {
        let dims = ProductDimensions {
            document_width_mm: Some(10.0),
            document_height_mm: Some(10.0),
            ..ProductDimensions::default()
        };
        let layout = resolve_dimensions(Some(&dims), &defaults());
        assert_eq!(layout.image_height_pt, 0.0);
        assert!(layout.image_width_pt > 0.0);
    }

    #[test]
    fn test_image_origin_centers() {
        let layout = ResolvedPageLayout {
            page_width_pt: 300.0,
            page_height_pt: 200.0,
            margin_pt: 0.0,
            image_width_pt: 100.0,
            image_height_pt: 50.0,
        };
        assert_eq!(layout.image_origin(), (100.0, 75.0));
    }
}
