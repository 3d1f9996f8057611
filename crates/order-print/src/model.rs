//! Order input and document output types

use serde::{Deserialize, Serialize};

/// An order to print, one page per product unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDocumentRequest {
    /// Opaque order identifier, encoded into the QR code
    pub order_id: String,
    /// Human-readable order number shown in the header
    pub order_number: String,
    /// Owner of the order's images
    pub owner_id: i64,
    /// Line items in print order
    pub items: Vec<LineItem>,
}

impl OrderDocumentRequest {
    pub fn new(order_id: &str, order_number: &str, owner_id: i64, items: Vec<LineItem>) -> Self {
        Self {
            order_id: order_id.to_string(),
            order_number: order_number.to_string(),
            owner_id,
            items,
        }
    }

    /// Number of pages the order expands to
    pub fn total_pages(&self) -> usize {
        self.items.iter().map(|item| item.quantity as usize).sum()
    }
}

/// One product or variant entry of an order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: i64,
    /// Number of units; each unit is printed on its own page
    pub quantity: u32,
    /// Reference of the generated artwork in the image store
    #[serde(default)]
    pub image_ref: Option<String>,
    pub product_id: i64,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product_number: Option<String>,
    #[serde(default)]
    pub variant_label: Option<String>,
    /// Physical dimensions; when absent the dimension provider is asked
    #[serde(default)]
    pub dimensions: Option<ProductDimensions>,
    /// Artwork bytes already in memory; preferred over `image_ref`
    #[serde(skip)]
    pub image_bytes: Option<Vec<u8>>,
}

impl LineItem {
    pub fn new(id: i64, product_id: i64, quantity: u32) -> Self {
        Self {
            id,
            product_id,
            quantity,
            ..Self::default()
        }
    }

    pub fn with_image_ref(mut self, image_ref: &str) -> Self {
        self.image_ref = Some(image_ref.to_string());
        self
    }

    pub fn with_image_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.image_bytes = Some(bytes);
        self
    }

    pub fn with_product_name(mut self, name: &str) -> Self {
        self.product_name = Some(name.to_string());
        self
    }

    pub fn with_product_number(mut self, number: &str) -> Self {
        self.product_number = Some(number.to_string());
        self
    }

    pub fn with_variant_label(mut self, label: &str) -> Self {
        self.variant_label = Some(label.to_string());
        self
    }

    pub fn with_dimensions(mut self, dimensions: ProductDimensions) -> Self {
        self.dimensions = Some(dimensions);
        self
    }
}

/// Physical product dimensions in millimeters
///
/// Every field is optional; missing values fall back to the global defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductDimensions {
    pub document_width_mm: Option<f64>,
    pub document_height_mm: Option<f64>,
    pub margin_bottom_mm: Option<f64>,
    /// Exact artwork width on the page
    pub print_width_mm: Option<f64>,
    /// Exact artwork height on the page
    pub print_height_mm: Option<f64>,
}

impl ProductDimensions {
    /// Dimensions with only the print template size set
    pub fn print_template(width_mm: f64, height_mm: f64) -> Self {
        Self {
            print_width_mm: Some(width_mm),
            print_height_mm: Some(height_mm),
            ..Self::default()
        }
    }
}

/// A finished print document
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDocument {
    /// Serialized PDF
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Suggested download filename
    pub filename: String,
}

impl GeneratedDocument {
    /// MIME type of `bytes`
    pub fn content_type(&self) -> &'static str {
        "application/pdf"
    }
}
