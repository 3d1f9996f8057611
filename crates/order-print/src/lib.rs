//! Order Print - print-ready documents for order line items
//!
//! This crate provides:
//! - Unit conversion between millimeters and PDF points
//! - Per-product page layout resolution with global defaults
//! - QR code symbols for order lookup
//! - Image loading with a generated placeholder fallback
//! - Page composition and whole-document assembly
//!
//! Every product unit in an order gets its own page, sized to the product's
//! physical dimensions, with the artwork placed at its exact print size.
//!
//! # Example
//!
//! ```ignore
//! use order_print::{DocumentAssembler, FsImageStore, OrderDocumentRequest, PrintConfig};
//!
//! let store = FsImageStore::new("/var/lib/images");
//! let assembler = DocumentAssembler::new(PrintConfig::default(), store)?;
//! let request: OrderDocumentRequest = serde_json::from_str(order_json)?;
//! let document = assembler.generate(&request)?;
//! std::fs::write(&document.filename, &document.bytes)?;
//! ```

pub mod assembler;
pub mod composer;
pub mod config;
pub mod handle;
pub mod layout;
pub mod loader;
pub mod model;
mod outcome;
pub mod store;
pub mod symbol;
pub mod units;

pub use assembler::{order_filename, DocumentAssembler};
pub use composer::{compose_page, PageContext};
pub use config::PrintConfig;
pub use handle::{DocumentHandle, Rect, TextPlacement};
pub use layout::{resolve_dimensions, resolve_layout, GlobalDefaults, ResolvedPageLayout};
pub use loader::ImageLoader;
pub use model::{GeneratedDocument, LineItem, OrderDocumentRequest, ProductDimensions};
pub use outcome::AssetOutcome;
pub use store::{
    FsImageStore, ImageStore, ImageStoreError, InMemoryImageStore, NoProductDimensions,
    ProductDimensionProvider, StaticDimensionProvider,
};
pub use symbol::{EncodingError, RasterImage};
pub use units::{mm_to_points, points_to_mm, MM_TO_POINTS};

use pdf_core::PdfError;
use thiserror::Error;

/// Errors that can occur while generating an order document
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Order {order_number} has no printable items")]
    EmptyOrder { order_number: String },

    #[error("Failed to compose page {page}: {source}")]
    PageComposition { page: usize, source: PdfError },

    #[error("Failed to serialize document: {0}")]
    Serialization(PdfError),

    #[error("Failed to generate document for order {order_number}: {source}")]
    DocumentGeneration {
        order_number: String,
        source: Box<GenerateError>,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for document generation
pub type Result<T> = std::result::Result<T, GenerateError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_wrapped_error_keeps_cause() {
        let err = GenerateError::DocumentGeneration {
            order_number: "A-1".to_string(),
            source: Box::new(GenerateError::PageComposition {
                page: 2,
                source: PdfError::InvalidPage(2, 1),
            }),
        };

        assert!(err.to_string().contains("order A-1"));
        let cause = err.source().unwrap();
        assert!(cause.to_string().starts_with("Failed to compose page 2"));
    }
}
