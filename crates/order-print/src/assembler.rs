//! Whole-document assembly

use crate::composer::{compose_page, PageContext};
use crate::config::PrintConfig;
use crate::handle::DocumentHandle;
use crate::layout::{resolve_dimensions, GlobalDefaults};
use crate::loader::ImageLoader;
use crate::model::{GeneratedDocument, OrderDocumentRequest};
use crate::store::{ImageStore, NoProductDimensions, ProductDimensionProvider};
use crate::{GenerateError, Result};
use chrono::{Local, NaiveDateTime};
use log::{debug, error, info};
use pdf_core::PdfDocument;

/// Filename order number used when the order has none
const FILENAME_FALLBACK: &str = "ORDER";

/// Builds print documents for orders
///
/// Holds only immutable configuration and collaborators, so one assembler
/// can serve many threads; each call builds its own document.
pub struct DocumentAssembler<S, P = NoProductDimensions> {
    config: PrintConfig,
    defaults: GlobalDefaults,
    store: S,
    dimensions: P,
}

impl<S: ImageStore> DocumentAssembler<S, NoProductDimensions> {
    /// Create an assembler; fails if `config` is invalid
    pub fn new(config: PrintConfig, store: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            defaults: config.defaults(),
            config,
            store,
            dimensions: NoProductDimensions,
        })
    }
}

impl<S: ImageStore, P: ProductDimensionProvider> DocumentAssembler<S, P> {
    /// Use `provider` for line items without their own dimensions
    pub fn with_dimension_provider<Q: ProductDimensionProvider>(
        self,
        provider: Q,
    ) -> DocumentAssembler<S, Q> {
        DocumentAssembler {
            config: self.config,
            defaults: self.defaults,
            store: self.store,
            dimensions: provider,
        }
    }

    /// Generate the print document for an order
    pub fn generate(&self, request: &OrderDocumentRequest) -> Result<GeneratedDocument> {
        self.generate_at(request, Local::now().naive_local())
    }

    /// Generate with a fixed timestamp for the filename
    pub fn generate_at(
        &self,
        request: &OrderDocumentRequest,
        timestamp: NaiveDateTime,
    ) -> Result<GeneratedDocument> {
        let mut doc = PdfDocument::new();
        doc.set_title(&format!("Order {}", request.order_number));

        let bytes = self.render_into(&mut doc, request)?;

        Ok(GeneratedDocument {
            bytes,
            page_count: request.total_pages(),
            filename: order_filename(&request.order_number, &timestamp),
        })
    }

    /// Compose every page of `request` into `doc` and serialize it
    ///
    /// Empty orders are rejected before anything is drawn. Any other failure
    /// is wrapped in [`GenerateError::DocumentGeneration`]; no partial bytes
    /// are returned.
    pub fn render_into<H>(&self, doc: &mut H, request: &OrderDocumentRequest) -> Result<Vec<u8>>
    where
        H: DocumentHandle + ?Sized,
    {
        let total_pages = request.total_pages();
        if total_pages == 0 {
            return Err(GenerateError::EmptyOrder {
                order_number: request.order_number.clone(),
            });
        }

        info!(
            "Generating document for order {} ({} pages)",
            request.order_number, total_pages
        );

        self.build(doc, request, total_pages).map_err(|e| {
            error!(
                "Document generation failed for order {}: {e}",
                request.order_number
            );
            GenerateError::DocumentGeneration {
                order_number: request.order_number.clone(),
                source: Box::new(e),
            }
        })
    }

    fn build<H>(&self, doc: &mut H, request: &OrderDocumentRequest, total_pages: usize) -> Result<Vec<u8>>
    where
        H: DocumentHandle + ?Sized,
    {
        let loader = ImageLoader::new(&self.store);
        let mut page_number = 0;

        for item in &request.items {
            if item.quantity == 0 {
                debug!("Skipping item {} with quantity 0", item.id);
                continue;
            }

            let dimensions = item
                .dimensions
                .or_else(|| self.dimensions.get(item.product_id));
            let layout = resolve_dimensions(dimensions.as_ref(), &self.defaults);

            for _ in 0..item.quantity {
                page_number += 1;
                let ctx = PageContext {
                    order_number: &request.order_number,
                    order_id: &request.order_id,
                    owner_id: request.owner_id,
                    page_number,
                    total_pages,
                };
                compose_page(doc, &layout, item, &ctx, &loader, &self.config)?;
            }
        }

        let bytes = doc.serialize().map_err(GenerateError::Serialization)?;
        debug!(
            "Serialized order {}: {} pages, {} bytes",
            request.order_number,
            doc.page_count(),
            bytes.len()
        );

        Ok(bytes)
    }
}

/// Download filename, e.g. `order_ABC-123_20240131_154500.pdf`
pub fn order_filename(order_number: &str, timestamp: &NaiveDateTime) -> String {
    let order_number = if order_number.is_empty() {
        FILENAME_FALLBACK
    } else {
        order_number
    };
    format!("order_{order_number}_{}.pdf", timestamp.format("%Y%m%d_%H%M%S"))
}
