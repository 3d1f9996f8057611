//! Collaborators that supply artwork and product dimensions

use crate::model::ProductDimensions;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reported by an image store
#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid image reference: {0}")]
    InvalidReference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolves an image reference to encoded image bytes
pub trait ImageStore {
    fn get(&self, image_ref: &str, owner_id: i64) -> Result<Vec<u8>, ImageStoreError>;
}

/// Resolves the physical dimensions of a product
pub trait ProductDimensionProvider {
    fn get(&self, product_id: i64) -> Option<ProductDimensions>;
}

impl<T: ImageStore + ?Sized> ImageStore for &T {
    fn get(&self, image_ref: &str, owner_id: i64) -> Result<Vec<u8>, ImageStoreError> {
        (**self).get(image_ref, owner_id)
    }
}

impl<T: ProductDimensionProvider + ?Sized> ProductDimensionProvider for &T {
    fn get(&self, product_id: i64) -> Option<ProductDimensions> {
        (**self).get(product_id)
    }
}

/// Images stored on disk as `{root}/{owner_id}/{image_ref}`
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of an image, or `InvalidReference` if the reference could escape
    /// the owner's directory
    pub fn path_for(&self, image_ref: &str, owner_id: i64) -> Result<PathBuf, ImageStoreError> {
        let invalid = image_ref.is_empty()
            || image_ref.contains(['/', '\\'])
            || image_ref == "."
            || image_ref.contains("..")
            || Path::new(image_ref).is_absolute();
        if invalid {
            return Err(ImageStoreError::InvalidReference(image_ref.to_string()));
        }

        Ok(self.root.join(owner_id.to_string()).join(image_ref))
    }
}

impl ImageStore for FsImageStore {
    fn get(&self, image_ref: &str, owner_id: i64) -> Result<Vec<u8>, ImageStoreError> {
        let path = self.path_for(image_ref, owner_id)?;

        std::fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ImageStoreError::NotFound(path.display().to_string()),
            ErrorKind::PermissionDenied => {
                ImageStoreError::AccessDenied(path.display().to_string())
            }
            _ => ImageStoreError::Io(e),
        })
    }
}

/// Images held in memory, keyed by owner and reference
#[derive(Debug, Clone, Default)]
pub struct InMemoryImageStore {
    images: HashMap<(i64, String), Vec<u8>>,
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, owner_id: i64, image_ref: &str, bytes: Vec<u8>) {
        self.images.insert((owner_id, image_ref.to_string()), bytes);
    }

    pub fn with_image(mut self, owner_id: i64, image_ref: &str, bytes: Vec<u8>) -> Self {
        self.insert(owner_id, image_ref, bytes);
        self
    }
}

impl ImageStore for InMemoryImageStore {
    fn get(&self, image_ref: &str, owner_id: i64) -> Result<Vec<u8>, ImageStoreError> {
        self.images
            .get(&(owner_id, image_ref.to_string()))
            .cloned()
            .ok_or_else(|| ImageStoreError::NotFound(image_ref.to_string()))
    }
}

/// Product dimensions from a fixed table
#[derive(Debug, Clone, Default)]
pub struct StaticDimensionProvider {
    dimensions: HashMap<i64, ProductDimensions>,
}

impl StaticDimensionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(mut self, product_id: i64, dimensions: ProductDimensions) -> Self {
        self.dimensions.insert(product_id, dimensions);
        self
    }
}

impl ProductDimensionProvider for StaticDimensionProvider {
    fn get(&self, product_id: i64) -> Option<ProductDimensions> {
        self.dimensions.get(&product_id).copied()
    }
}

/// Provider for deployments without per-product dimensions
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProductDimensions;

impl ProductDimensionProvider for NoProductDimensions {
    fn get(&self, _product_id: i64) -> Option<ProductDimensions> {
        None
    }
}
