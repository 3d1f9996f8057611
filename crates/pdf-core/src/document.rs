//! PDF Document builder

use crate::font::StandardFont;
use crate::image::{generate_image_operators, ImageXObject};
use crate::text::{encode_hex, generate_text_operators, Rotation, TextRenderContext};
use crate::{Align, PdfError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::{Hash, Hasher};

/// PDF version written to the header
const PDF_VERSION: &str = "1.5";

/// Producer string written to the Info dictionary
const PRODUCER: &str = concat!("pdf-core ", env!("CARGO_PKG_VERSION"));

/// Fill color for text, components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }
}

/// A page allocated in the document
#[derive(Debug, Clone, Copy)]
struct PageEntry {
    id: ObjectId,
    width: f64,
    height: f64,
}

/// An image XObject already written to the document
#[derive(Debug, Clone, Copy)]
struct EmbeddedImage {
    object_id: ObjectId,
}

/// PDF document built page by page
///
/// Content is buffered per page and written in one pass by [`PdfDocument::to_bytes`],
/// so the page tree, resources and content streams are assembled once.
/// Object numbering depends only on the sequence of calls, which makes the
/// output byte-identical for identical input.
pub struct PdfDocument {
    inner: Document,
    /// Reserved id of the page tree root
    pages_id: ObjectId,
    /// Pages in document order
    pages: Vec<PageEntry>,
    /// Current font face
    current_font: StandardFont,
    current_font_size: f32,
    /// Fonts referenced per page (page number -> faces)
    page_fonts: BTreeMap<usize, BTreeSet<StandardFont>>,
    /// Embedded images (data hash -> XObject)
    embedded_images: HashMap<u64, EmbeddedImage>,
    /// Page image resources (page number -> resource name -> object ID)
    page_image_resources: BTreeMap<usize, BTreeMap<String, ObjectId>>,
    /// Suffix of the next `/ImN` resource name
    next_image_resource: u32,
    /// Content stream bytes per page, flushed by `finalize`
    page_content_buffer: BTreeMap<usize, Vec<u8>>,
    /// Document title for the Info dictionary
    title: Option<String>,
    /// Set once the page tree has been written
    finalized: bool,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    /// Create an empty document with no pages
    pub fn new() -> Self {
        let mut inner = Document::with_version(PDF_VERSION);
        let pages_id = inner.new_object_id();

        Self {
            inner,
            pages_id,
            pages: Vec::new(),
            current_font: StandardFont::default(),
            current_font_size: 12.0,
            page_fonts: BTreeMap::new(),
            embedded_images: HashMap::new(),
            page_image_resources: BTreeMap::new(),
            next_image_resource: 1,
            page_content_buffer: BTreeMap::new(),
            title: None,
            finalized: false,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append a `width` x `height` point page and return its 1-based number
    ///
    /// Each page carries its own MediaBox, so pages in one document may
    /// differ in size.
    pub fn add_page(&mut self, width: f64, height: f64) -> Result<usize> {
        if self.finalized {
            return Err(PdfError::SaveError(
                "Cannot add pages after the document was serialized".to_string(),
            ));
        }
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(PdfError::InvalidPageSize(width, height));
        }

        let id = self.inner.new_object_id();
        self.pages.push(PageEntry { id, width, height });

        Ok(self.pages.len())
    }

    /// Get page width and height in points
    pub fn page_size(&self, page: usize) -> Result<(f64, f64)> {
        let entry = self.page_entry(page)?;
        Ok((entry.width, entry.height))
    }

    /// Set the title written to the document Info dictionary
    pub fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    /// Set the current font face and size
    pub fn set_font(&mut self, font: StandardFont, size: f32) {
        self.current_font = font;
        self.current_font_size = size;
    }

    /// Get current font's text width for a string, in points
    pub fn text_width(&self, text: &str) -> f64 {
        self.current_font
            .text_width_points(text, self.current_font_size)
    }

    /// Insert upright text with its baseline at `y`, aligned on `x`
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
    ) -> Result<()> {
        self.insert_text_rotated(text, page, x, y, align, Rotation::Upright)
    }

    /// Insert text with a rotated baseline
    ///
    /// Alignment is applied along the baseline, so `Align::Center` with
    /// `Rotation::Ccw90` centers the string vertically on `(x, y)`.
    pub fn insert_text_rotated(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
        rotation: Rotation,
    ) -> Result<()> {
        self.page_entry(page)?;

        if text.is_empty() {
            return Ok(());
        }

        let font = self.current_font;
        let ctx = TextRenderContext {
            font_name: font.resource_name().to_string(),
            font_size: self.current_font_size,
            text_width: font.text_width_points(text, self.current_font_size),
            color: Color::black(),
            rotation,
        };

        let text_hex = encode_hex(&font.encode(text));
        let operators = generate_text_operators(&text_hex, x, y, align, &ctx);

        self.page_fonts.entry(page).or_default().insert(font);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Draw JPEG or PNG `data` stretched to exactly `width` x `height`
    /// points with its lower-left corner at `(x, y)`
    ///
    /// Undecodable image data fails with [`PdfError::ImageError`] and leaves
    /// the page untouched.
    pub fn insert_image(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        self.page_entry(page)?;

        let image_resource_name = self.get_or_create_image_ref(data, page)?;
        let operators = generate_image_operators(&image_resource_name, x, y, width, height);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Serialize the document to bytes
    ///
    /// The first call writes the page tree. Saving allocates a fresh
    /// cross-reference stream object, so each call saves a copy and the
    /// stored objects stay untouched; repeated calls return equal bytes.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.finalize()?;

        let mut buffer = Vec::new();
        self.inner
            .clone()
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }

    fn page_entry(&self, page: usize) -> Result<PageEntry> {
        if page == 0 || page > self.pages.len() {
            return Err(PdfError::InvalidPage(page, self.pages.len()));
        }
        Ok(self.pages[page - 1])
    }

    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Get or create an image resource name for a specific page
    ///
    /// Images are deduplicated by hash of their data, so repeated artwork is
    /// stored once and referenced from every page that shows it.
    fn get_or_create_image_ref(&mut self, data: &[u8], page: usize) -> Result<String> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let data_hash = hasher.finish();

        let object_id = match self.embedded_images.get(&data_hash) {
            Some(embedded) => embedded.object_id,
            None => {
                let xobject = ImageXObject::from_bytes(data)?;
                let object_id = self.inner.add_object(xobject.to_pdf_stream());
                self.embedded_images
                    .insert(data_hash, EmbeddedImage { object_id });
                object_id
            }
        };

        let page_resources = self.page_image_resources.entry(page).or_default();
        if let Some((name, _)) = page_resources.iter().find(|(_, id)| **id == object_id) {
            return Ok(name.clone());
        }

        let resource_name = format!("Im{}", self.next_image_resource);
        self.next_image_resource += 1;
        page_resources.insert(resource_name.clone(), object_id);

        Ok(resource_name)
    }

    /// Write fonts, content streams, page dictionaries, the page tree,
    /// the catalog and the Info dictionary
    fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Ok(());
        }
        if self.pages.is_empty() {
            return Err(PdfError::SaveError("Document has no pages".to_string()));
        }

        let font_ids = self.embed_fonts();
        let mut contents = std::mem::take(&mut self.page_content_buffer);
        let pages = self.pages.clone();
        let mut kids = Vec::with_capacity(pages.len());

        for (index, entry) in pages.iter().enumerate() {
            let page = index + 1;

            let content = contents.remove(&page).unwrap_or_default();
            let contents_id = self
                .inner
                .add_object(Stream::new(Dictionary::new(), content));

            let mut page_dict = Dictionary::new();
            page_dict.set("Type", Object::Name(b"Page".to_vec()));
            page_dict.set("Parent", Object::Reference(self.pages_id));
            page_dict.set(
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(entry.width as f32),
                    Object::Real(entry.height as f32),
                ]),
            );
            page_dict.set(
                "Resources",
                Object::Dictionary(self.page_resources(page, &font_ids)),
            );
            page_dict.set("Contents", Object::Reference(contents_id));

            self.inner
                .objects
                .insert(entry.id, Object::Dictionary(page_dict));
            kids.push(Object::Reference(entry.id));
        }

        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
        pages_dict.set("Count", Object::Integer(kids.len() as i64));
        pages_dict.set("Kids", Object::Array(kids));
        self.inner
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(self.pages_id));
        let catalog_id = self.inner.add_object(catalog);
        self.inner.trailer.set("Root", Object::Reference(catalog_id));

        let mut info = Dictionary::new();
        if let Some(title) = &self.title {
            info.set("Title", Object::string_literal(title.as_str()));
        }
        info.set("Producer", Object::string_literal(PRODUCER));
        let info_id = self.inner.add_object(info);
        self.inner.trailer.set("Info", Object::Reference(info_id));

        self.finalized = true;
        Ok(())
    }

    /// Add one font dictionary per face used anywhere in the document
    fn embed_fonts(&mut self) -> BTreeMap<StandardFont, ObjectId> {
        let used: BTreeSet<StandardFont> = self.page_fonts.values().flatten().copied().collect();

        used.into_iter()
            .map(|font| (font, self.inner.add_object(font.to_pdf_dictionary())))
            .collect()
    }

    /// Build the Resources dictionary of one page
    fn page_resources(&self, page: usize, font_ids: &BTreeMap<StandardFont, ObjectId>) -> Dictionary {
        let mut resources = Dictionary::new();

        if let Some(fonts) = self.page_fonts.get(&page) {
            let mut font_dict = Dictionary::new();
            for font in fonts {
                if let Some(id) = font_ids.get(font) {
                    font_dict.set(font.resource_name(), Object::Reference(*id));
                }
            }
            resources.set("Font", Object::Dictionary(font_dict));
        }

        if let Some(images) = self.page_image_resources.get(&page) {
            let mut xobject_dict = Dictionary::new();
            for (name, id) in images {
                xobject_dict.set(name.as_str(), Object::Reference(*id));
            }
            resources.set("XObject", Object::Dictionary(xobject_dict));
        }

        resources
    }
}
