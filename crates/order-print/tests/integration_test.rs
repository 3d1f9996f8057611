//! End-to-end tests for order-print
//!
//! Documents are generated through the public API and re-opened with lopdf.

use chrono::{NaiveDate, NaiveDateTime};
use order_print::{
    mm_to_points, DocumentAssembler, FsImageStore, GenerateError, InMemoryImageStore, LineItem,
    OrderDocumentRequest, PrintConfig, ProductDimensions, StaticDimensionProvider,
};
use pretty_assertions::assert_eq;

fn timestamp(second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 6)
        .unwrap()
        .and_hms_opt(7, 8, second)
        .unwrap()
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbImage::from_pixel(width, height, image::Rgb([30, 60, 90]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn assembler(store: InMemoryImageStore) -> DocumentAssembler<InMemoryImageStore> {
    DocumentAssembler::new(PrintConfig::default(), store).unwrap()
}

fn parse(bytes: &[u8]) -> lopdf::Document {
    lopdf::Document::load_mem(bytes).expect("generated PDF should parse")
}

fn page_contents(doc: &lopdf::Document) -> Vec<String> {
    doc.get_pages()
        .values()
        .map(|id| String::from_utf8_lossy(&doc.get_page_content(*id).unwrap()).into_owned())
        .collect()
}

fn media_boxes(doc: &lopdf::Document) -> Vec<(f64, f64)> {
    doc.get_pages()
        .values()
        .map(|id| {
            let page = doc.get_dictionary(*id).unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            (
                media_box[2].as_float().unwrap() as f64,
                media_box[3].as_float().unwrap() as f64,
            )
        })
        .collect()
}

/// `[width, height, x, y]` of every image placement in a content stream
fn placements(content: &str) -> Vec<[f64; 4]> {
    content
        .lines()
        .filter(|line| line.ends_with(" cm"))
        .map(|line| {
            let numbers: Vec<f64> = line
                .split_whitespace()
                .take(6)
                .map(|n| n.parse().unwrap())
                .collect();
            [numbers[0], numbers[3], numbers[4], numbers[5]]
        })
        .collect()
}

fn hex(text: &str) -> String {
    let digits: String = text.bytes().map(|b| format!("{b:02X}")).collect();
    format!("<{digits}> Tj")
}

/// (width, height) of every image XObject in the file
fn image_sizes(doc: &lopdf::Document) -> Vec<(i64, i64)> {
    let mut sizes: Vec<(i64, i64)> = doc
        .objects
        .values()
        .filter_map(|object| object.as_stream().ok())
        .filter(|stream| {
            stream.dict.get(b"Subtype").and_then(|v| v.as_name()).ok() == Some(b"Image".as_slice())
        })
        .map(|stream| {
            (
                stream.dict.get(b"Width").unwrap().as_i64().unwrap(),
                stream.dict.get(b"Height").unwrap().as_i64().unwrap(),
            )
        })
        .collect();
    sizes.sort();
    sizes
}

#[test]
fn test_page_count_matches_quantities() {
    let request = OrderDocumentRequest::new(
        "7d4e",
        "N-100",
        1,
        vec![LineItem::new(1, 1, 3), LineItem::new(2, 2, 1), LineItem::new(3, 3, 2)],
    );
    let document = assembler(InMemoryImageStore::new())
        .generate_at(&request, timestamp(0))
        .unwrap();

    assert_eq!(document.page_count, 6);
    assert_eq!(parse(&document.bytes).get_pages().len(), 6);
}

#[test]
fn test_print_template_reproduced_exactly() {
    // 40 x 10 px artwork stretched into an 80 x 80 mm box
    let store = InMemoryImageStore::new().with_image(1, "art.png", png(40, 10));
    let item = LineItem::new(1, 1, 1)
        .with_image_ref("art.png")
        .with_dimensions(ProductDimensions::print_template(80.0, 80.0));
    let request = OrderDocumentRequest::new("id", "N-1", 1, vec![item]);

    let document = assembler(store).generate_at(&request, timestamp(0)).unwrap();
    let parsed = parse(&document.bytes);
    let artwork = placements(&page_contents(&parsed)[0])[0];

    let expected = 80.0 * 72.0 / 25.4;
    assert!((artwork[0] - expected).abs() < 1e-6);
    assert!((artwork[1] - expected).abs() < 1e-6);

    let (page_width, page_height) = (mm_to_points(239.0), mm_to_points(99.0));
    assert!((artwork[2] - (page_width - expected) / 2.0).abs() < 1e-6);
    assert!((artwork[3] - (page_height - expected) / 2.0).abs() < 1e-6);
}

#[test]
fn test_default_page_geometry() {
    let request = OrderDocumentRequest::new("id", "N-1", 1, vec![LineItem::new(1, 1, 1)]);
    let document = assembler(InMemoryImageStore::new())
        .generate_at(&request, timestamp(0))
        .unwrap();
    let parsed = parse(&document.bytes);

    let (width, height) = media_boxes(&parsed)[0];
    assert!((width - mm_to_points(239.0)).abs() < 0.01);
    assert!((height - mm_to_points(99.0)).abs() < 0.01);

    // QR code flush with the 1 mm margin, 40 pt square
    let qr = placements(&page_contents(&parsed)[0])[1];
    assert!((qr[0] - 40.0).abs() < 1e-6);
    assert!((qr[2] - mm_to_points(1.0)).abs() < 1e-9);
    assert!((qr[3] - mm_to_points(1.0)).abs() < 1e-9);
}

#[test]
fn test_missing_image_uses_placeholder() {
    let item = LineItem::new(1, 1, 2).with_image_ref("never-generated.png");
    let request = OrderDocumentRequest::new("id", "N-1", 1, vec![item]);

    let document = assembler(InMemoryImageStore::new())
        .generate_at(&request, timestamp(0))
        .unwrap();
    assert_eq!(document.page_count, 2);

    let parsed = parse(&document.bytes);
    assert!(image_sizes(&parsed).contains(&(400, 300)));
    // Placeholder shared by both pages
    assert_eq!(
        image_sizes(&parsed).iter().filter(|size| **size == (400, 300)).count(),
        1
    );
}

/// Generate a one-page order whose artwork is `bytes`, return its parsed output
fn generate_with_artwork(name: &str, bytes: Vec<u8>) -> lopdf::Document {
    let store = InMemoryImageStore::new().with_image(1, name, bytes);
    let item = LineItem::new(1, 1, 1).with_image_ref(name);
    let request = OrderDocumentRequest::new("id", "N-1", 1, vec![item]);

    let document = assembler(store).generate_at(&request, timestamp(0)).unwrap();
    parse(&document.bytes)
}

#[test]
fn test_truncated_png_falls_back_to_text() {
    // Header and IHDR intact, pixel data missing
    let mut corrupt = png(10, 10);
    corrupt.truncate(30);

    let parsed = generate_with_artwork("broken.png", corrupt);
    let content = &page_contents(&parsed)[0];

    assert!(content.contains(&hex("Image not available")));
    assert!(!image_sizes(&parsed).contains(&(400, 300)));
    assert!(!image_sizes(&parsed).contains(&(10, 10)));
}

#[test]
fn test_truncated_jpeg_falls_back_to_text() {
    let image = image::RgbImage::from_fn(128, 128, |x, y| {
        image::Rgb([(x ^ y) as u8, (x * 2) as u8, (y * 2) as u8])
    });
    let mut jpeg = Vec::new();
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut std::io::Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
        .unwrap();
    jpeg.truncate(jpeg.len() / 3);

    let parsed = generate_with_artwork("broken.jpg", jpeg);
    let content = &page_contents(&parsed)[0];

    assert!(content.contains(&hex("Image not available")));
    assert!(!image_sizes(&parsed).contains(&(400, 300)));
    assert!(!image_sizes(&parsed).contains(&(128, 128)));
}

#[test]
fn test_header_text() {
    let request = OrderDocumentRequest::new("id", "ABC-123", 1, vec![LineItem::new(1, 1, 1)]);
    let document = assembler(InMemoryImageStore::new())
        .generate_at(&request, timestamp(0))
        .unwrap();
    let content = &page_contents(&parse(&document.bytes))[0];

    assert!(content.contains(&hex("ABC-123 (1/1)")));
    assert!(content.contains("0 1 -1 0 "));
}

#[test]
fn test_product_info_rendered() {
    let item = LineItem::new(1, 1, 1)
        .with_product_name("Magic Mug")
        .with_product_number("MM-11")
        .with_variant_label("Black");
    let request = OrderDocumentRequest::new("id", "N-1", 1, vec![item]);
    let document = assembler(InMemoryImageStore::new())
        .generate_at(&request, timestamp(0))
        .unwrap();
    let content = &page_contents(&parse(&document.bytes))[0];

    assert!(content.contains(&hex("Magic Mug | MM-11 | Black")));
}

#[test]
fn test_empty_order_rejected() {
    let request = OrderDocumentRequest::new("id", "N-1", 1, vec![]);
    let err = assembler(InMemoryImageStore::new())
        .generate(&request)
        .unwrap_err();
    assert!(matches!(err, GenerateError::EmptyOrder { .. }));
}

#[test]
fn test_identical_input_identical_bytes() {
    let store = InMemoryImageStore::new().with_image(1, "art.png", png(8, 8));
    let assembler = assembler(store);
    let request = OrderDocumentRequest::new(
        "5b0f",
        "N-7",
        1,
        vec![
            LineItem::new(1, 1, 2).with_image_ref("art.png").with_product_name("Mug"),
            LineItem::new(2, 2, 1),
        ],
    );

    let first = assembler.generate_at(&request, timestamp(1)).unwrap();
    let second = assembler.generate_at(&request, timestamp(2)).unwrap();

    assert_eq!(first.bytes, second.bytes);
    assert_ne!(first.filename, second.filename);
}

#[test]
fn test_multi_item_numbering() {
    let request = OrderDocumentRequest::new(
        "id",
        "ORD-9",
        1,
        vec![
            LineItem::new(1, 1, 2).with_product_name("Item A"),
            LineItem::new(2, 2, 3).with_product_name("Item B"),
        ],
    );
    let document = assembler(InMemoryImageStore::new())
        .generate_at(&request, timestamp(0))
        .unwrap();
    let contents = page_contents(&parse(&document.bytes));

    assert_eq!(contents.len(), 5);
    for (index, content) in contents.iter().enumerate() {
        assert!(content.contains(&hex(&format!("ORD-9 ({}/5)", index + 1))));
        let expected_item = if index < 2 { "Item A" } else { "Item B" };
        assert!(content.contains(&hex(expected_item)));
    }
}

#[test]
fn test_pages_sized_per_product() {
    let provider = StaticDimensionProvider::new().with_product(
        2,
        ProductDimensions {
            document_width_mm: Some(120.0),
            document_height_mm: Some(60.0),
            ..ProductDimensions::default()
        },
    );
    let assembler = assembler(InMemoryImageStore::new()).with_dimension_provider(provider);
    let request = OrderDocumentRequest::new(
        "id",
        "N-1",
        1,
        vec![LineItem::new(1, 1, 1), LineItem::new(2, 2, 1)],
    );

    let document = assembler.generate_at(&request, timestamp(0)).unwrap();
    let boxes = media_boxes(&parse(&document.bytes));

    assert!((boxes[0].0 - mm_to_points(239.0)).abs() < 0.01);
    assert!((boxes[1].0 - mm_to_points(120.0)).abs() < 0.01);
    assert!((boxes[1].1 - mm_to_points(60.0)).abs() < 0.01);
}

#[test]
fn test_filesystem_store() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("42")).unwrap();
    std::fs::write(dir.path().join("42").join("art.png"), png(12, 7)).unwrap();

    let assembler = DocumentAssembler::new(PrintConfig::default(), FsImageStore::new(dir.path())).unwrap();
    let request = OrderDocumentRequest::new(
        "id",
        "N-1",
        42,
        vec![
            LineItem::new(1, 1, 1).with_image_ref("art.png"),
            LineItem::new(2, 1, 1).with_image_ref("../escape.png"),
        ],
    );

    let document = assembler.generate_at(&request, timestamp(0)).unwrap();
    let sizes = image_sizes(&parse(&document.bytes));

    assert!(sizes.contains(&(12, 7)));
    assert!(sizes.contains(&(400, 300)));
}

#[test]
fn test_title_and_filename() {
    let request = OrderDocumentRequest::new("id", "ABC-123", 1, vec![LineItem::new(1, 1, 1)]);
    let document = assembler(InMemoryImageStore::new())
        .generate_at(&request, timestamp(9))
        .unwrap();

    assert_eq!(document.filename, "order_ABC-123_20240506_070809.pdf");
    assert_eq!(document.content_type(), "application/pdf");

    let parsed = parse(&document.bytes);
    let info_id = parsed.trailer.get(b"Info").unwrap().as_reference().unwrap();
    let info = parsed.get_dictionary(info_id).unwrap();
    assert_eq!(info.get(b"Title").unwrap().as_str().unwrap(), b"Order ABC-123");
}
