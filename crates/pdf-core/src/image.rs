//! Raster images as PDF XObjects
//!
//! JPEG files must be complete and decodable, then they are embedded as-is
//! (DCTDecode). PNG files are decoded, reduced to 8-bit gray or RGB with any
//! alpha flattened onto white, and re-compressed with FlateDecode.

use crate::{PdfError, Result};
use image::{DynamicImage, ImageDecoder, ImageReader};
use lopdf::{Dictionary, Object, Stream};
use std::io::{Cursor, Write};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SOI: [u8; 3] = [0xFF, 0xD8, 0xFF];

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

/// Supported image container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// Image size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// What the file header says about an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ImageInfo {
    format: ImageFormat,
    dimensions: ImageDimensions,
    /// Color components; only known for JPEG
    components: Option<u8>,
}

/// Identify an image by its magic bytes
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.starts_with(&PNG_SIGNATURE) {
        Ok(ImageFormat::Png)
    } else if data.starts_with(&JPEG_SOI) {
        Ok(ImageFormat::Jpeg)
    } else {
        Err(PdfError::ImageError(
            "Unsupported image format (expected JPEG or PNG)".to_string(),
        ))
    }
}

/// Read the pixel size from the file header without decoding samples
pub fn image_dimensions(data: &[u8]) -> Result<ImageDimensions> {
    probe(data).map(|info| info.dimensions)
}

fn probe(data: &[u8]) -> Result<ImageInfo> {
    match detect_format(data)? {
        ImageFormat::Png => probe_png(data),
        ImageFormat::Jpeg => probe_jpeg(data),
    }
}

/// IHDR is always the first chunk: signature, length, "IHDR", width, height
fn probe_png(data: &[u8]) -> Result<ImageInfo> {
    let ihdr = data
        .get(8..24)
        .ok_or_else(|| PdfError::ImageError("PNG header truncated".to_string()))?;
    if &ihdr[4..8] != b"IHDR" {
        return Err(PdfError::ImageError(
            "PNG header has no IHDR chunk".to_string(),
        ));
    }

    let be32 = |b: &[u8]| u32::from_be_bytes([b[0], b[1], b[2], b[3]]);
    Ok(ImageInfo {
        format: ImageFormat::Png,
        dimensions: ImageDimensions {
            width: be32(&ihdr[8..12]),
            height: be32(&ihdr[12..16]),
        },
        components: None,
    })
}

/// Walk JPEG marker segments up to the first start-of-frame
fn probe_jpeg(data: &[u8]) -> Result<ImageInfo> {
    let mut pos = 2;

    while let Some(&[0xFF, marker, len_hi, len_lo]) = data.get(pos..pos + 4) {
        // Fill byte before a marker
        if marker == 0xFF {
            pos += 1;
            continue;
        }

        let is_frame = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_frame {
            let frame = data.get(pos + 4..pos + 10).ok_or_else(|| {
                PdfError::ImageError("JPEG frame header truncated".to_string())
            })?;
            return Ok(ImageInfo {
                format: ImageFormat::Jpeg,
                dimensions: ImageDimensions {
                    height: u16::from_be_bytes([frame[1], frame[2]]) as u32,
                    width: u16::from_be_bytes([frame[3], frame[4]]) as u32,
                },
                components: Some(frame[5]),
            });
        }

        let segment_len = u16::from_be_bytes([len_hi, len_lo]) as usize;
        if segment_len < 2 {
            break;
        }
        pos += 2 + segment_len;
    }

    Err(PdfError::ImageError(
        "JPEG has no start-of-frame segment".to_string(),
    ))
}

/// True if an end-of-image marker follows the first start-of-scan
///
/// Entropy-coded data escapes 0xFF as `FF 00`, so `FF D9` after the scan
/// header can only be EOI. Truncated files lose it.
fn has_complete_scan(data: &[u8]) -> bool {
    let mut pos = 2;

    while let Some(&[0xFF, marker, len_hi, len_lo]) = data.get(pos..pos + 4) {
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        if marker == 0xDA {
            return data[pos..].windows(2).any(|w| w == [0xFF, 0xD9]);
        }

        let segment_len = u16::from_be_bytes([len_hi, len_lo]) as usize;
        if segment_len < 2 {
            return false;
        }
        pos += 2 + segment_len;
    }

    false
}

/// An image ready to be written as a PDF XObject
#[derive(Debug, Clone)]
pub(crate) struct ImageXObject {
    pub width: u32,
    pub height: u32,
    pub color_space: &'static str,
    pub filter: &'static str,
    /// Sample data, already encoded with `filter`
    pub data: Vec<u8>,
}

impl ImageXObject {
    /// Build an XObject from JPEG or PNG file bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let info = probe(data)?;
        if info.dimensions.width == 0 || info.dimensions.height == 0 {
            return Err(PdfError::ImageError("Image has zero size".to_string()));
        }

        match info.format {
            ImageFormat::Jpeg => Self::jpeg_passthrough(data, info),
            ImageFormat::Png => Self::decode_png(data),
        }
    }

    /// Keep the original DCT stream once the whole scan decodes
    fn jpeg_passthrough(data: &[u8], info: ImageInfo) -> Result<Self> {
        if !has_complete_scan(data) {
            return Err(PdfError::ImageError(
                "JPEG scan data is truncated".to_string(),
            ));
        }
        ImageReader::with_format(Cursor::new(data), image::ImageFormat::Jpeg).decode()?;

        let color_space = match info.components {
            Some(1) => "DeviceGray",
            Some(4) => "DeviceCMYK",
            _ => "DeviceRGB",
        };

        Ok(Self {
            width: info.dimensions.width,
            height: info.dimensions.height,
            color_space,
            filter: "DCTDecode",
            data: data.to_vec(),
        })
    }

    fn decode_png(data: &[u8]) -> Result<Self> {
        let decoder = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .into_decoder()?;
        let color_type = decoder.color_type();
        let image = DynamicImage::from_decoder(decoder)?;
        let (width, height) = (image.width(), image.height());

        let (samples, color_space) = match (color_type.has_color(), color_type.has_alpha()) {
            (false, false) => (image.to_luma8().into_raw(), "DeviceGray"),
            (false, true) => (
                image
                    .to_luma_alpha8()
                    .pixels()
                    .map(|p| over_white(p[0], p[1]))
                    .collect::<Vec<u8>>(),
                "DeviceGray",
            ),
            (true, false) => (image.to_rgb8().into_raw(), "DeviceRGB"),
            (true, true) => (
                image
                    .to_rgba8()
                    .pixels()
                    .flat_map(|p| {
                        [
                            over_white(p[0], p[3]),
                            over_white(p[1], p[3]),
                            over_white(p[2], p[3]),
                        ]
                    })
                    .collect::<Vec<u8>>(),
                "DeviceRGB",
            ),
        };

        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&samples)?;

        Ok(Self {
            width,
            height,
            color_space,
            filter: "FlateDecode",
            data: encoder.finish()?,
        })
    }

    /// The image XObject stream
    pub fn to_pdf_stream(&self) -> Stream {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", self.width as i64);
        dict.set("Height", self.height as i64);
        dict.set(
            "ColorSpace",
            Object::Name(self.color_space.as_bytes().to_vec()),
        );
        dict.set("BitsPerComponent", 8_i64);
        dict.set("Filter", Object::Name(self.filter.as_bytes().to_vec()));

        // Data is already encoded, lopdf must not compress it again
        Stream::new(dict, self.data.clone()).with_compression(false)
    }
}

/// Composite an 8-bit sample with coverage `alpha` over white
fn over_white(value: u8, alpha: u8) -> u8 {
    let a = alpha as u16;
    ((value as u16 * a + 255 * (255 - a) + 127) / 255) as u8
}

/// Operators that paint image resource `name` into a box
///
/// The image's unit square is mapped onto `width` x `height` points with
/// its lower-left corner at `(x, y)`; the box alone decides the aspect ratio.
pub(crate) fn generate_image_operators(
    name: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<u8> {
    format!("q\n{width} 0 0 {height} {x} {y} cm\n/{name} Do\nQ\n").into_bytes()
}
