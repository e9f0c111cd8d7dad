//! Raster images as single-page PDF documents
//!
//! The image is flattened onto white, scaled to fit inside a fixed margin on
//! an A4 page with its aspect ratio preserved, and centred.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{Dictionary, Document, Object, Stream};

use crate::constants::{A4_HEIGHT_PT, A4_WIDTH_PT, IMAGE_MARGIN_PT};
use crate::types::Result;

/// Where the image lands on the page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Fit a `pixel_width` × `pixel_height` image inside the margins of an A4 page
pub fn fit_to_page(pixel_width: u32, pixel_height: u32) -> ImagePlacement {
    let avail_w = A4_WIDTH_PT - 2.0 * IMAGE_MARGIN_PT;
    let avail_h = A4_HEIGHT_PT - 2.0 * IMAGE_MARGIN_PT;
    let (w, h) = (pixel_width.max(1) as f32, pixel_height.max(1) as f32);

    let scale = (avail_w / w).min(avail_h / h);
    let (width, height) = (w * scale, h * scale);
    ImagePlacement {
        x: (A4_WIDTH_PT - width) / 2.0,
        y: (A4_HEIGHT_PT - height) / 2.0,
        width,
        height,
    }
}

/// Composite RGBA pixels over white, dropping the alpha channel
fn flatten_on_white(image: &image::RgbaImage) -> Vec<u8> {
    let mut rgb = Vec::with_capacity((image.width() * image.height() * 3) as usize);
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as u32;
        for channel in [r, g, b] {
            let blended = (channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255;
            rgb.push(blended as u8);
        }
    }
    rgb
}

fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Decode `bytes` as an image and wrap it in a one-page A4 document
pub fn image_to_document(bytes: &[u8]) -> Result<Document> {
    let decoded = image::load_from_memory(bytes)?;
    let rgba = decoded.to_rgba8();
    let (pixel_width, pixel_height) = rgba.dimensions();
    let data = compress(&flatten_on_white(&rgba))?;

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut image_dict = Dictionary::new();
    image_dict.set("Type", Object::Name(b"XObject".to_vec()));
    image_dict.set("Subtype", Object::Name(b"Image".to_vec()));
    image_dict.set("Width", Object::Integer(pixel_width as i64));
    image_dict.set("Height", Object::Integer(pixel_height as i64));
    image_dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    image_dict.set("BitsPerComponent", Object::Integer(8));
    image_dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
    let mut image_stream = Stream::new(image_dict, data);
    image_stream.allows_compression = false;
    let image_id = doc.add_object(image_stream);

    let placement = fit_to_page(pixel_width, pixel_height);
    let content = format!(
        "q {} 0 0 {} {} {} cm /Im0 Do Q\n",
        placement.width, placement.height, placement.x, placement.y
    );
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    let mut xobjects = Dictionary::new();
    xobjects.set("Im0", Object::Reference(image_id));
    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(A4_WIDTH_PT),
            Object::Real(A4_HEIGHT_PT),
        ]),
    );
    page_dict.set("Resources", Object::Dictionary(resources));
    page_dict.set("Contents", Object::Reference(content_id));
    let page_id = doc.add_object(page_dict);

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
    pages_dict.set("Count", Object::Integer(1));
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    log::debug!(
        "Rasterised {}x{} image onto A4 at {:.1}x{:.1} pt",
        pixel_width,
        pixel_height,
        placement.width,
        placement.height
    );
    Ok(doc)
}
