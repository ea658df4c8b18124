//! Output document assembly
//!
//! Pages are collected in memory as placed raster images and only turned into
//! PDF objects when the document is written, so assembled documents can be
//! appended to each other or split without renumbering objects.

use crate::constants::JPEG_QUALITY;
use crate::geometry::Rect;
use crate::types::*;
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::path::Path;
use std::sync::Arc;

/// A raster embedded once and drawn through a transform
#[derive(Debug, Clone)]
struct PlacedImage {
    jpeg: Arc<Vec<u8>>,
    width_px: u32,
    height_px: u32,
    matrix: [f32; 6],
}

#[derive(Debug, Clone)]
struct PendingPage {
    width: f32,
    height: f32,
    images: Vec<PlacedImage>,
}

/// An output PDF under construction
#[derive(Debug, Clone, Default)]
pub struct AssembledDocument {
    pages: Vec<PendingPage>,
}

impl AssembledDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Add an empty page of `width` × `height` points, returning its index
    pub fn new_blank_page(&mut self, width: f32, height: f32) -> usize {
        self.pages.push(PendingPage {
            width,
            height,
            images: Vec::new(),
        });
        self.pages.len() - 1
    }

    /// Draw `image` on `page` so it exactly covers `rect`, turned clockwise by
    /// `rotation`. For quarter turns `rect` is the box after turning.
    pub fn place_image(
        &mut self,
        page: usize,
        image: &DynamicImage,
        rect: Rect,
        rotation: Rotation,
    ) -> Result<()> {
        let page_count = self.pages.len();
        let target = self.pages.get_mut(page).ok_or(PressError::OutOfRange {
            index: page,
            len: page_count,
        })?;

        let rgb = image.to_rgb8();
        let mut jpeg = Vec::new();
        rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY))?;

        target.images.push(PlacedImage {
            jpeg: Arc::new(jpeg),
            width_px: rgb.width(),
            height_px: rgb.height(),
            matrix: placement_matrix(&rect, rotation),
        });
        Ok(())
    }

    /// Move every page of `other` to the end of this document
    pub fn append(&mut self, other: AssembledDocument) {
        self.pages.extend(other.pages);
    }

    /// Split into (1st, 3rd, 5th, ...) and (2nd, 4th, ...) pages
    pub fn split_alternate(self) -> (AssembledDocument, AssembledDocument) {
        let mut odd = AssembledDocument::new();
        let mut even = AssembledDocument::new();
        for (index, page) in self.pages.into_iter().enumerate() {
            if index % 2 == 0 {
                odd.pages.push(page);
            } else {
                even.pages.push(page);
            }
        }
        (odd, even)
    }

    /// Build the PDF object graph
    pub fn to_document(&self) -> Document {
        let mut output = Document::with_version("1.7");
        let pages_tree_id = output.new_object_id();

        let page_refs = self
            .pages
            .iter()
            .map(|page| Object::Reference(write_page(&mut output, page, pages_tree_id)))
            .collect();

        finalize_document(&mut output, pages_tree_id, page_refs);
        output
    }

    /// Write the document to `path`, replacing any existing file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut doc = self.to_document();
        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        std::fs::write(path, writer)?;
        log::info!("Wrote {} ({} pages)", path.display(), self.page_count());
        Ok(())
    }
}

/// Map the image unit square onto `rect`, turned clockwise by `rotation`
fn placement_matrix(rect: &Rect, rotation: Rotation) -> [f32; 6] {
    let Rect {
        x,
        y,
        width: w,
        height: h,
    } = *rect;
    match rotation {
        Rotation::None => [w, 0.0, 0.0, h, x, y],
        Rotation::Clockwise90 => [0.0, -h, w, 0.0, x, y + h],
        Rotation::Clockwise180 => [-w, 0.0, 0.0, -h, x + w, y + h],
        Rotation::Clockwise270 => [0.0, h, -w, 0.0, x + w, y],
    }
}

fn write_page(output: &mut Document, page: &PendingPage, parent_pages_id: ObjectId) -> ObjectId {
    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(parent_pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(page.width),
            Object::Real(page.height),
        ]),
    );

    let mut content_ops = Vec::new();
    let mut xobjects = Dictionary::new();

    for (idx, placed) in page.images.iter().enumerate() {
        let xobject_name = format!("Im{}", idx);
        let xobject_id = output.add_object(image_xobject(placed));
        xobjects.set(xobject_name.as_bytes(), Object::Reference(xobject_id));

        let [a, b, c, d, e, f] = placed.matrix;
        content_ops.push(format!(
            "q {} {} {} {} {} {} cm /{} Do Q\n",
            a, b, c, d, e, f, xobject_name
        ));
    }

    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    let content = content_ops.join("");
    let content_id = output.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));

    output.add_object(page_dict)
}

fn image_xobject(placed: &PlacedImage) -> Stream {
    let dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(placed.width_px as i64)),
        ("Height", Object::Integer(placed.height_px as i64)),
        ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
        ("Filter", Object::Name(b"DCTDecode".to_vec())),
    ]);
    Stream::new(dict, placed.jpeg.as_ref().clone()).with_compression(false)
}

/// Create pages tree and catalog, finalize document structure
fn finalize_document(output: &mut Document, pages_tree_id: ObjectId, page_refs: Vec<Object>) {
    let count = page_refs.len() as i64;
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(page_refs)),
        ("Count", Object::Integer(count)),
    ]);
    output
        .objects
        .insert(pages_tree_id, Object::Dictionary(pages_dict));

    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_tree_id)),
    ]));

    output.trailer.set("Root", catalog_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(m: [f32; 6], u: f32, v: f32) -> (f32, f32) {
        (m[0] * u + m[2] * v + m[4], m[1] * u + m[3] * v + m[5])
    }

    #[test]
    fn test_quarter_turn_keeps_image_inside_rect() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        for rotation in [
            Rotation::None,
            Rotation::Clockwise90,
            Rotation::Clockwise180,
            Rotation::Clockwise270,
        ] {
            let m = placement_matrix(&rect, rotation);
            for (u, v) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)] {
                let (px, py) = apply(m, u, v);
                assert!(px >= rect.x - 0.001 && px <= rect.right() + 0.001);
                assert!(py >= rect.y - 0.001 && py <= rect.top() + 0.001);
            }
        }
    }

    #[test]
    fn test_append_then_split_alternate() {
        let mut front = AssembledDocument::new();
        for _ in 0..3 {
            front.new_blank_page(100.0, 200.0);
        }
        let mut back = AssembledDocument::new();
        back.new_blank_page(300.0, 400.0);
        back.new_blank_page(300.0, 400.0);

        front.append(back);
        assert_eq!(front.page_count(), 5);

        let (odd, even) = front.split_alternate();
        assert_eq!(odd.page_count(), 3);
        assert_eq!(even.page_count(), 2);
        // Pages keep their order: the 4th page came from the appended document
        assert_eq!(even.pages[1].width, 300.0);
        assert_eq!(odd.pages[1].width, 100.0);
    }

    #[test]
    fn test_clockwise_turn_puts_image_top_on_the_right() {
        let rect = Rect::new(0.0, 0.0, 40.0, 80.0);
        let m = placement_matrix(&rect, Rotation::Clockwise90);
        // Image top edge is v = 1
        assert_eq!(apply(m, 0.0, 1.0), (40.0, 80.0));
        assert_eq!(apply(m, 1.0, 1.0), (40.0, 0.0));
    }
}
