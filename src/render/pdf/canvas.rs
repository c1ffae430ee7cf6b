//! Page content in top-down coordinates and final PDF assembly.

use super::fonts::{self, Face};
use super::layout::Span;
use crate::error::{RenderError, Result};
use crate::render::image::{ColorModel, ImageFormat, ImageInfo};
use crate::render::DocumentInfo;
use crate::resource::ResourceScope;
use crate::sanitize::strip_control_chars;
use crate::style::{Color, ImageShape};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};
use std::collections::BTreeSet;
use std::io::Write;

/// Bézier control distance for a quarter circle of radius 1.
const KAPPA: f32 = 0.552_284_8;

#[derive(Debug, Default)]
struct Page {
    ops: Vec<Operation>,
    links: Vec<([f32; 4], String)>,
}

/// An image XObject waiting to be written.
///
/// Its stream data (JPEG file bytes or concatenated PNG IDAT data) lives in
/// the render's [`ResourceScope`] under `name`.
#[derive(Debug)]
pub struct ImageObject {
    pub name: String,
    pub info: ImageInfo,
}

impl ImageObject {
    fn into_stream(self, data: Vec<u8>) -> Stream {
        let color_space: Object = match &self.info.color {
            ColorModel::Gray => "DeviceGray".into(),
            ColorModel::Cmyk => "DeviceCMYK".into(),
            ColorModel::Indexed(palette) => Object::Array(vec![
                "Indexed".into(),
                "DeviceRGB".into(),
                ((palette.len() / 3).saturating_sub(1) as i64).into(),
                Object::String(palette.clone(), StringFormat::Hexadecimal),
            ]),
            ColorModel::Rgb | ColorModel::WithAlpha => "DeviceRGB".into(),
        };
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => self.info.width as i64,
            "Height" => self.info.height as i64,
            "ColorSpace" => color_space,
            "BitsPerComponent" => self.info.bits_per_component as i64,
        };
        match self.info.format {
            ImageFormat::Jpeg => dict.set("Filter", "DCTDecode"),
            ImageFormat::Png => {
                dict.set("Filter", "FlateDecode");
                dict.set(
                    "DecodeParms",
                    dictionary! {
                        "Predictor" => 15,
                        "Colors" => self.info.color.components() as i64,
                        "BitsPerComponent" => self.info.bits_per_component as i64,
                        "Columns" => self.info.width as i64,
                    },
                );
            }
        }
        Stream::new(dict, data).with_compression(false)
    }
}

/// Drawing surface spanning every page of the document.
///
/// `y` grows downwards from the top edge; conversion to PDF space happens
/// when operations are recorded.
#[derive(Debug)]
pub struct Canvas {
    width: f32,
    height: f32,
    pages: Vec<Page>,
    fonts: BTreeSet<Face>,
    images: Vec<ImageObject>,
}

fn rgb(op: &str, color: Color) -> Operation {
    let [r, g, b] = color.unit();
    Operation::new(op, vec![r.into(), g.into(), b.into()])
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            pages: vec![Page::default()],
            fonts: BTreeSet::new(),
            images: Vec::new(),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&mut self, index: usize) -> &mut Page {
        while self.pages.len() <= index {
            self.pages.push(Page::default());
        }
        &mut self.pages[index]
    }

    fn y(&self, y: f32) -> f32 {
        self.height - y
    }

    fn push(&mut self, page: usize, ops: Vec<Operation>) {
        self.page(page).ops.extend(ops);
    }

    pub fn fill_rect(&mut self, page: usize, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let bottom = self.y(y + h);
        self.push(
            page,
            vec![
                Operation::new("q", vec![]),
                rgb("rg", color),
                Operation::new("re", vec![x.into(), bottom.into(), w.into(), h.into()]),
                Operation::new("f", vec![]),
                Operation::new("Q", vec![]),
            ],
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn stroke_rect(&mut self, page: usize, x: f32, y: f32, w: f32, h: f32, width: f32, color: Color) {
        let bottom = self.y(y + h);
        self.push(
            page,
            vec![
                Operation::new("q", vec![]),
                Operation::new("w", vec![width.into()]),
                rgb("RG", color),
                Operation::new("re", vec![x.into(), bottom.into(), w.into(), h.into()]),
                Operation::new("S", vec![]),
                Operation::new("Q", vec![]),
            ],
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn line(
        &mut self,
        page: usize,
        (x1, y1): (f32, f32),
        (x2, y2): (f32, f32),
        width: f32,
        color: Color,
        dotted: bool,
    ) {
        let (y1, y2) = (self.y(y1), self.y(y2));
        let mut ops = vec![
            Operation::new("q", vec![]),
            Operation::new("w", vec![width.into()]),
            rgb("RG", color),
        ];
        if dotted {
            ops.push(Operation::new("J", vec![1.into()]));
            ops.push(Operation::new(
                "d",
                vec![vec![Object::Integer(0), (width * 2.5).into()].into(), 0.into()],
            ));
        }
        ops.extend([
            Operation::new("m", vec![x1.into(), y1.into()]),
            Operation::new("l", vec![x2.into(), y2.into()]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
        self.push(page, ops);
    }

    /// Show `text` in the style of `span` with its baseline at `baseline`.
    #[allow(clippy::too_many_arguments)]
    pub fn text(
        &mut self,
        page: usize,
        x: f32,
        baseline: f32,
        span: &Span,
        text: &str,
        word_spacing: f32,
        char_spacing: f32,
    ) {
        if text.is_empty() {
            return;
        }
        self.fonts.insert(span.face);
        let y = self.y(baseline);
        let mut ops = vec![
            Operation::new("BT", vec![]),
            rgb("rg", span.color),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(span.face.resource_name().into_bytes()),
                    span.size.into(),
                ],
            ),
        ];
        // Tw and Tc are part of the graphics state and outlive ET.
        ops.extend([
            Operation::new("Tw", vec![word_spacing.into()]),
            Operation::new("Tc", vec![char_spacing.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(fonts::encode(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
        self.push(page, ops);
    }

    /// A clickable area opening `uri`.
    pub fn link(&mut self, page: usize, x: f32, y: f32, w: f32, h: f32, uri: &str) {
        let rect = [x, self.y(y + h), x + w, self.y(y)];
        let uri = strip_control_chars(uri).into_owned();
        self.page(page).links.push((rect, uri));
    }

    pub fn add_image(&mut self, image: ImageObject) {
        self.images.push(image);
    }

    /// Append the outline of `shape` inside the box to `ops`.
    fn shape_path(&self, ops: &mut Vec<Operation>, shape: ImageShape, x: f32, y: f32, size: f32) {
        let bottom = self.y(y + size);
        let r = match shape {
            ImageShape::Square => {
                ops.push(Operation::new(
                    "re",
                    vec![x.into(), bottom.into(), size.into(), size.into()],
                ));
                return;
            }
            ImageShape::Rounded => size * 0.15,
            ImageShape::Circle => size / 2.0,
        };
        let k = r * KAPPA;
        let (left, right, top) = (x, x + size, bottom + size);
        let curve = |x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32| {
            Operation::new(
                "c",
                vec![x1.into(), y1.into(), x2.into(), y2.into(), x3.into(), y3.into()],
            )
        };
        ops.push(Operation::new("m", vec![(left + r).into(), bottom.into()]));
        ops.push(Operation::new("l", vec![(right - r).into(), bottom.into()]));
        ops.push(curve(right - r + k, bottom, right, bottom + r - k, right, bottom + r));
        ops.push(Operation::new("l", vec![right.into(), (top - r).into()]));
        ops.push(curve(right, top - r + k, right - r + k, top, right - r, top));
        ops.push(Operation::new("l", vec![(left + r).into(), top.into()]));
        ops.push(curve(left + r - k, top, left, top - r + k, left, top - r));
        ops.push(Operation::new("l", vec![left.into(), (bottom + r).into()]));
        ops.push(curve(left, bottom + r - k, left + r - k, bottom, left + r, bottom));
        ops.push(Operation::new("h", vec![]));
    }

    /// Draw a registered image cropped to `shape` in a `size` square.
    ///
    /// The image is scaled to cover the square and centered.
    #[allow(clippy::too_many_arguments)]
    pub fn image(
        &mut self,
        page: usize,
        name: &str,
        aspect: f32,
        (x, y): (f32, f32),
        size: f32,
        shape: ImageShape,
        border: Option<Color>,
    ) {
        let (w, h) = if aspect >= 1.0 {
            (size, size * aspect)
        } else {
            (size / aspect.max(0.01), size)
        };
        let img_x = x + (size - w) / 2.0;
        let img_bottom = self.y(y + size) + (size - h) / 2.0;

        let mut ops = vec![Operation::new("q", vec![])];
        self.shape_path(&mut ops, shape, x, y, size);
        ops.push(Operation::new("W", vec![]));
        ops.push(Operation::new("n", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![w.into(), 0.into(), 0.into(), h.into(), img_x.into(), img_bottom.into()],
        ));
        ops.push(Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]));
        ops.push(Operation::new("Q", vec![]));

        if let Some(color) = border {
            ops.push(Operation::new("q", vec![]));
            ops.push(Operation::new("w", vec![1.0f32.into()]));
            ops.push(rgb("RG", color));
            self.shape_path(&mut ops, shape, x, y, size);
            ops.push(Operation::new("S", vec![]));
            ops.push(Operation::new("Q", vec![]));
        }
        self.push(page, ops);
    }

    /// Write every page into a complete PDF file. Image data is read from
    /// `scope`.
    pub fn finish(
        self,
        info: &DocumentInfo,
        compress: bool,
        scope: &ResourceScope,
    ) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut font_dict = Dictionary::new();
        for face in &self.fonts {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => Object::Name(face.base_font().as_bytes().to_vec()),
                "Encoding" => "WinAnsiEncoding",
            });
            font_dict.set(face.resource_name(), font_id);
        }
        let mut resources = dictionary! { "Font" => font_dict };
        if !self.images.is_empty() {
            let mut xobjects = Dictionary::new();
            for image in self.images {
                let name = image.name.clone();
                let data = scope
                    .get(&name)
                    .ok_or_else(|| RenderError::Pdf(format!("image resource {name} is missing")))?
                    .to_vec();
                let image_id = doc.add_object(image.into_stream(data));
                xobjects.set(name, image_id);
            }
            resources.set("XObject", xobjects);
        }
        let resources_id = doc.add_object(resources);

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for page in self.pages {
            let content = Content { operations: page.ops }.encode()?;
            let stream = if compress {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&content)?;
                Stream::new(dictionary! { "Filter" => "FlateDecode" }, encoder.finish()?)
            } else {
                Stream::new(dictionary! {}, content)
            };
            let content_id = doc.add_object(stream);

            let mut page_dict = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), self.width.into(), self.height.into()],
                "Contents" => content_id,
                "Resources" => resources_id,
            };
            if !page.links.is_empty() {
                let annots: Vec<Object> = page
                    .links
                    .into_iter()
                    .map(|(rect, uri)| {
                        let rect: Vec<Object> = rect.iter().map(|&v| v.into()).collect();
                        doc.add_object(dictionary! {
                            "Type" => "Annot",
                            "Subtype" => "Link",
                            "Rect" => rect,
                            "Border" => vec![0.into(), 0.into(), 0.into()],
                            "A" => dictionary! {
                                "Type" => "Action",
                                "S" => "URI",
                                "URI" => Object::String(uri.into_bytes(), StringFormat::Literal),
                            },
                        })
                        .into()
                    })
                    .collect();
                page_dict.set("Annots", annots);
            }
            kids.push(doc.add_object(page_dict).into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut info_dict = dictionary! {
            "Creator" => text_string(concat!("resume-render ", env!("CARGO_PKG_VERSION"))),
            "Producer" => text_string("lopdf"),
        };
        if !info.title.is_empty() {
            info_dict.set("Title", text_string(&info.title));
        }
        if !info.author.is_empty() {
            info_dict.set("Author", text_string(&info.author));
        }
        if !info.subject.is_empty() {
            info_dict.set("Subject", text_string(&info.subject));
        }
        if let Some(modified) = info.modified {
            let stamp = modified.format("D:%Y%m%d%H%M%SZ").to_string();
            info_dict.set("ModDate", Object::string_literal(stamp.clone()));
            info_dict.set("CreationDate", Object::string_literal(stamp));
        }
        let info_id = doc.add_object(info_dict);
        doc.trailer.set("Info", info_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)?;
        Ok(buffer)
    }
}

/// A PDF text string: literal for ASCII, UTF-16BE with a byte order mark
/// otherwise.
fn text_string(text: &str) -> Object {
    let text = strip_control_chars(text);
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::image::{self, fixtures};
    use crate::resource::ResourcePool;

    #[test]
    fn test_text_string_encoding() {
        assert_eq!(
            text_string("Ada"),
            Object::String(b"Ada".to_vec(), StringFormat::Literal)
        );
        match text_string("Zoë") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(&bytes[..2], &[0xFE, 0xFF]);
                assert_eq!(bytes.len(), 2 + 3 * 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_pages_grow_on_demand() {
        let mut canvas = Canvas::new(612.0, 792.0);
        assert_eq!(canvas.page_count(), 1);
        canvas.fill_rect(2, 0.0, 0.0, 10.0, 10.0, Color::BLACK);
        assert_eq!(canvas.page_count(), 3);
    }

    #[test]
    fn test_text_string_strips_controls() {
        assert_eq!(
            text_string("Bad\u{1}Title"),
            Object::String(b"BadTitle".to_vec(), StringFormat::Literal)
        );
    }

    #[test]
    fn test_finish_writes_pdf() {
        let canvas = Canvas::new(612.0, 792.0);
        let scope = ResourcePool::new().scope();
        let bytes = canvas.finish(&DocumentInfo::default(), true, &scope).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"));
    }

    #[test]
    fn test_image_stream_is_registered_data() {
        let jpeg = fixtures::jpeg();
        let mut scope = ResourcePool::new().scope();
        let name = scope.register("Im", jpeg.clone());

        let mut canvas = Canvas::new(612.0, 792.0);
        canvas.add_image(ImageObject {
            name,
            info: image::probe(&jpeg).unwrap(),
        });
        let bytes = canvas.finish(&DocumentInfo::default(), false, &scope).unwrap();

        assert!(bytes.windows(jpeg.len()).any(|w| w == jpeg.as_slice()));
        assert!(bytes.windows(10).any(|w| w == b"/DCTDecode"));
    }

    #[test]
    fn test_missing_image_resource_is_an_error() {
        let jpeg = fixtures::jpeg();
        let mut canvas = Canvas::new(612.0, 792.0);
        canvas.add_image(ImageObject {
            name: "Im1".into(),
            info: image::probe(&jpeg).unwrap(),
        });
        let scope = ResourcePool::new().scope();
        assert!(canvas.finish(&DocumentInfo::default(), false, &scope).is_err());
    }
}
