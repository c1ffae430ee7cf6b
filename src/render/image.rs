//! Profile image decoding and header probing.
//!
//! Images are embedded as stored; nothing here decodes pixels.

use crate::error::RenderError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Container format of an embedded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }
}

/// Color model of the stored samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorModel {
    Gray,
    Rgb,
    Cmyk,
    /// Palette of RGB triples.
    Indexed(Vec<u8>),
    /// Any model with an alpha channel.
    WithAlpha,
}

impl ColorModel {
    pub fn components(&self) -> u8 {
        match self {
            ColorModel::Gray | ColorModel::Indexed(_) => 1,
            ColorModel::Rgb => 3,
            ColorModel::Cmyk => 4,
            ColorModel::WithAlpha => 0,
        }
    }
}

/// What the header of an image says about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub color: ColorModel,
    pub bits_per_component: u8,
    pub interlaced: bool,
}

impl ImageInfo {
    /// Whether the samples can go into a PDF image without re-encoding.
    pub fn pdf_embeddable(&self) -> bool {
        match self.format {
            ImageFormat::Jpeg => self.color != ColorModel::WithAlpha,
            ImageFormat::Png => {
                !self.interlaced
                    && self.bits_per_component == 8
                    && matches!(
                        self.color,
                        ColorModel::Gray | ColorModel::Rgb | ColorModel::Indexed(_)
                    )
            }
        }
    }

    /// Height divided by width.
    pub fn aspect(&self) -> f32 {
        if self.width == 0 {
            1.0
        } else {
            self.height as f32 / self.width as f32
        }
    }
}

/// Decode a `data:` URL or bare base64 into bytes.
pub fn decode_source(source: &str) -> Result<Vec<u8>, RenderError> {
    let source = source.trim();
    let payload = match source.strip_prefix("data:") {
        Some(rest) => {
            let (header, data) = rest
                .split_once(',')
                .ok_or_else(|| RenderError::Image("data URL without payload".into()))?;
            if !header.ends_with(";base64") {
                return Err(RenderError::Image(format!(
                    "unsupported data URL encoding: {header}"
                )));
            }
            data
        }
        None => source,
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| RenderError::Image(format!("invalid base64: {e}")))
}

/// Identify the format and read the header fields.
pub fn probe(bytes: &[u8]) -> Result<ImageInfo, RenderError> {
    if bytes.starts_with(PNG_SIGNATURE) {
        probe_png(bytes)
    } else if bytes.starts_with(&[0xFF, 0xD8]) {
        probe_jpeg(bytes)
    } else {
        Err(RenderError::Image("unrecognized image format".into()))
    }
}

fn be_u16(bytes: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_be_bytes(bytes.get(at..at + 2)?.try_into().ok()?))
}

fn be_u32(bytes: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_be_bytes(bytes.get(at..at + 4)?.try_into().ok()?))
}

fn truncated(format: &str) -> RenderError {
    RenderError::Image(format!("truncated {format} data"))
}

/// Iterate over PNG chunks as `(type, data)`.
fn png_chunks<'a>(
    bytes: &'a [u8],
) -> impl Iterator<Item = Result<(&'a [u8], &'a [u8]), RenderError>> + 'a {
    let mut pos = PNG_SIGNATURE.len();
    std::iter::from_fn(move || {
        if pos >= bytes.len() {
            return None;
        }
        let chunk = (|| {
            let len = be_u32(bytes, pos)? as usize;
            let kind = bytes.get(pos + 4..pos + 8)?;
            let data = bytes.get(pos + 8..(pos + 8).checked_add(len)?)?;
            Some((kind, data, pos + 12 + len))
        })();
        match chunk {
            Some((kind, data, next)) => {
                pos = next;
                Some(Ok((kind, data)))
            }
            None => {
                pos = bytes.len();
                Some(Err(truncated("PNG")))
            }
        }
    })
}

fn probe_png(bytes: &[u8]) -> Result<ImageInfo, RenderError> {
    let mut header = None;
    let mut palette = None;
    for chunk in png_chunks(bytes) {
        let (kind, data) = chunk?;
        match kind {
            b"IHDR" => header = Some(data),
            b"PLTE" => palette = Some(data.to_vec()),
            b"IDAT" | b"IEND" => break,
            _ => {}
        }
    }
    let ihdr = header.ok_or_else(|| RenderError::Image("PNG without IHDR".into()))?;
    if ihdr.len() < 13 {
        return Err(truncated("PNG"));
    }

    let color = match ihdr[9] {
        0 => ColorModel::Gray,
        2 => ColorModel::Rgb,
        3 => ColorModel::Indexed(
            palette.ok_or_else(|| RenderError::Image("indexed PNG without palette".into()))?,
        ),
        4 | 6 => ColorModel::WithAlpha,
        other => return Err(RenderError::Image(format!("invalid PNG color type {other}"))),
    };

    Ok(ImageInfo {
        format: ImageFormat::Png,
        width: be_u32(ihdr, 0).ok_or_else(|| truncated("PNG"))?,
        height: be_u32(ihdr, 4).ok_or_else(|| truncated("PNG"))?,
        color,
        bits_per_component: ihdr[8],
        interlaced: ihdr[12] != 0,
    })
}

/// Concatenated IDAT payload: the zlib stream of filtered scanlines.
pub fn png_image_data(bytes: &[u8]) -> Result<Vec<u8>, RenderError> {
    let mut data = Vec::new();
    for chunk in png_chunks(bytes) {
        let (kind, chunk) = chunk?;
        match kind {
            b"IDAT" => data.extend_from_slice(chunk),
            b"IEND" => break,
            _ => {}
        }
    }
    if data.is_empty() {
        return Err(RenderError::Image("PNG without image data".into()));
    }
    Ok(data)
}

fn probe_jpeg(bytes: &[u8]) -> Result<ImageInfo, RenderError> {
    let mut pos = 2;
    loop {
        // Skip fill bytes before the marker code.
        while bytes.get(pos) == Some(&0xFF) && bytes.get(pos + 1) == Some(&0xFF) {
            pos += 1;
        }
        if bytes.get(pos) != Some(&0xFF) {
            return Err(truncated("JPEG"));
        }
        let marker = *bytes.get(pos + 1).ok_or_else(|| truncated("JPEG"))?;
        pos += 2;

        match marker {
            0xD8 | 0x01 | 0xD0..=0xD7 => continue,
            0xD9 | 0xDA => return Err(RenderError::Image("JPEG without frame header".into())),
            // SOF0..SOF15, minus DHT, JPG and DAC.
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                let bits = *bytes.get(pos + 2).ok_or_else(|| truncated("JPEG"))?;
                let height = be_u16(bytes, pos + 3).ok_or_else(|| truncated("JPEG"))?;
                let width = be_u16(bytes, pos + 5).ok_or_else(|| truncated("JPEG"))?;
                let components = *bytes.get(pos + 7).ok_or_else(|| truncated("JPEG"))?;
                let color = match components {
                    1 => ColorModel::Gray,
                    3 => ColorModel::Rgb,
                    4 => ColorModel::Cmyk,
                    n => {
                        return Err(RenderError::Image(format!(
                            "unsupported JPEG component count {n}"
                        )))
                    }
                };
                return Ok(ImageInfo {
                    format: ImageFormat::Jpeg,
                    width: width as u32,
                    height: height as u32,
                    color,
                    bits_per_component: bits,
                    interlaced: matches!(marker, 0xC2 | 0xC6 | 0xCA | 0xCE),
                });
            }
            _ => {
                let len = be_u16(bytes, pos).ok_or_else(|| truncated("JPEG"))? as usize;
                pos += len;
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn chunk(out: &mut Vec<u8>, kind: &[u8], data: &[u8]) {
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(kind);
        out.extend_from_slice(data);
        // CRC is not checked by the probe.
        out.extend_from_slice(&[0, 0, 0, 0]);
    }

    /// A 2x2 PNG of the given color type with unfiltered scanlines.
    pub fn png(color_type: u8) -> Vec<u8> {
        let channels = match color_type {
            2 => 3,
            6 => 4,
            _ => 1,
        };
        let mut raw = Vec::new();
        for _ in 0..2 {
            raw.push(0);
            raw.extend(std::iter::repeat(0x80).take(2 * channels));
        }
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw).unwrap();
        let idat = encoder.finish().unwrap();

        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&2u32.to_be_bytes());
        ihdr.extend_from_slice(&2u32.to_be_bytes());
        ihdr.extend_from_slice(&[8, color_type, 0, 0, 0]);

        let mut out = super::PNG_SIGNATURE.to_vec();
        chunk(&mut out, b"IHDR", &ihdr);
        if color_type == 3 {
            chunk(&mut out, b"PLTE", &[0x80, 0x80, 0x80]);
        }
        chunk(&mut out, b"IDAT", &idat);
        chunk(&mut out, b"IEND", &[]);
        out
    }

    /// Minimal baseline JPEG header: SOI, APP0, SOF0 (3x2, RGB), EOI.
    pub fn jpeg() -> Vec<u8> {
        let mut out = vec![0xFF, 0xD8];
        out.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00]);
        out.extend_from_slice(&[
            0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x02, 0x00, 0x03, 0x03, 0x01, 0x11, 0x00, 0x02,
            0x11, 0x01, 0x03, 0x11, 0x01,
        ]);
        out.extend_from_slice(&[0xFF, 0xD9]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    #[test]
    fn test_decode_data_url() {
        let encoded = STANDARD.encode(b"hello");
        let bytes = decode_source(&format!("data:image/png;base64,{encoded}")).unwrap();
        assert_eq!(bytes, b"hello");
        assert_eq!(decode_source(&encoded).unwrap(), b"hello");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_source("data:image/png;base64,!!!"), Err(RenderError::Image(_))));
        assert!(decode_source("data:image/svg+xml,<svg/>").is_err());
    }

    #[test]
    fn test_probe_png() {
        let info = probe(&fixtures::png(2)).unwrap();
        assert_eq!(info.format, ImageFormat::Png);
        assert_eq!((info.width, info.height), (2, 2));
        assert_eq!(info.color, ColorModel::Rgb);
        assert!(info.pdf_embeddable());
        assert!(!png_image_data(&fixtures::png(2)).unwrap().is_empty());
    }

    #[test]
    fn test_png_with_alpha_is_not_pdf_embeddable() {
        let info = probe(&fixtures::png(6)).unwrap();
        assert_eq!(info.color, ColorModel::WithAlpha);
        assert!(!info.pdf_embeddable());
    }

    #[test]
    fn test_indexed_png() {
        let info = probe(&fixtures::png(3)).unwrap();
        assert_eq!(info.color, ColorModel::Indexed(vec![0x80, 0x80, 0x80]));
        assert!(info.pdf_embeddable());
    }

    #[test]
    fn test_probe_jpeg() {
        let info = probe(&fixtures::jpeg()).unwrap();
        assert_eq!(info.format, ImageFormat::Jpeg);
        assert_eq!((info.width, info.height), (3, 2));
        assert_eq!(info.color, ColorModel::Rgb);
    }

    #[test]
    fn test_probe_rejects_unknown_and_truncated() {
        assert!(probe(b"GIF89a").is_err());
        assert!(probe(&[0xFF, 0xD8, 0xFF]).is_err());
        let png = fixtures::png(2);
        assert!(probe(&png[..20]).is_err());
    }
}
