//! Image type detection from leading bytes
//!
//! Recognizes the classic raster magic numbers plus the ISO-BMFF brands
//! used by HEIC files (which carry no fixed prefix, the brand sits at
//! offset 4 after the box size).

/// Detected image container type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageType {
    Jpeg,
    Png,
    Gif,
    Tiff,
    /// SGI image
    Rgb,
    Pbm,
    Pgm,
    Ppm,
    /// Sun raster
    Rast,
    Xbm,
    Bmp,
    Webp,
    Exr,
    Heic,
}

impl ImageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Tiff => "tiff",
            Self::Rgb => "rgb",
            Self::Pbm => "pbm",
            Self::Pgm => "pgm",
            Self::Ppm => "ppm",
            Self::Rast => "rast",
            Self::Xbm => "xbm",
            Self::Bmp => "bmp",
            Self::Webp => "webp",
            Self::Exr => "exr",
            Self::Heic => "heic",
        }
    }

    pub fn content_type(&self) -> String {
        format!("image/{}", self.as_str())
    }
}

const HEIC_BRANDS: [&[u8; 8]; 4] = [b"ftypheic", b"ftypheix", b"ftyphevc", b"ftyphevx"];

type Test = fn(&[u8]) -> Option<ImageType>;

const TESTS: [Test; 13] = [
    test_jpeg, test_png, test_gif, test_tiff, test_rgb, test_pbm, test_pgm, test_ppm,
    test_rast, test_xbm, test_bmp, test_webp, test_exr,
];

/// Identify the image type of `bytes`, or `None` if nothing matches
pub fn image_type_for_bytes(bytes: &[u8]) -> Option<ImageType> {
    let head = &bytes[..bytes.len().min(32)];
    if let Some(found) = TESTS.iter().find_map(|test| test(head)) {
        return Some(found);
    }

    if bytes.len() < 12 {
        return None;
    }
    if HEIC_BRANDS.iter().any(|brand| &bytes[4..12] == brand.as_slice()) {
        return Some(ImageType::Heic);
    }
    None
}

fn test_jpeg(h: &[u8]) -> Option<ImageType> {
    let marker = h.get(6..10);
    let is_jpeg = marker == Some(&b"JFIF"[..])
        || marker == Some(&b"Exif"[..])
        || h.starts_with(b"\xff\xd8\xff\xdb");
    is_jpeg.then_some(ImageType::Jpeg)
}

fn test_png(h: &[u8]) -> Option<ImageType> {
    h.starts_with(b"\x89PNG\r\n\x1a\n").then_some(ImageType::Png)
}

fn test_gif(h: &[u8]) -> Option<ImageType> {
    (h.starts_with(b"GIF87a") || h.starts_with(b"GIF89a")).then_some(ImageType::Gif)
}

fn test_tiff(h: &[u8]) -> Option<ImageType> {
    (h.starts_with(b"MM") || h.starts_with(b"II")).then_some(ImageType::Tiff)
}

fn test_rgb(h: &[u8]) -> Option<ImageType> {
    h.starts_with(b"\x01\xda").then_some(ImageType::Rgb)
}

/// Netpbm header: `P`, a variant digit, then whitespace
fn netpbm(h: &[u8], variants: &[u8; 2], kind: ImageType) -> Option<ImageType> {
    match h {
        [b'P', digit, space, ..]
            if variants.contains(digit) && b" \t\n\r".contains(space) =>
        {
            Some(kind)
        }
        _ => None,
    }
}

fn test_pbm(h: &[u8]) -> Option<ImageType> {
    netpbm(h, b"14", ImageType::Pbm)
}

fn test_pgm(h: &[u8]) -> Option<ImageType> {
    netpbm(h, b"25", ImageType::Pgm)
}

fn test_ppm(h: &[u8]) -> Option<ImageType> {
    netpbm(h, b"36", ImageType::Ppm)
}

fn test_rast(h: &[u8]) -> Option<ImageType> {
    h.starts_with(b"\x59\xa6\x6a\x95").then_some(ImageType::Rast)
}

fn test_xbm(h: &[u8]) -> Option<ImageType> {
    h.starts_with(b"#define ").then_some(ImageType::Xbm)
}

fn test_bmp(h: &[u8]) -> Option<ImageType> {
    h.starts_with(b"BM").then_some(ImageType::Bmp)
}

fn test_webp(h: &[u8]) -> Option<ImageType> {
    (h.starts_with(b"RIFF") && h.get(8..12) == Some(&b"WEBP"[..])).then_some(ImageType::Webp)
}

fn test_exr(h: &[u8]) -> Option<ImageType> {
    h.starts_with(b"\x76\x2f\x31\x01").then_some(ImageType::Exr)
}
