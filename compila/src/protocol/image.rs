//! Rendered plot returned with a successful run (`imagen`, optional `tipo_imagen`).

use base64::Engine;
use serde::Serialize;

use crate::error::ProtocolError;

/// Base64 prefix of every GIF file (`GIF8`).
const GIF_B64_PREFIX: &str = "R0lGOD";
/// Base64 payloads longer than this are assumed to be animations when nothing else decides.
const ANIMATION_B64_LEN: usize = 200_000;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Static (PNG) or animated (GIF) plot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Png,
    Gif,
}

impl ImageKind {
    /// Parses a declared kind: `png`, `gif`, or a mime type such as `image/gif`.
    pub fn from_declared(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        let s = s.strip_prefix("image/").unwrap_or(&s);
        match s {
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.starts_with(PNG_MAGIC) {
            Some(Self::Png)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Gif => "image/gif",
        }
    }

    pub fn is_animated(self) -> bool {
        matches!(self, Self::Gif)
    }
}

/// Decoded image bytes plus the format they were decoded as.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Image {
    pub kind: ImageKind,
    pub size: usize,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Decodes the `imagen` field.
///
/// Accepts bare base64 or a `data:image/...;base64,` URL. Kind resolution order: declared
/// `tipo_imagen`, data-URL mime, magic bytes, then the length/prefix heuristic on the text.
pub fn decode_image(encoded: &str, declared: Option<&str>) -> Result<Image, ProtocolError> {
    let encoded = encoded.trim();
    let (url_kind, payload) = match encoded.strip_prefix("data:") {
        Some(rest) => {
            let (meta, data) = rest
                .split_once(',')
                .ok_or_else(|| ProtocolError::InvalidImage("data url without payload".to_string()))?;
            let mime = meta.split(';').next().unwrap_or_default();
            (ImageKind::from_declared(mime), data)
        }
        None => (None, encoded),
    };

    let cleaned: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| ProtocolError::InvalidImage(e.to_string()))?;

    let kind = declared
        .and_then(ImageKind::from_declared)
        .or(url_kind)
        .or_else(|| ImageKind::sniff(&bytes))
        .unwrap_or_else(|| {
            if cleaned.starts_with(GIF_B64_PREFIX) || cleaned.len() > ANIMATION_B64_LEN {
                ImageKind::Gif
            } else {
                ImageKind::Png
            }
        });

    Ok(Image {
        kind,
        size: bytes.len(),
        bytes,
    })
}
