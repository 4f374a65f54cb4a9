//! Asset inlining.
//!
//! The exported script must not reach the network, so every image URL is
//! turned into a `data:` URI. URLs are classified first; anything that is
//! not already a data URI is fetched through the caller's [`AssetSource`],
//! sniffed for its MIME type and base64-encoded.

use crate::error::{ExportError, ExportResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use std::collections::HashMap;
use winnow::combinator::{preceded, repeat, terminated};
use winnow::prelude::*;
use winnow::token::{rest, take_till, take_while};

/// What an image URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetUrl<'a> {
    Data {
        mime: &'a str,
        base64: bool,
        payload: &'a str,
    },
    Blob,
    /// Any other scheme (`http`, `https`, `file`, ...).
    Remote { scheme: &'a str },
    /// No scheme: resolved by the host against its own base.
    Relative,
    /// A `data:` URL without its `,` separator.
    Invalid,
}

impl AssetUrl<'_> {
    pub fn is_embedded(&self) -> bool {
        matches!(self, AssetUrl::Data { .. })
    }
}

// ─── URL classification ─────────────────────────────────────────────────

fn parse_scheme<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    terminated(
        take_while(1.., |c: char| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
        ':',
    )
    .parse_next(input)
}

fn parse_data_body<'a>(input: &mut &'a str) -> ModalResult<AssetUrl<'a>> {
    let mime = take_till(0.., |c: char| c == ';' || c == ',').parse_next(input)?;
    let params: Vec<&str> =
        repeat(0.., preceded(';', take_till(0.., |c: char| c == ';' || c == ','))).parse_next(input)?;
    let _ = ','.parse_next(input)?;
    let payload = rest.parse_next(input)?;
    Ok(AssetUrl::Data {
        mime: if mime.is_empty() { "text/plain" } else { mime },
        base64: params.iter().any(|p| p.trim().eq_ignore_ascii_case("base64")),
        payload,
    })
}

/// Classify an image URL.
pub fn classify(url: &str) -> AssetUrl<'_> {
    let mut input = url.trim();
    match parse_scheme.parse_next(&mut input) {
        Ok(scheme) if scheme.eq_ignore_ascii_case("data") => {
            parse_data_body.parse_next(&mut input).unwrap_or(AssetUrl::Invalid)
        }
        Ok(scheme) if scheme.eq_ignore_ascii_case("blob") => AssetUrl::Blob,
        // A single letter is a Windows drive, not a scheme.
        Ok(scheme) if scheme.len() > 1 => AssetUrl::Remote { scheme },
        _ => AssetUrl::Relative,
    }
}

// ─── Fetching and encoding ──────────────────────────────────────────────

/// Bytes behind non-embedded URLs, supplied by the host.
pub trait AssetSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, String>;
}

impl AssetSource for HashMap<String, Vec<u8>> {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, String> {
        self.get(url).cloned().ok_or_else(|| "not provided by the host".to_string())
    }
}

/// Source with nothing in it. Exports succeed only if every URL is embedded already.
pub struct NoAssets;

impl AssetSource for NoAssets {
    fn fetch(&self, _url: &str) -> Result<Vec<u8>, String> {
        Err("no asset source".to_string())
    }
}

/// MIME type from magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    if bytes.starts_with(PNG) {
        return Some("image/png");
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    if bytes.starts_with(b"BM") {
        return Some("image/bmp");
    }
    if bytes.starts_with(&[0x00, 0x00, 0x01, 0x00]) {
        return Some("image/x-icon");
    }
    let text = std::str::from_utf8(&bytes[..bytes.len().min(256)]).ok()?;
    let text = text.trim_start_matches('\u{feff}').trim_start();
    (text.starts_with("<svg") || text.starts_with("<?xml")).then_some("image/svg+xml")
}

fn is_image_mime(mime: &str) -> bool {
    mime.trim()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

/// Encode raw image bytes as a data URI.
pub fn encode_data_uri(url: &str, bytes: &[u8]) -> ExportResult<String> {
    let mime = sniff_mime(bytes).ok_or_else(|| ExportError::Asset {
        url: url.to_string(),
        reason: "unrecognized image format".to_string(),
    })?;
    Ok(format!("data:{mime};base64,{}", BASE64_STANDARD.encode(bytes)))
}

/// Inlines URLs through one source, fetching each URL at most once.
pub struct AssetInliner<'s> {
    source: &'s dyn AssetSource,
    cache: HashMap<String, String>,
}

impl<'s> AssetInliner<'s> {
    pub fn new(source: &'s dyn AssetSource) -> Self {
        Self {
            source,
            cache: HashMap::new(),
        }
    }

    pub fn inline(&mut self, url: &str) -> ExportResult<String> {
        if let Some(uri) = self.cache.get(url) {
            return Ok(uri.clone());
        }
        let uri = match classify(url) {
            AssetUrl::Data { mime, .. } if is_image_mime(mime) => url.trim().to_string(),
            AssetUrl::Data { mime, .. } => {
                return Err(ExportError::Asset {
                    url: url.to_string(),
                    reason: format!("data URL of type {mime} is not an image"),
                });
            }
            AssetUrl::Invalid => {
                return Err(ExportError::Asset {
                    url: url.to_string(),
                    reason: "malformed data URL".to_string(),
                });
            }
            AssetUrl::Blob => {
                let bytes = self.source.fetch(url).map_err(|_| ExportError::UnresolvedBlob {
                    url: url.to_string(),
                })?;
                encode_data_uri(url, &bytes)?
            }
            AssetUrl::Remote { .. } | AssetUrl::Relative => {
                let bytes = self.source.fetch(url).map_err(|reason| ExportError::Asset {
                    url: url.to_string(),
                    reason,
                })?;
                encode_data_uri(url, &bytes)?
            }
        };
        log::debug!("inlined {url} ({} bytes)", uri.len());
        self.cache.insert(url.to_string(), uri.clone());
        Ok(uri)
    }

    /// Number of distinct URLs inlined so far.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

    #[test]
    fn classifies_common_urls() {
        assert_eq!(
            classify("data:image/png;base64,iVBOR"),
            AssetUrl::Data {
                mime: "image/png",
                base64: true,
                payload: "iVBOR"
            }
        );
        assert_eq!(
            classify("data:,hello"),
            AssetUrl::Data {
                mime: "text/plain",
                base64: false,
                payload: "hello"
            }
        );
        assert_eq!(classify("data:image/png;base64"), AssetUrl::Invalid);
        assert_eq!(classify("blob:https://app/1234"), AssetUrl::Blob);
        assert_eq!(classify("HTTPS://cdn/x.png"), AssetUrl::Remote { scheme: "HTTPS" });
        assert_eq!(classify("/static/x.png"), AssetUrl::Relative);
        assert_eq!(classify("C:/images/x.png"), AssetUrl::Relative);
    }

    #[test]
    fn sniffs_magic_bytes() {
        assert_eq!(sniff_mime(PNG_HEADER), Some("image/png"));
        assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_mime(b"GIF89a...."), Some("image/gif"));
        assert_eq!(sniff_mime(b"RIFF\x10\x00\x00\x00WEBPVP8 "), Some("image/webp"));
        assert_eq!(sniff_mime(b"  <svg xmlns='...'/>"), Some("image/svg+xml"));
        assert_eq!(sniff_mime(b"hello"), None);
    }

    #[test]
    fn fetched_urls_become_data_uris_once() {
        let source = HashMap::from([("logo.png".to_string(), PNG_HEADER.to_vec())]);
        let mut inliner = AssetInliner::new(&source);
        let uri = inliner.inline("logo.png").expect("known asset");
        assert!(uri.starts_with("data:image/png;base64,iVBORw0KGgo"));
        assert_eq!(inliner.inline("logo.png").expect("cached"), uri);
        assert_eq!(inliner.len(), 1);
    }

    #[test]
    fn embedded_urls_pass_through() {
        let mut inliner = AssetInliner::new(&NoAssets);
        let url = "data:image/gif;base64,R0lGOD";
        assert_eq!(inliner.inline(url).expect("already embedded"), url);
    }

    #[test]
    fn non_image_data_urls_are_refused() {
        let mut inliner = AssetInliner::new(&NoAssets);
        for url in ["data:text/html,<script>alert(1)</script>", "data:,plain"] {
            match inliner.inline(url) {
                Err(ExportError::Asset { reason, .. }) => assert!(reason.contains("not an image"), "{reason}"),
                other => panic!("expected refusal for {url}, got {other:?}"),
            }
        }
        assert!(inliner.inline("data:IMAGE/SVG+XML;base64,PHN2Zy8+").is_ok());
        assert_eq!(inliner.len(), 1);
    }

    #[test]
    fn unresolvable_urls_fail_loudly() {
        let mut inliner = AssetInliner::new(&NoAssets);
        assert!(matches!(
            inliner.inline("blob:https://app/1"),
            Err(ExportError::UnresolvedBlob { .. })
        ));
        assert!(matches!(
            inliner.inline("https://cdn/x.png"),
            Err(ExportError::Asset { .. })
        ));
    }
}
