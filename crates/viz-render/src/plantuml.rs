//! PlantUML remote-server source encoding.
//!
//! The server expects the diagram source deflated (raw, no zlib header) and
//! encoded with PlantUML's own base64 variant, appended to a `/png/` URL.

use std::io::Write;

use flate2::Compression;
use flate2::write::DeflateEncoder;

/// PlantUML's base64 variant. Note the alphabet differs from RFC 4648 in
/// both ordering and the last two characters.
const ALPHABET: &[u8; 64] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";

/// Wraps bare source in `@startuml`/`@enduml` markers. Source that already
/// carries a start marker is passed through untouched.
#[must_use]
pub fn canonicalize(source: &str) -> String {
    let trimmed = source.trim();
    if trimmed.contains("@startuml") {
        trimmed.to_owned()
    } else {
        format!("@startuml\n{trimmed}\n@enduml")
    }
}

/// Builds the PNG URL for `source` against `server` (no trailing slash
/// required).
pub fn diagram_url(server: &str, source: &str) -> Result<String, std::io::Error> {
    let canonical = canonicalize(source);
    let deflated = deflate_raw(canonical.as_bytes())?;
    let server = server.trim_end_matches('/');
    Ok(format!("{server}/png/{}", encode64(&deflated)))
}

fn deflate_raw(input: &[u8]) -> Result<Vec<u8>, std::io::Error> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(9));
    encoder.write_all(input)?;
    encoder.finish()
}

/// Encodes `data` in PlantUML base64. Trailing partial groups are
/// zero-padded to a full four characters, matching the reference encoder.
#[must_use]
pub fn encode64(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(3) * 4);
    let mut i = 0;
    while i < data.len() {
        let b1 = data[i];
        let b2 = data.get(i + 1).copied().unwrap_or(0);
        let b3 = data.get(i + 2).copied().unwrap_or(0);
        for c in [
            b1 >> 2,
            ((b1 & 0x03) << 4) | (b2 >> 4),
            ((b2 & 0x0f) << 2) | (b3 >> 6),
            b3 & 0x3f,
        ] {
            out.push(ALPHABET[usize::from(c)] as char);
        }
        i += 3;
    }
    out
}
