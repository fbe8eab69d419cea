//! Best-effort PDF text decoder.
//!
//! Exports and support correspondence arrive as PDFs whose page text lives in
//! FlateDecode content streams as literal-string operands (`(...) Tj`,
//! `[(...) ...] TJ`). This decoder inflates each `stream`/`endstream` body
//! with `flate2`, then collects literal strings from streams that contain a
//! text block (`BT`). Encrypted or image-only PDFs yield
//! [`DecodeError::NoText`] and are skipped by the pipeline with a warning;
//! full fidelity is not the goal, recovering keyword and IP evidence is.

use super::{Decoded, DecodeError, Decoder};
use flate2::read::ZlibDecoder;
use std::io::Read;
use std::path::Path;

pub struct PdfDecoder;

impl Decoder for PdfDecoder {
    fn decode(&self, path: &Path) -> Result<Decoded, DecodeError> {
        let bytes = std::fs::read(path)?;
        let text = extract_text(&bytes);
        if text.trim().is_empty() {
            return Err(DecodeError::NoText);
        }
        Ok(Decoded {
            raw_text: text,
            structured: None,
        })
    }
}

/// Pull text from every content stream in the document.
fn extract_text(bytes: &[u8]) -> String {
    let mut out = String::new();

    for stream in find_streams(bytes) {
        let data = inflate(stream).unwrap_or_else(|| stream.to_vec());
        // Only streams with a text block carry page text; anything else is
        // image data or font programs.
        if contains(&data, b"BT") {
            collect_literals(&data, &mut out);
        }
    }

    out
}

/// Locate the body of each `stream` ... `endstream` section.
fn find_streams(bytes: &[u8]) -> Vec<&[u8]> {
    let mut sections = Vec::new();
    let mut pos = 0;

    while let Some(start) = find_from(bytes, b"stream", pos) {
        let mut data_start = start + b"stream".len();
        // EOL after the stream keyword: CRLF or LF.
        if bytes.get(data_start) == Some(&b'\r') {
            data_start += 1;
        }
        if bytes.get(data_start) == Some(&b'\n') {
            data_start += 1;
        }
        let Some(end) = find_from(bytes, b"endstream", data_start) else {
            break;
        };
        sections.push(&bytes[data_start..end]);
        pos = end + b"endstream".len();
    }

    sections
}

fn inflate(data: &[u8]) -> Option<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).ok()?;
    Some(out)
}

/// Collect PDF literal strings `(...)`, honoring escapes and balanced
/// nesting, and skipping anything with embedded control bytes (binary noise
/// that happens to sit between parentheses).
fn collect_literals(data: &[u8], out: &mut String) {
    let mut i = 0;
    while i < data.len() {
        if data[i] != b'(' {
            i += 1;
            continue;
        }

        let mut literal = Vec::new();
        let mut depth = 1;
        i += 1;
        while i < data.len() && depth > 0 {
            match data[i] {
                b'\\' if i + 1 < data.len() => {
                    match data[i + 1] {
                        b'n' => literal.push(b'\n'),
                        b'r' | b't' => literal.push(b' '),
                        b'(' => literal.push(b'('),
                        b')' => literal.push(b')'),
                        b'\\' => literal.push(b'\\'),
                        // Octal escapes and line continuations are dropped.
                        _ => {}
                    }
                    i += 2;
                }
                b'(' => {
                    depth += 1;
                    literal.push(b'(');
                    i += 1;
                }
                b')' => {
                    depth -= 1;
                    if depth > 0 {
                        literal.push(b')');
                    }
                    i += 1;
                }
                byte => {
                    literal.push(byte);
                    i += 1;
                }
            }
        }

        if let Ok(text) = String::from_utf8(literal) {
            if !text.is_empty() && text.chars().all(|c| !c.is_control() || c == '\n') {
                out.push_str(&text);
                out.push(' ');
            }
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    find_from(haystack, needle, 0).is_some()
}

fn find_from(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Minimal one-page PDF body with a flate-compressed content stream.
    fn sample_pdf(page_text: &str) -> Vec<u8> {
        let content = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", page_text);
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(content.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut pdf = Vec::new();
        pdf.extend_from_slice(b"%PDF-1.4\n");
        pdf.extend_from_slice(
            format!(
                "4 0 obj << /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            )
            .as_bytes(),
        );
        pdf.extend_from_slice(&compressed);
        pdf.extend_from_slice(b"\nendstream\nendobj\n%%EOF\n");
        pdf
    }

    #[test]
    fn test_flate_stream_text_recovered() {
        let pdf = sample_pdf("Suspicious activity from 203.0.113.9");
        let text = extract_text(&pdf);
        assert!(text.contains("Suspicious activity from 203.0.113.9"));
    }

    #[test]
    fn test_escaped_parens() {
        let data = b"BT (alert \\(unauthorized\\)) Tj ET";
        let mut out = String::new();
        collect_literals(data, &mut out);
        assert!(out.contains("alert (unauthorized)"));
    }

    #[test]
    fn test_no_text_is_error() {
        let mut temp = NamedTempFile::with_suffix(".pdf").unwrap();
        temp.write_all(b"%PDF-1.4\n%%EOF\n").unwrap();
        temp.flush().unwrap();

        let err = PdfDecoder.decode(temp.path()).unwrap_err();
        assert!(matches!(err, DecodeError::NoText));
    }

    #[test]
    fn test_decode_file_end_to_end() {
        let mut temp = NamedTempFile::with_suffix(".pdf").unwrap();
        temp.write_all(&sample_pdf("password reset on December 24, 2024"))
            .unwrap();
        temp.flush().unwrap();

        let decoded = PdfDecoder.decode(temp.path()).unwrap();
        assert!(decoded.raw_text.contains("password reset"));
        assert!(decoded.structured.is_none());
    }
}
