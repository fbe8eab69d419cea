//! DOCX and legacy DOC decoders.
//!
//! A `.docx` file is a ZIP archive whose body text lives in
//! `word/document.xml`. Rather than pulling in a full archive crate for one
//! member, this walks the ZIP local file headers directly and inflates the
//! document part with `flate2` (raw deflate), then strips the WordprocessingML
//! markup. Legacy `.doc` binaries get a printable-run scan, which is enough to
//! surface keywords and IP addresses, which is all the pipeline needs.

use super::{Decoded, DecodeError, Decoder};
use flate2::read::DeflateDecoder;
use std::io::Read;
use std::path::Path;

pub struct DocxDecoder;

impl Decoder for DocxDecoder {
    fn decode(&self, path: &Path) -> Result<Decoded, DecodeError> {
        let bytes = std::fs::read(path)?;
        let xml = extract_zip_member(&bytes, b"word/document.xml").ok_or(DecodeError::NoText)?;
        let xml = String::from_utf8(xml).map_err(|_| DecodeError::Encoding)?;
        let text = strip_wordml(&xml);
        if text.trim().is_empty() {
            return Err(DecodeError::NoText);
        }
        Ok(Decoded {
            raw_text: text,
            structured: None,
        })
    }
}

/// Legacy binary `.doc` documents: no container to open, so collect
/// printable runs (both single-byte and UTF-16LE) from the raw bytes.
pub struct LegacyDocDecoder;

impl Decoder for LegacyDocDecoder {
    fn decode(&self, path: &Path) -> Result<Decoded, DecodeError> {
        let bytes = std::fs::read(path)?;
        let text = printable_runs(&bytes);
        if text.trim().is_empty() {
            return Err(DecodeError::NoText);
        }
        Ok(Decoded {
            raw_text: text,
            structured: None,
        })
    }
}

const ZIP_LOCAL_HEADER: &[u8] = &[0x50, 0x4b, 0x03, 0x04];

/// Walk ZIP local file headers looking for `member`; returns its
/// decompressed bytes. Handles stored (0) and deflate (8) methods, which is
/// all DOCX writers emit.
fn extract_zip_member(bytes: &[u8], member: &[u8]) -> Option<Vec<u8>> {
    let mut pos = 0;

    while pos + 30 <= bytes.len() {
        if &bytes[pos..pos + 4] != ZIP_LOCAL_HEADER {
            pos += 1;
            continue;
        }

        let method = u16_le(bytes, pos + 8)?;
        let compressed_size = u32_le(bytes, pos + 18)? as usize;
        let name_len = u16_le(bytes, pos + 26)? as usize;
        let extra_len = u16_le(bytes, pos + 28)? as usize;
        let name_start = pos + 30;
        let data_start = name_start + name_len + extra_len;
        if data_start > bytes.len() {
            return None;
        }
        let name = &bytes[name_start..name_start + name_len];

        if name == member {
            let data = if compressed_size > 0 {
                bytes.get(data_start..data_start + compressed_size)?
            } else {
                // Streaming writers defer sizes to a data descriptor; let the
                // deflate stream find its own end.
                &bytes[data_start..]
            };
            return match method {
                0 => Some(data.to_vec()),
                8 => {
                    let mut out = Vec::new();
                    DeflateDecoder::new(data).read_to_end(&mut out).ok()?;
                    Some(out)
                }
                _ => None,
            };
        }

        // Skip past this member; with unknown sizes, resync on the next
        // header signature.
        pos = if compressed_size > 0 {
            data_start + compressed_size
        } else {
            data_start
        };
    }

    None
}

fn u16_le(bytes: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_le_bytes([*bytes.get(at)?, *bytes.get(at + 1)?]))
}

fn u32_le(bytes: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_le_bytes([
        *bytes.get(at)?,
        *bytes.get(at + 1)?,
        *bytes.get(at + 2)?,
        *bytes.get(at + 3)?,
    ]))
}

/// Strip WordprocessingML down to readable text: paragraph ends become
/// newlines, remaining tags become spaces.
fn strip_wordml(xml: &str) -> String {
    let with_breaks = xml.replace("</w:p>", "\n");
    let text = crate::decode::html::strip_tags(&with_breaks);
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collect printable runs of at least four characters from raw bytes,
/// treating both single-byte text and ASCII-range UTF-16LE.
fn printable_runs(bytes: &[u8]) -> String {
    const MIN_RUN: usize = 4;
    let mut out = String::new();

    let mut run = String::new();
    for &b in bytes {
        if (0x20..0x7f).contains(&b) || b == b'\n' {
            run.push(b as char);
        } else if b != 0 {
            // NULs are tolerated inside a run so UTF-16LE ASCII text
            // ("t\0e\0x\0t\0") survives as a single run.
            if run.trim().len() >= MIN_RUN {
                out.push_str(run.trim());
                out.push('\n');
            }
            run.clear();
        }
    }
    if run.trim().len() >= MIN_RUN {
        out.push_str(run.trim());
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::DeflateEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Build a minimal ZIP with a single deflated member.
    fn zip_with_member(name: &[u8], content: &[u8]) -> Vec<u8> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(content).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut zip = Vec::new();
        zip.extend_from_slice(ZIP_LOCAL_HEADER);
        zip.extend_from_slice(&20u16.to_le_bytes()); // version needed
        zip.extend_from_slice(&0u16.to_le_bytes()); // flags
        zip.extend_from_slice(&8u16.to_le_bytes()); // method: deflate
        zip.extend_from_slice(&0u32.to_le_bytes()); // mod time/date
        zip.extend_from_slice(&0u32.to_le_bytes()); // crc32 (unchecked)
        zip.extend_from_slice(&(compressed.len() as u32).to_le_bytes());
        zip.extend_from_slice(&(content.len() as u32).to_le_bytes());
        zip.extend_from_slice(&(name.len() as u16).to_le_bytes());
        zip.extend_from_slice(&0u16.to_le_bytes()); // extra len
        zip.extend_from_slice(name);
        zip.extend_from_slice(&compressed);
        zip
    }

    const DOC_XML: &[u8] = b"<?xml version=\"1.0\"?><w:document><w:body>\
<w:p><w:r><w:t>Security alert: password reset requested</w:t></w:r></w:p>\
<w:p><w:r><w:t>from 203.0.113.9 on December 24, 2024</w:t></w:r></w:p>\
</w:body></w:document>";

    #[test]
    fn test_docx_member_extraction() {
        let zip = zip_with_member(b"word/document.xml", DOC_XML);
        let xml = extract_zip_member(&zip, b"word/document.xml").unwrap();
        assert_eq!(xml, DOC_XML);
    }

    #[test]
    fn test_docx_decode() {
        let mut temp = NamedTempFile::with_suffix(".docx").unwrap();
        temp.write_all(&zip_with_member(b"word/document.xml", DOC_XML))
            .unwrap();
        temp.flush().unwrap();

        let decoded = DocxDecoder.decode(temp.path()).unwrap();
        assert!(decoded.raw_text.contains("password reset"));
        assert!(decoded.raw_text.contains("203.0.113.9"));
        // Paragraphs land on separate lines.
        assert!(decoded.raw_text.contains('\n'));
    }

    #[test]
    fn test_docx_without_document_xml_is_no_text() {
        let mut temp = NamedTempFile::with_suffix(".docx").unwrap();
        temp.write_all(&zip_with_member(b"other.xml", b"<a>x</a>"))
            .unwrap();
        temp.flush().unwrap();

        let err = DocxDecoder.decode(temp.path()).unwrap_err();
        assert!(matches!(err, DecodeError::NoText));
    }

    #[test]
    fn test_legacy_doc_printable_runs() {
        // UTF-16LE "failed login" amid binary noise.
        let mut bytes = vec![0xd0, 0xcf, 0x11, 0xe0, 0x01, 0x02];
        for ch in "failed login from 10.0.0.5".encode_utf16() {
            bytes.extend_from_slice(&ch.to_le_bytes());
        }
        bytes.extend_from_slice(&[0x03, 0x04]);

        let mut temp = NamedTempFile::with_suffix(".doc").unwrap();
        temp.write_all(&bytes).unwrap();
        temp.flush().unwrap();

        let decoded = LegacyDocDecoder.decode(temp.path()).unwrap();
        assert!(decoded.raw_text.contains("failed login from 10.0.0.5"));
    }
}
