//! Per-format document decoders behind a single `decode` contract.
//!
//! Each supported format implements [`Decoder`], producing raw text plus an
//! optional already-parsed structure. Selection is a dispatch table keyed on
//! file extension; the core never inspects bytes to guess a format.
//!
//! Decode failures are per-document: the pipeline records the reason and
//! moves on, so one malformed file never aborts a batch.

use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

pub mod docx;
pub mod html;
pub mod json;
pub mod pdf;
pub mod text;

/// A single document failed to decode. Distinct from "decoded fine but no
/// evidence found", which is not an error.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("file is not valid UTF-8 text")]
    Encoding,
    #[error("no extractable text in document")]
    NoText,
}

/// Output of every decoder: the document as plain text, plus the parsed
/// structure when the format has one.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub raw_text: String,
    pub structured: Option<Value>,
}

/// Capability interface implemented once per format.
pub trait Decoder: Sync {
    fn decode(&self, path: &Path) -> Result<Decoded, DecodeError>;
}

/// Recognized evidence document formats, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Json,
    Html,
    Pdf,
    Docx,
    /// Legacy binary Word documents; best-effort text-run scan only.
    Doc,
    Text,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "doc" => Some(Self::Doc),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Html => "HTML",
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Doc => "DOC",
            Self::Text => "TXT",
        }
    }

    /// Dispatch table entry for this format.
    pub fn decoder(self) -> &'static dyn Decoder {
        match self {
            Self::Json => &json::JsonDecoder,
            Self::Html => &html::HtmlDecoder,
            Self::Pdf => &pdf::PdfDecoder,
            Self::Docx => &docx::DocxDecoder,
            Self::Doc => &docx::LegacyDocDecoder,
            Self::Text => &text::TextDecoder,
        }
    }
}

/// Decode a file by its extension. `None` means the extension is not a
/// recognized evidence format (catalogued by the caller, not parsed).
pub fn decode_path(path: &Path) -> Option<Result<Decoded, DecodeError>> {
    let ext = path.extension()?.to_str()?;
    let format = DocumentFormat::from_extension(ext)?;
    Some(format.decoder().decode(path))
}

/// One file discovered under the evidence root.
#[derive(Debug, Clone)]
pub struct DiscoveredDocument {
    pub path: PathBuf,
    /// Path relative to the evidence root; used as the event `source`.
    pub source: String,
    pub format: DocumentFormat,
}

/// Result of scanning the evidence directory.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub documents: Vec<DiscoveredDocument>,
    /// Files with unrecognized extensions: catalogued, not parsed.
    pub unrecognized: Vec<PathBuf>,
}

/// Recursively scan the evidence directory, categorizing files by extension.
///
/// Output is sorted by source path so downstream processing order is stable.
pub fn scan_directory(root: &Path) -> std::io::Result<ScanResult> {
    let mut result = ScanResult::default();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path().to_path_buf();
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(DocumentFormat::from_extension);

        match format {
            Some(format) => {
                let source = path
                    .strip_prefix(root)
                    .unwrap_or(&path)
                    .to_string_lossy()
                    .into_owned();
                result.documents.push(DiscoveredDocument {
                    path,
                    source,
                    format,
                });
            }
            None => result.unrecognized.push(path),
        }
    }

    result.documents.sort_by(|a, b| a.source.cmp(&b.source));
    result.unrecognized.sort();
    Ok(result)
}

/// Read a file and require valid UTF-8.
pub(crate) fn read_utf8(path: &Path) -> Result<String, DecodeError> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).map_err(|_| DecodeError::Encoding)
}
