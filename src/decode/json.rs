//! JSON export decoder.

use super::{read_utf8, Decoded, DecodeError, Decoder};
use std::path::Path;

/// Decodes `.json` exports: the parsed structure feeds the walker, the raw
/// text feeds token scanning.
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    fn decode(&self, path: &Path) -> Result<Decoded, DecodeError> {
        let raw_text = read_utf8(path)?;
        let structured = serde_json::from_str(&raw_text)?;
        Ok(Decoded {
            raw_text,
            structured: Some(structured),
        })
    }
}
