//! Plain-text decoder.

use super::{read_utf8, Decoded, DecodeError, Decoder};
use std::path::Path;

/// `.txt` documents: raw text only, no structure.
pub struct TextDecoder;

impl Decoder for TextDecoder {
    fn decode(&self, path: &Path) -> Result<Decoded, DecodeError> {
        Ok(Decoded {
            raw_text: read_utf8(path)?,
            structured: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_plain_text() {
        let mut temp = NamedTempFile::with_suffix(".txt").unwrap();
        write!(temp, "support ticket about suspicious activity").unwrap();
        temp.flush().unwrap();

        let decoded = TextDecoder.decode(temp.path()).unwrap();
        assert!(decoded.raw_text.contains("suspicious activity"));
        assert!(decoded.structured.is_none());
    }
}
