use super::ResponseChunk;
use crate::{Error, Result};

/// The only frame type the endpoint emits that carries a payload.
pub const DATA_PREFIX: &str = "data:";

/// Decodes one newline-delimited frame of a streaming response.
///
/// Returns `Ok(None)` for frames without the `data:` prefix (keep-alives,
/// comments, blank separators). A `data:` frame whose payload is not valid
/// JSON is an error.
pub fn decode_frame(raw: &[u8]) -> Result<Option<ResponseChunk>> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| Error::decode(format!("frame is not valid UTF-8: {}", e)))?;

    match text.trim().strip_prefix(DATA_PREFIX) {
        Some(payload) => Ok(Some(serde_json::from_str(payload)?)),
        None => Ok(None),
    }
}
