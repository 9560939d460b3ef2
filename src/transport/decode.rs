//! Incremental UTF-8 decoding
//!
//! Network chunk boundaries do not respect character boundaries. Bytes that
//! do not yet form a complete character are carried over and prefixed onto
//! the next chunk, never dropped or duplicated. This is purely a transform;
//! it knows nothing about turns or conversations.

use crate::error::ChatError;

/// Stateful decoder turning raw transport chunks into text fragments
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    carry: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk, prefixed by any bytes carried over from the last.
    ///
    /// Returns the decoded fragment, possibly empty when the chunk ends
    /// mid-character. Fails only on byte sequences that no amount of further
    /// input could complete.
    pub fn decode(&mut self, chunk: &[u8]) -> Result<String, ChatError> {
        let mut bytes = std::mem::take(&mut self.carry);
        bytes.extend_from_slice(chunk);

        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(err) => {
                let utf8 = err.utf8_error();
                if utf8.error_len().is_some() {
                    return Err(ChatError::decoding(
                        "Malformed UTF-8 in response stream",
                    ));
                }
                // Incomplete trailing character: hold it for the next chunk.
                let valid_up_to = utf8.valid_up_to();
                let mut bytes = err.into_bytes();
                self.carry = bytes.split_off(valid_up_to);
                String::from_utf8(bytes)
                    .map_err(|_| ChatError::decoding("Malformed UTF-8 in response stream"))
            }
        }
    }

    /// Signal end of stream. Fails when bytes are still held, since a
    /// character was cut off and can never complete.
    pub fn finish(&mut self) -> Result<(), ChatError> {
        if self.carry.is_empty() {
            Ok(())
        } else {
            self.carry.clear();
            Err(ChatError::decoding(
                "Response stream ended mid-character",
            ))
        }
    }
}
