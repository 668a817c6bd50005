#[cfg(test)]
#[path = "decoder_test.rs"]
mod tests;

const REPLACEMENT: char = '\u{FFFD}';

/// Incremental UTF-8 decoder. A multi-byte character split across two chunks
/// is held back until its remaining bytes arrive.
#[derive(Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut decoded = String::new();

        loop {
            let (valid_up_to, invalid_len) = match std::str::from_utf8(&self.pending) {
                Ok(_) => (self.pending.len(), None),
                Err(err) => (err.valid_up_to(), err.error_len()),
            };

            let valid = self.pending.drain(..valid_up_to).collect::<Vec<u8>>();
            decoded.push_str(&String::from_utf8_lossy(&valid));

            match invalid_len {
                Some(len) => {
                    // Invalid sequence, not a split one.
                    self.pending.drain(..len);
                    decoded.push(REPLACEMENT);
                }
                None => break,
            }
        }

        return decoded;
    }

    /// Flushes whatever is still held back once the stream has ended. A
    /// truncated character becomes U+FFFD instead of disappearing.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return "".to_string();
        }

        self.pending.clear();
        return REPLACEMENT.to_string();
    }

    pub fn has_pending(&self) -> bool {
        return !self.pending.is_empty();
    }
}
