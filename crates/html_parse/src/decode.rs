//! Incremental UTF-8 decoding for byte input split at arbitrary boundaries.
//!
//! Multi-byte sequences cut by a chunk boundary are carried over to the next
//! chunk. Invalid sequences decode to U+FFFD and decoding continues.

#[derive(Debug, Default)]
pub(crate) struct ChunkDecoder {
    // Incomplete UTF-8 suffix of the previous chunk (at most 3 bytes).
    carry: Vec<u8>,
}

impl ChunkDecoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Decode `bytes` and append the complete characters to `out`.
    pub(crate) fn push(&mut self, bytes: &[u8], out: &mut String) {
        if bytes.is_empty() {
            return;
        }
        if self.carry.is_empty() {
            self.decode(bytes, out);
            return;
        }
        let mut joined = std::mem::take(&mut self.carry);
        joined.extend_from_slice(bytes);
        self.decode(&joined, out);
    }

    /// Flush a dangling incomplete sequence, so input is never silently
    /// truncated at end of stream.
    pub(crate) fn finish(&mut self, out: &mut String) {
        if self.carry.is_empty() {
            return;
        }
        out.push_str(&String::from_utf8_lossy(&self.carry));
        self.carry.clear();
    }

    fn decode(&mut self, mut bytes: &[u8], out: &mut String) {
        loop {
            match std::str::from_utf8(bytes) {
                Ok(text) => {
                    out.push_str(text);
                    return;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    if let Ok(prefix) = std::str::from_utf8(&bytes[..valid]) {
                        out.push_str(prefix);
                    }
                    match err.error_len() {
                        Some(invalid) => {
                            out.push('\u{FFFD}');
                            bytes = &bytes[valid + invalid..];
                        }
                        None => {
                            self.carry.extend_from_slice(&bytes[valid..]);
                            return;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ChunkDecoder;

    fn decode_split(bytes: &[u8], at: &[usize]) -> String {
        let mut decoder = ChunkDecoder::new();
        let mut out = String::new();
        let mut start = 0;
        for &cut in at {
            decoder.push(&bytes[start..cut], &mut out);
            start = cut;
        }
        decoder.push(&bytes[start..], &mut out);
        decoder.finish(&mut out);
        out
    }

    #[test]
    fn multibyte_sequences_survive_every_split() {
        let input = "é<b>😀</b>ö";
        let bytes = input.as_bytes();
        for cut in 1..bytes.len() {
            assert_eq!(decode_split(bytes, &[cut]), input, "split at {cut}");
        }
        let every_byte: Vec<usize> = (1..bytes.len()).collect();
        assert_eq!(decode_split(bytes, &every_byte), input);
    }

    #[test]
    fn invalid_bytes_become_replacement_characters() {
        assert_eq!(decode_split(b"a\xFFb", &[]), "a\u{FFFD}b");
        assert_eq!(decode_split(b"a\xFF", &[1]), "a\u{FFFD}");
    }

    #[test]
    fn truncated_tail_is_flushed_lossily() {
        let bytes = "😀".as_bytes();
        assert_eq!(decode_split(&bytes[..2], &[]), "\u{FFFD}");
    }
}
