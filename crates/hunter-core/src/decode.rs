//! Lossy UTF-8 decoding of raw log lines.
//!
//! The game occasionally writes broken byte sequences into its log. A line is
//! always decoded to text; every invalid run is replaced by U+FFFD and
//! reported so it can be surfaced without stalling the tailer.

use std::fmt;

use encoding_rs::{DecoderResult, UTF_8};
use tracing::debug;

/// An invalid byte run found while decoding a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRun {
    /// Byte offset of the run within the line
    pub offset: usize,
    pub bytes: Vec<u8>,
}

impl InvalidRun {
    pub fn hex(&self) -> String {
        self.bytes
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for InvalidRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid byte sequence at offset {}: [{}]",
            self.offset,
            self.hex()
        )
    }
}

/// Result of decoding one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLine {
    pub text: String,
    pub invalid_runs: Vec<InvalidRun>,
}

/// Decode one raw line, stripping the trailing line terminator.
pub fn decode_line(raw: &[u8]) -> DecodedLine {
    let bytes = trim_line_ending(raw);

    let mut decoder = UTF_8.new_decoder_without_bom_handling();
    let capacity = decoder
        .max_utf8_buffer_length_without_replacement(bytes.len())
        .unwrap_or(bytes.len());
    let mut text = String::with_capacity(capacity);
    let mut invalid_runs: Vec<InvalidRun> = Vec::new();
    let mut consumed = 0;

    loop {
        let (result, read) =
            decoder.decode_to_string_without_replacement(&bytes[consumed..], &mut text, true);
        consumed += read;

        match result {
            DecoderResult::InputEmpty => break,
            DecoderResult::OutputFull => {
                text.reserve(bytes.len() - consumed + 4);
            }
            DecoderResult::Malformed(bad_len, pending) => {
                let end = consumed - pending as usize;
                let start = end - bad_len as usize;

                // Adjacent malformed sequences form one run with one placeholder
                match invalid_runs.last_mut() {
                    Some(last) if last.offset + last.bytes.len() == start => {
                        last.bytes.extend_from_slice(&bytes[start..end]);
                    }
                    _ => {
                        invalid_runs.push(InvalidRun {
                            offset: start,
                            bytes: bytes[start..end].to_vec(),
                        });
                        text.push(char::REPLACEMENT_CHARACTER);
                    }
                }
            }
        }
    }

    if !invalid_runs.is_empty() {
        debug!(
            "Decoded line with {} invalid run(s), {} bytes",
            invalid_runs.len(),
            bytes.len()
        );
    }

    DecodedLine { text, invalid_runs }
}

fn trim_line_ending(raw: &[u8]) -> &[u8] {
    let mut end = raw.len();
    while end > 0 && (raw[end - 1] == b'\n' || raw[end - 1] == b'\r') {
        end -= 1;
    }
    &raw[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_clean_line() {
        let decoded = decode_line(b"<2025-04-14T16:42:53.465Z> [Notice] hello\r\n");
        assert_eq!(decoded.text, "<2025-04-14T16:42:53.465Z> [Notice] hello");
        assert!(decoded.invalid_runs.is_empty());
    }

    #[test]
    fn test_decode_multibyte_utf8() {
        let decoded = decode_line("zone 'Ärger' ✓\n".as_bytes());
        assert_eq!(decoded.text, "zone 'Ärger' ✓");
        assert!(decoded.invalid_runs.is_empty());
    }

    #[test]
    fn test_decode_invalid_byte_is_replaced() {
        let decoded = decode_line(b"abc\xffdef\n");
        assert_eq!(decoded.text, "abc\u{FFFD}def");
        assert_eq!(decoded.invalid_runs.len(), 1);
        assert_eq!(decoded.invalid_runs[0].offset, 3);
        assert_eq!(decoded.invalid_runs[0].hex(), "ff");
    }

    #[test]
    fn test_adjacent_invalid_bytes_form_one_run() {
        let decoded = decode_line(b"a\xff\xfeb");
        assert_eq!(decoded.text, "a\u{FFFD}b");
        assert_eq!(decoded.invalid_runs.len(), 1);
        assert_eq!(decoded.invalid_runs[0].offset, 1);
        assert_eq!(decoded.invalid_runs[0].hex(), "ff fe");
    }

    #[test]
    fn test_separate_invalid_runs() {
        let decoded = decode_line(b"\xffok\xff");
        assert_eq!(decoded.text, "\u{FFFD}ok\u{FFFD}");
        let offsets: Vec<usize> = decoded.invalid_runs.iter().map(|r| r.offset).collect();
        assert_eq!(offsets, vec![0, 3]);
    }

    #[test]
    fn test_truncated_sequence_at_end() {
        // First two bytes of a three-byte sequence
        let decoded = decode_line(b"end\xe2\x9c");
        assert!(decoded.text.starts_with("end"));
        assert!(decoded.text.ends_with('\u{FFFD}'));
        assert_eq!(decoded.invalid_runs.len(), 1);
        assert_eq!(decoded.invalid_runs[0].offset, 3);
    }

    #[test]
    fn test_invalid_run_display() {
        let run = InvalidRun {
            offset: 7,
            bytes: vec![0xc3, 0x28],
        };
        assert_eq!(
            run.to_string(),
            "invalid byte sequence at offset 7: [c3 28]"
        );
    }
}
