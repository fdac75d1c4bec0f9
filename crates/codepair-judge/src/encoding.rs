//! Reversible base64 transcoding for payload text fields.
//!
//! The provider carries source, stdin, and output streams base64-encoded
//! (`base64_encoded=true`). Some deployments wrap encoded output with
//! newlines, so decoding strips ASCII whitespace first.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;

use crate::JudgeError;

pub fn encode(text: &str) -> String {
    B64.encode(text.as_bytes())
}

pub fn decode(encoded: &str) -> Result<String, JudgeError> {
    let compact: String = encoded.split_ascii_whitespace().collect();
    let bytes = B64
        .decode(compact.as_bytes())
        .map_err(|e| JudgeError::Parse(format!("invalid base64 payload: {e}")))?;
    String::from_utf8(bytes).map_err(|e| JudgeError::Parse(format!("invalid utf-8 payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        for text in [
            "",
            "print(1)",
            "x = 1\ny = 2\n",
            "множество",
            "#include <iostream>\nint main() { return 0; }",
        ] {
            assert_eq!(decode(&encode(text)).unwrap(), text);
        }
    }

    #[test]
    fn decode_tolerates_line_wrapping() {
        let encoded = encode("hello world, hello world, hello world");
        let wrapped = format!("{}\n{}", &encoded[..20], &encoded[20..]);
        assert_eq!(
            decode(&wrapped).unwrap(),
            "hello world, hello world, hello world"
        );
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode("!!not base64!!").is_err());
    }
}
