use base64::{engine::general_purpose::STANDARD, Engine};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serializer};

/// Decode key material written as `base64:<..>`, `hex:<..>`, `text:<..>`,
/// or plain text.
///
/// Plain text maps to its UTF-8 bytes, which is how HMAC secrets given as
/// strings are conventionally keyed. `text:` keeps the rest verbatim, for
/// secrets that themselves start with a prefix.
pub fn decode_prefixed(s: &str) -> Result<Vec<u8>, String> {
    if let Some(rest) = s.strip_prefix("text:") {
        Ok(rest.as_bytes().to_vec())
    } else if let Some(rest) = s.strip_prefix("base64:") {
        STANDARD.decode(rest.trim()).map_err(|e| format!("bad base64: {e}"))
    } else if let Some(rest) = s.strip_prefix("hex:") {
        hex::decode(rest.trim()).map_err(|e| format!("bad hex: {e}"))
    } else {
        Ok(s.as_bytes().to_vec())
    }
}

/// Encode bytes in the `base64:` form accepted by [`decode_prefixed`].
pub fn encode_prefixed(bytes: &[u8]) -> String {
    format!("base64:{}", STANDARD.encode(bytes))
}

/// Serialize bytes as a `base64:` prefixed string
pub fn as_prefixed<S>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&encode_prefixed(bytes))
}

/// Deserialize a prefixed (or plain text) string into bytes
pub fn from_prefixed<'de, D>(d: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(d)?;
    decode_prefixed(&s).map_err(D::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_each_form() {
        assert_eq!(decode_prefixed("hex:00ff").unwrap(), vec![0x00, 0xff]);
        assert_eq!(decode_prefixed("base64:AAE=").unwrap(), vec![0x00, 0x01]);
        assert_eq!(decode_prefixed("s3cret").unwrap(), b"s3cret".to_vec());
        assert_eq!(decode_prefixed("text:base64:AAE=").unwrap(), b"base64:AAE=".to_vec());
    }

    #[test]
    fn reports_bad_encodings() {
        assert!(decode_prefixed("hex:zz").is_err());
        assert!(decode_prefixed("base64:***").is_err());
    }
}
