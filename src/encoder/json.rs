//! JSON as the legacy data-stream consumer expects it.
//!
//! Items are separated by `", "`, keys from values by `": "`, and every
//! character outside printable ASCII is written as a `\uXXXX` escape
//! (UTF-16 surrogate pairs above the BMP), so a frame never contains a raw
//! newline or a multi-byte sequence.

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};

#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyFormatter;

impl Formatter for LegacyFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let bytes = fragment.as_bytes();
        let mut start = 0;

        for (i, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(&bytes[start..i])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + ch.len_utf8();
        }

        writer.write_all(&bytes[start..])
    }
}

/// Serialize `value` in the legacy dialect.
pub fn to_legacy_string<T>(value: &T) -> serde_json::Result<String>
where
    T: ?Sized + Serialize,
{
    let mut buf = Vec::with_capacity(128);
    let mut ser = Serializer::with_formatter(&mut buf, LegacyFormatter);
    value.serialize(&mut ser)?;
    String::from_utf8(buf)
        .map_err(|e| serde_json::Error::io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_separators() {
        let value = json!({"type": "sources", "data": {"nodes": [1, 2]}});
        assert_eq!(
            to_legacy_string(&value).unwrap(),
            r#"{"type": "sources", "data": {"nodes": [1, 2]}}"#
        );
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(to_legacy_string(&json!({"a": [], "b": {}})).unwrap(), r#"{"a": [], "b": {}}"#);
    }

    #[test]
    fn test_control_characters_and_quotes() {
        assert_eq!(
            to_legacy_string("line\n\"quoted\"\t\\").unwrap(),
            r#""line\n\"quoted\"\t\\""#
        );
    }

    #[test]
    fn test_non_ascii_is_escaped() {
        assert_eq!(to_legacy_string("caf\u{e9}").unwrap(), r#""caf\u00e9""#);
        assert_eq!(to_legacy_string("\u{7f}").unwrap(), r#""\u007f""#);
        assert_eq!(to_legacy_string("\u{1f600}").unwrap(), r#""\ud83d\ude00""#);
    }

    #[test]
    fn test_key_order_is_preserved() {
        let value: serde_json::Value = serde_json::from_str(r#"{"z": 1, "a": 2}"#).unwrap();
        assert_eq!(to_legacy_string(&value).unwrap(), r#"{"z": 1, "a": 2}"#);
    }
}
