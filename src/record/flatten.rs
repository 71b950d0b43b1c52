//! Conversions from loosely shaped transaction data into record fields

use std::collections::BTreeMap;

/// Collapse a key/value sequence into a mapping, last occurrence wins
pub fn flatten_pairs<I, K, V>(pairs: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// Decode bytes as UTF-8, dropping every invalid sequence
pub fn lenient_decode(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

/// Body text for a record; `None` when the body is absent or empty
pub fn decode_body(body: Option<&[u8]>) -> Option<String> {
    body.filter(|bytes| !bytes.is_empty()).map(lenient_decode)
}
