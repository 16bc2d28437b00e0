use bincode::Options;

use crate::DbResult;

/// Stored values are fixed width and big endian, trailing bytes are rejected.
fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_big_endian()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

pub(crate) fn encode<S: ?Sized + serde::Serialize>(item: &S) -> DbResult<Vec<u8>> {
    Ok(options().serialize(item)?)
}

pub(crate) fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> DbResult<T> {
    Ok(options().deserialize(bytes)?)
}

/// Encode a record id so that lexicographic byte order matches numeric order.
pub(crate) fn encode_key(id: i32) -> [u8; 4] {
    ((id as u32) ^ 0x8000_0000).to_be_bytes()
}
