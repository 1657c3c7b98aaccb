//! Content-addressed article identifiers.
//!
//! An article's identity is derived purely from its canonical locator (the link it was
//! published under), so re-ingesting the same link always lands on the same stored record.

use sha2::{Digest, Sha256};

/// Number of digest bytes kept in an identifier (128 bits).
const ID_BYTES: usize = 16;

/// Identifier produced for an empty locator.
pub const EMPTY_LOCATOR_ID: &str = "e3b0c44298fc1c149afbf4c8996fb924";

/// Derives the stable identifier for `locator`: the first 128 bits of its SHA-256 digest,
/// rendered as 32 lowercase hex characters.
///
/// Empty input is accepted and yields [`EMPTY_LOCATOR_ID`].
pub fn derive_id(locator: &str) -> String {
    let digest = Sha256::digest(locator.as_bytes());
    hex::encode(&digest[..ID_BYTES])
}

/// True for identifiers that carry no information about the article, i.e. those derived
/// from an empty locator.
pub fn is_low_information_id(id: &str) -> bool {
    id == EMPTY_LOCATOR_ID
}
