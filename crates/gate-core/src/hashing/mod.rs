//! Canonicalización JSON y hashing para fingerprints de definición.

pub mod canonical_json;
pub mod hash;

pub use canonical_json::to_canonical_json;
pub use hash::{hash_str, hash_value};
