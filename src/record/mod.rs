//! Flat, serializable records built from intercepted transactions

mod builder;
mod flatten;

pub use builder::{epoch_seconds, RequestRecord, ResponseRecord, StoredRecord};
pub use flatten::{decode_body, flatten_pairs, lenient_decode};
