//! Benchmark utilities.

use fieldstore_core::{Document, Field, FieldFlags, FieldRegistry};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::Arc;

/// Field names used by [`sample_document`].
pub const FIELDS: [&str; 3] = ["id", "body", "payload"];

/// Generate random bytes of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate random alphanumeric text of the specified length.
pub fn random_text(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// A registry holding [`FIELDS`].
pub fn registry() -> Arc<FieldRegistry> {
    Arc::new(FIELDS.into_iter().collect())
}

/// A document with a stored id, a stored text body and a binary payload.
pub fn sample_document(i: usize, body: &str, payload: &[u8]) -> Document {
    Document::new()
        .with_field(Field::text("id", i.to_string(), FieldFlags::STORED))
        .with_field(Field::text(
            "body",
            body,
            FieldFlags::STORED | FieldFlags::INDEXED | FieldFlags::TOKENIZED,
        ))
        .with_field(Field::binary("payload", payload.to_vec()))
}
