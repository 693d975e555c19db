//! Property-based test generators using proptest.
//!
//! Fields with stream values cannot be cloned, so strategies produce plain
//! [`FieldSpec`] descriptions that are turned into fresh fields per run.

use fieldstore_core::{ByteStream, CharStream, Document, Field, FieldFlags, FieldRegistry};
use proptest::prelude::*;

/// Field names the generators draw from.
pub const FIELD_NAMES: [&str; 5] = ["id", "title", "body", "tags", "payload"];

/// How a generated field carries its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecValue {
    /// In-memory string.
    Text(String),
    /// Character stream, optionally without a declared size.
    Chars {
        /// The text the stream yields.
        text: String,
        /// Whether the stream reports its size.
        sized: bool,
    },
    /// Byte stream, optionally without a declared size.
    Bytes {
        /// The bytes the stream yields.
        bytes: Vec<u8>,
        /// Whether the stream reports its size.
        sized: bool,
    },
}

/// A cloneable description of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name, one of [`FIELD_NAMES`].
    pub name: &'static str,
    /// Whether the field is stored.
    pub stored: bool,
    /// Whether the field is tokenized.
    pub tokenized: bool,
    /// Value source.
    pub value: SpecValue,
}

impl FieldSpec {
    /// Builds the described field.
    pub fn to_field(&self) -> Field {
        let mut flags = FieldFlags::INDEXED;
        if self.stored {
            flags = flags | FieldFlags::STORED;
        }
        if self.tokenized {
            flags = flags | FieldFlags::TOKENIZED;
        }

        match &self.value {
            SpecValue::Text(text) => Field::text(self.name, text.clone(), flags),
            SpecValue::Chars { text, sized } => {
                let stream = if *sized {
                    CharStream::from_text(text.clone())
                } else {
                    CharStream::unsized_reader(std::io::Cursor::new(text.clone().into_bytes()))
                };
                Field::chars(self.name, stream, flags)
            }
            SpecValue::Bytes { bytes, sized } => {
                let stream = if *sized {
                    ByteStream::from_bytes(bytes.clone())
                } else {
                    ByteStream::unsized_reader(std::io::Cursor::new(bytes.clone()))
                };
                Field::binary_stream(self.name, stream)
            }
        }
    }

    /// Whether the field ends up stored.
    ///
    /// Binary fields are always stored.
    pub fn is_stored(&self) -> bool {
        self.stored || matches!(self.value, SpecValue::Bytes { .. })
    }
}

/// Builds a document from field descriptions.
pub fn build_document(specs: &[FieldSpec]) -> Document {
    specs.iter().map(FieldSpec::to_field).collect()
}

/// A registry holding every name in [`FIELD_NAMES`].
pub fn full_registry() -> FieldRegistry {
    FIELD_NAMES.into_iter().collect()
}

/// Strategy for generating field values.
pub fn spec_value_strategy() -> impl Strategy<Value = SpecValue> {
    prop_oneof![
        ".{0,40}".prop_map(SpecValue::Text),
        (".{0,40}", any::<bool>()).prop_map(|(text, sized)| SpecValue::Chars { text, sized }),
        (prop::collection::vec(any::<u8>(), 0..200), any::<bool>())
            .prop_map(|(bytes, sized)| SpecValue::Bytes { bytes, sized }),
    ]
}

/// Strategy for generating field specs.
pub fn field_spec_strategy() -> impl Strategy<Value = FieldSpec> {
    (
        prop::sample::select(FIELD_NAMES.to_vec()),
        any::<bool>(),
        any::<bool>(),
        spec_value_strategy(),
    )
        .prop_map(|(name, stored, tokenized, value)| FieldSpec {
            name,
            stored,
            tokenized,
            value,
        })
}

/// Strategy for generating documents of up to eight fields.
pub fn document_spec_strategy() -> impl Strategy<Value = Vec<FieldSpec>> {
    prop::collection::vec(field_spec_strategy(), 0..8)
}

/// Strategy for generating batches of documents.
pub fn segment_spec_strategy(max_docs: usize) -> impl Strategy<Value = Vec<Vec<FieldSpec>>> {
    prop::collection::vec(document_spec_strategy(), 0..max_docs)
}
