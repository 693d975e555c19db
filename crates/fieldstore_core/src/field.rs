//! Document and field model.
//!
//! A [`Field`] pairs a name with a set of [`FieldFlags`] and at most one
//! value source. Stream sources are consumed when the field is stored, so
//! documents are passed to the writer by mutable reference.

use std::fmt;
use std::io::{Cursor, Read};
use std::ops::BitOr;

/// In-memory flags describing how a field is indexed and stored.
///
/// These are caller-side flags; only the tokenized, binary, and compressed
/// bits reach disk (see [`crate::format::FieldBits`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct FieldFlags(u8);

impl FieldFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// The value is kept verbatim in the stored-field files.
    pub const STORED: Self = Self(0x01);
    /// The value is inverted for search.
    pub const INDEXED: Self = Self(0x02);
    /// The value is run through an analyzer before indexing.
    pub const TOKENIZED: Self = Self(0x04);
    /// The value is an opaque byte payload.
    pub const BINARY: Self = Self(0x08);
    /// The value should be stored compressed. Never accepted by the writer.
    pub const COMPRESSED: Self = Self(0x10);

    /// Creates flags from a raw byte.
    #[must_use]
    pub const fn from_byte(b: u8) -> Self {
        Self(b)
    }

    /// Returns the raw byte value.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self.0
    }

    /// Returns the union of two flag sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns the flags with `other` cleared.
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Checks whether every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Checks if the stored flag is set.
    #[must_use]
    pub const fn is_stored(self) -> bool {
        self.contains(Self::STORED)
    }

    /// Checks if the indexed flag is set.
    #[must_use]
    pub const fn is_indexed(self) -> bool {
        self.contains(Self::INDEXED)
    }

    /// Checks if the tokenized flag is set.
    #[must_use]
    pub const fn is_tokenized(self) -> bool {
        self.contains(Self::TOKENIZED)
    }

    /// Checks if the binary flag is set.
    #[must_use]
    pub const fn is_binary(self) -> bool {
        self.contains(Self::BINARY)
    }

    /// Checks if the compressed flag is set.
    #[must_use]
    pub const fn is_compressed(self) -> bool {
        self.contains(Self::COMPRESSED)
    }
}

impl BitOr for FieldFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// A streamed byte payload with an optional known size.
pub struct ByteStream {
    reader: Box<dyn Read + Send>,
    size: Option<u64>,
}

impl ByteStream {
    /// Wraps a reader. `size` is the number of bytes it will yield, if known.
    pub fn new(reader: impl Read + Send + 'static, size: Option<u64>) -> Self {
        Self {
            reader: Box::new(reader),
            size,
        }
    }

    /// Wraps a reader whose length is unknown.
    pub fn unsized_reader(reader: impl Read + Send + 'static) -> Self {
        Self::new(reader, None)
    }

    /// Wraps an in-memory buffer.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let size = bytes.len() as u64;
        Self::new(Cursor::new(bytes), Some(size))
    }

    /// Returns the declared size, if known.
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub(crate) fn parts(&mut self) -> (&mut dyn Read, Option<u64>) {
        (&mut *self.reader, self.size)
    }
}

impl fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteStream")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// A streamed text payload: a reader yielding UTF-8.
///
/// The optional size is the byte length of the UTF-8 stream.
pub struct CharStream {
    reader: Box<dyn Read + Send>,
    size: Option<u64>,
}

impl CharStream {
    /// Wraps a reader. `size` is the number of UTF-8 bytes, if known.
    pub fn new(reader: impl Read + Send + 'static, size: Option<u64>) -> Self {
        Self {
            reader: Box::new(reader),
            size,
        }
    }

    /// Wraps a reader whose length is unknown.
    pub fn unsized_reader(reader: impl Read + Send + 'static) -> Self {
        Self::new(reader, None)
    }

    /// Wraps an owned string.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        let bytes = text.into().into_bytes();
        let size = bytes.len() as u64;
        Self::new(Cursor::new(bytes), Some(size))
    }

    /// Returns the declared size, if known.
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub(crate) fn parts(&mut self) -> (&mut dyn Read, Option<u64>) {
        (&mut *self.reader, self.size)
    }
}

impl fmt::Debug for CharStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharStream")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// The source of a field's value.
#[derive(Debug)]
pub enum FieldValue {
    /// An in-memory string.
    Text(String),
    /// A byte stream, read when the field is stored.
    Bytes(ByteStream),
    /// A character stream, read when the field is stored.
    Chars(CharStream),
}

/// A named field of a document.
#[derive(Debug)]
pub struct Field {
    name: String,
    flags: FieldFlags,
    value: Option<FieldValue>,
}

impl Field {
    /// Creates a field from its parts.
    ///
    /// No consistency between `flags` and `value` is enforced here; the
    /// writer rejects fields whose value cannot be resolved.
    pub fn new(name: impl Into<String>, flags: FieldFlags, value: Option<FieldValue>) -> Self {
        Self {
            name: name.into(),
            flags,
            value,
        }
    }

    /// Creates a text field.
    pub fn text(name: impl Into<String>, value: impl Into<String>, flags: FieldFlags) -> Self {
        Self::new(
            name,
            flags.without(FieldFlags::BINARY),
            Some(FieldValue::Text(value.into())),
        )
    }

    /// Creates a stored, untokenized binary field from an in-memory buffer.
    pub fn binary(name: impl Into<String>, value: Vec<u8>) -> Self {
        Self::binary_stream(name, ByteStream::from_bytes(value))
    }

    /// Creates a stored, untokenized binary field from a byte stream.
    pub fn binary_stream(name: impl Into<String>, stream: ByteStream) -> Self {
        Self::new(
            name,
            FieldFlags::STORED | FieldFlags::BINARY,
            Some(FieldValue::Bytes(stream)),
        )
    }

    /// Creates a text field whose value is read from a character stream.
    pub fn chars(name: impl Into<String>, stream: CharStream, flags: FieldFlags) -> Self {
        Self::new(
            name,
            flags.without(FieldFlags::BINARY),
            Some(FieldValue::Chars(stream)),
        )
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the field flags.
    #[must_use]
    pub fn flags(&self) -> FieldFlags {
        self.flags
    }

    /// Returns whether the field is stored.
    #[must_use]
    pub fn is_stored(&self) -> bool {
        self.flags.is_stored()
    }

    /// Returns the in-memory string value, if that is the value source.
    #[must_use]
    pub fn string_value(&self) -> Option<&str> {
        match &self.value {
            Some(FieldValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Returns the value source.
    #[must_use]
    pub fn value(&self) -> Option<&FieldValue> {
        self.value.as_ref()
    }

    pub(crate) fn value_mut(&mut self) -> Option<&mut FieldValue> {
        self.value.as_mut()
    }
}

/// An ordered collection of fields.
///
/// Field order is preserved exactly as added; the same name may appear
/// more than once.
#[derive(Debug, Default)]
pub struct Document {
    fields: Vec<Field>,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field.
    pub fn add(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Appends a field, builder style.
    #[must_use]
    pub fn with_field(mut self, field: Field) -> Self {
        self.add(field);
        self
    }

    /// Returns the fields in insertion order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub(crate) fn fields_mut(&mut self) -> &mut [Field] {
        &mut self.fields
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the document has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields with the stored flag set.
    #[must_use]
    pub fn stored_count(&self) -> usize {
        self.fields.iter().filter(|f| f.is_stored()).count()
    }
}

impl FromIterator<Field> for Document {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Document {
    type Item = Field;
    type IntoIter = std::vec::IntoIter<Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_union_and_contains() {
        let flags = FieldFlags::STORED | FieldFlags::INDEXED | FieldFlags::TOKENIZED;
        assert!(flags.is_stored());
        assert!(flags.is_indexed());
        assert!(flags.is_tokenized());
        assert!(!flags.is_binary());
        assert!(!flags.is_compressed());
        assert!(!flags.without(FieldFlags::STORED).is_stored());
    }

    #[test]
    fn text_field_clears_binary_flag() {
        let field = Field::text("title", "x", FieldFlags::STORED | FieldFlags::BINARY);
        assert!(!field.flags().is_binary());
        assert_eq!(field.string_value(), Some("x"));
    }

    #[test]
    fn binary_field_is_stored_and_binary() {
        let field = Field::binary("blob", vec![1, 2, 3]);
        assert!(field.is_stored());
        assert!(field.flags().is_binary());
        assert!(field.string_value().is_none());
        match field.value() {
            Some(FieldValue::Bytes(stream)) => assert_eq!(stream.size(), Some(3)),
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn char_stream_size_is_utf8_length() {
        let stream = CharStream::from_text("né");
        assert_eq!(stream.size(), Some(3));
    }

    #[test]
    fn document_preserves_order_and_counts_stored() {
        let doc: Document = vec![
            Field::text("b", "1", FieldFlags::STORED),
            Field::text("a", "2", FieldFlags::INDEXED),
            Field::text("b", "3", FieldFlags::STORED),
        ]
        .into_iter()
        .collect();

        let names: Vec<&str> = doc.fields().iter().map(Field::name).collect();
        assert_eq!(names, vec!["b", "a", "b"]);
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.stored_count(), 2);
    }
}
