//! Field record encoding.
//!
//! A field record is validated and its value fully materialized before the
//! first byte is written, so a rejected field leaves the output unchanged.

use crate::config::StoredFieldsConfig;
use crate::error::{CoreError, CoreResult};
use crate::field::{Field, FieldValue};
use crate::format::FieldBits;
use crate::registry::FieldRegistry;
use fieldstore_codec::DataWriter;
use std::borrow::Cow;
use std::io::Read;

/// A resolved field value, ready to write.
enum Payload<'f> {
    Binary(Vec<u8>),
    Text(Cow<'f, str>),
}

/// Encodes stored fields into field records.
#[derive(Debug, Clone, Copy)]
pub struct FieldEncoder<'a> {
    registry: &'a FieldRegistry,
    config: &'a StoredFieldsConfig,
}

impl<'a> FieldEncoder<'a> {
    /// Creates an encoder that numbers fields through `registry`.
    #[must_use]
    pub fn new(registry: &'a FieldRegistry, config: &'a StoredFieldsConfig) -> Self {
        Self { registry, config }
    }

    /// Appends the record for `field` to `out`.
    ///
    /// Stream values are read to the end and consumed. On error nothing is
    /// appended to `out`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::UnregisteredField`] if the name has no number
    /// - [`CoreError::UnsupportedFeature`] if the field is flagged compressed
    /// - [`CoreError::MissingValue`] if no value source can be resolved
    /// - [`CoreError::DataTooLarge`] if a character stream is too long
    pub fn encode_field(&self, field: &mut Field, out: &mut DataWriter) -> CoreResult<()> {
        let number = self.registry.field_number(field.name())?;
        let flags = field.flags();

        if flags.is_compressed() {
            return Err(CoreError::unsupported_feature(
                field.name(),
                "compressed fields are not supported; store a compressed byte payload instead",
            ));
        }

        let payload = self.resolve(field)?;

        out.write_vint(u64::from(number.as_u32()));
        out.write_byte(FieldBits::from_flags(flags).as_byte());
        match payload {
            Payload::Binary(bytes) => out.write_counted_bytes(&bytes),
            Payload::Text(text) => out.write_string(&text),
        }
        Ok(())
    }

    /// Picks the value source: the binary flag wins, then a missing string
    /// selects the character stream, otherwise the string is used.
    fn resolve<'f>(&self, field: &'f mut Field) -> CoreResult<Payload<'f>> {
        let binary = field.flags().is_binary();
        let limit = self.config.unknown_size_read_limit;

        if binary {
            let Some(FieldValue::Bytes(stream)) = field.value_mut() else {
                return Err(CoreError::missing_value(field.name()));
            };
            let (reader, size) = stream.parts();
            let (bytes, _) = read_stream(reader, size, limit, "binary");
            return Ok(Payload::Binary(bytes));
        }

        if field.string_value().is_none() {
            let name = field.name().to_string();
            let Some(FieldValue::Chars(stream)) = field.value_mut() else {
                return Err(CoreError::missing_value(name));
            };
            let (reader, size) = stream.parts();
            let (bytes, truncated) = read_stream(reader, size, limit, &name);
            let text = decode_text(bytes, truncated, &name);

            let length = text.chars().count() as u64;
            if length > self.config.max_text_chars {
                return Err(CoreError::DataTooLarge {
                    field: name,
                    length,
                    max: self.config.max_text_chars,
                });
            }
            return Ok(Payload::Text(Cow::Owned(text)));
        }

        match field.value() {
            Some(FieldValue::Text(text)) => Ok(Payload::Text(Cow::Borrowed(text.as_str()))),
            _ => Err(CoreError::missing_value(field.name())),
        }
    }
}

/// Reads a stream fully into memory.
///
/// A stream that reports no size is read up to `limit` bytes; the returned
/// flag is set when that ceiling was hit. A read error yields an empty value
/// rather than an error.
fn read_stream(
    reader: &mut dyn Read,
    size: Option<u64>,
    limit: usize,
    field: &str,
) -> (Vec<u8>, bool) {
    let cap = size.unwrap_or(limit as u64);
    let mut buf = Vec::new();
    if let Some(known) = size {
        buf.reserve(usize::try_from(known).map_or(limit, |n| n.min(limit)));
    }

    match reader.take(cap).read_to_end(&mut buf) {
        Ok(_) => {
            let truncated = size.is_none() && buf.len() >= limit;
            if truncated {
                tracing::warn!(field, limit, "stream of unknown size truncated at read limit");
            }
            (buf, truncated)
        }
        Err(e) => {
            tracing::warn!(field, error = %e, "stream read failed, storing empty value");
            (Vec::new(), false)
        }
    }
}

/// Turns materialized character-stream bytes into text.
///
/// When the read limit cut the stream, an incomplete trailing sequence is
/// dropped. Any other invalid UTF-8, including a stream that ends inside a
/// character on its own, is treated like a failed read.
fn decode_text(bytes: Vec<u8>, truncated: bool, field: &str) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) if truncated && e.utf8_error().error_len().is_none() => {
            let valid = e.utf8_error().valid_up_to();
            let mut bytes = e.into_bytes();
            bytes.truncate(valid);
            // valid_up_to guarantees the prefix is UTF-8.
            String::from_utf8(bytes).unwrap_or_default()
        }
        Err(e) => {
            tracing::warn!(field, error = %e, "character stream is not UTF-8, storing empty value");
            String::new()
        }
    }
}

/// A block of encoded stored fields for one document.
///
/// Lets an indexing pipeline encode stored fields while it processes a
/// document and hand the finished block to
/// [`crate::StoredFieldsWriter::flush_document`].
#[derive(Debug, Default, Clone)]
pub struct StoredFieldsBuffer {
    out: DataWriter,
    num_fields: u32,
}

impl StoredFieldsBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes `field` onto the end of the buffer.
    ///
    /// # Errors
    ///
    /// Propagates encoder errors; the buffer is unchanged on error.
    pub fn add_field(&mut self, encoder: &FieldEncoder<'_>, field: &mut Field) -> CoreResult<()> {
        encoder.encode_field(field, &mut self.out)?;
        self.num_fields += 1;
        Ok(())
    }

    /// Number of fields encoded.
    #[must_use]
    pub fn num_fields(&self) -> u32 {
        self.num_fields
    }

    /// The encoded field records.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.out.as_bytes()
    }

    /// Returns true if no field has been encoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_fields == 0
    }

    /// Empties the buffer for the next document.
    pub fn clear(&mut self) {
        self.out.clear();
        self.num_fields = 0;
    }
}
