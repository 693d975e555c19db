//! # fieldstore codec
//!
//! Primitive wire encoding for fieldstore segment files.
//!
//! Every multi-byte value in a stored-field segment is written with one of
//! four encodings:
//!
//! | Encoding | Layout |
//! |----------|--------|
//! | VInt     | 7 bits per byte, low group first, MSB set when more bytes follow |
//! | Long     | 8 bytes, signed, big-endian |
//! | Bytes    | VInt byte length, then the raw bytes |
//! | String   | VInt count of characters (Unicode scalar values), then UTF-8 |
//!
//! The encodings are fixed: a reader built against this crate decodes any
//! file written with it.
//!
//! ## Usage
//!
//! ```
//! use fieldstore_codec::{DataReader, DataWriter};
//!
//! let mut writer = DataWriter::new();
//! writer.write_vint(300);
//! writer.write_string("héllo");
//!
//! let bytes = writer.into_bytes();
//! let mut reader = DataReader::new(&bytes);
//! assert_eq!(reader.read_vint().unwrap(), 300);
//! assert_eq!(reader.read_string().unwrap(), "héllo");
//! assert!(reader.is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;

pub use decoder::{decode_vint, DataReader};
pub use encoder::{encode_vint, vint_len, DataWriter};
pub use error::{CodecError, CodecResult};

/// Size in bytes of an encoded Long.
pub const LONG_SIZE: usize = 8;

/// Maximum number of bytes a VInt of a `u64` occupies.
pub const MAX_VINT_LEN: usize = 10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_sequence_decodes_in_order() {
        let mut writer = DataWriter::new();
        writer.write_vint(2);
        writer.write_byte(0x03);
        writer.write_long(-42);
        writer.write_string("ab");
        writer.write_counted_bytes(&[9, 8, 7]);

        let bytes = writer.into_bytes();
        let mut reader = DataReader::new(&bytes);
        assert_eq!(reader.read_vint().unwrap(), 2);
        assert_eq!(reader.read_byte().unwrap(), 0x03);
        assert_eq!(reader.read_long().unwrap(), -42);
        assert_eq!(reader.read_string().unwrap(), "ab");
        assert_eq!(reader.read_counted_bytes().unwrap(), &[9, 8, 7]);
        assert!(reader.is_empty());
    }
}
