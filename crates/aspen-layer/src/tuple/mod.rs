//! Order-preserving tuple encoding.
//!
//! # Type Codes
//!
//! | Code | Type | Payload |
//! |------|------|---------|
//! | 0x00 | Null | none |
//! | 0x01 | Bytes | raw bytes, `0x00` escaped as `0x00 0xFF`, `0x00` terminator |
//! | 0x02 | String | UTF-8 bytes, escaped and terminated like Bytes |
//! | 0x0C-0x13 | Negative int | one's complement big-endian magnitude, `0x14 - len` bytes |
//! | 0x14 | Zero | none |
//! | 0x15-0x1C | Positive int | big-endian magnitude, `code - 0x14` bytes |
//!
//! Integers use the minimal number of bytes for their magnitude. Because the
//! length lives in the type code, a longer magnitude always sorts after a
//! shorter one for positives and before it for negatives, which keeps
//! `i64::MIN < -1 < 0 < 1 < i64::MAX` in byte order.

mod decoding;
mod element;
mod encoding;
mod tuple_type;


pub use element::Element;
use snafu::Snafu;
pub use tuple_type::Tuple;

/// Null element.
const NULL_CODE: u8 = 0x00;

/// Byte string element.
const BYTES_CODE: u8 = 0x01;

/// UTF-8 string element.
const STRING_CODE: u8 = 0x02;

/// Smallest negative integer code (8-byte magnitude).
const NEG_INT_MIN_CODE: u8 = 0x0C;

/// Integer zero; pivot for the signed integer codes.
const INT_ZERO_CODE: u8 = 0x14;

/// Largest positive integer code (8-byte magnitude).
const POS_INT_MAX_CODE: u8 = 0x1C;

/// Follows an embedded `0x00` inside byte and string payloads.
const ESCAPE_BYTE: u8 = 0xFF;

/// Ends byte and string payloads.
const TERMINATOR: u8 = 0x00;

/// Errors that can occur while decoding a packed tuple.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TupleError {
    /// Input ended in the middle of an element.
    #[snafu(display("unexpected end of input at offset {offset}"))]
    UnexpectedEnd {
        /// Byte offset of the truncated element.
        offset: usize,
    },

    /// The type code is not one this codec produces.
    #[snafu(display("unknown type code 0x{code:02X} at offset {offset}"))]
    UnknownTypeCode {
        /// The offending code.
        code: u8,
        /// Byte offset of the code.
        offset: usize,
    },

    /// A string element did not hold valid UTF-8.
    #[snafu(display("invalid UTF-8 at offset {offset}: {source}"))]
    InvalidUtf8 {
        /// Byte offset of the string element.
        offset: usize,
        /// Underlying UTF-8 error.
        source: std::string::FromUtf8Error,
    },

    /// A byte or string element had no terminator.
    #[snafu(display("missing terminator for element at offset {offset}"))]
    MissingTerminator {
        /// Byte offset of the element.
        offset: usize,
    },

    /// An integer magnitude does not fit in an `i64`.
    #[snafu(display("integer overflow at offset {offset}"))]
    IntegerOverflow {
        /// Byte offset of the integer element.
        offset: usize,
    },
}
