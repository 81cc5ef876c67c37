use snafu::ResultExt;

use super::BYTES_CODE;
use super::ESCAPE_BYTE;
use super::INT_ZERO_CODE;
use super::InvalidUtf8Snafu;
use super::NEG_INT_MIN_CODE;
use super::NULL_CODE;
use super::POS_INT_MAX_CODE;
use super::STRING_CODE;
use super::TERMINATOR;
use super::TupleError;
use super::element::Element;
use super::encoding::len_mask;

/// Reads elements one at a time from a packed tuple.
pub(super) struct Decoder<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Decoder<'a> {
    pub(super) fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub(super) fn is_done(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Decode the element starting at the current offset and advance past it.
    pub(super) fn next_element(&mut self) -> Result<Element, TupleError> {
        let start = self.offset;
        let code = *self.data.get(start).ok_or(TupleError::UnexpectedEnd { offset: start })?;
        self.offset += 1;

        match code {
            NULL_CODE => Ok(Element::Null),
            BYTES_CODE => Ok(Element::Bytes(self.read_escaped(start)?)),
            STRING_CODE => {
                let raw = self.read_escaped(start)?;
                let s = String::from_utf8(raw).context(InvalidUtf8Snafu { offset: start })?;
                Ok(Element::String(s))
            }
            INT_ZERO_CODE => Ok(Element::Int(0)),
            NEG_INT_MIN_CODE..=POS_INT_MAX_CODE => self.read_int(code, start).map(Element::Int),
            _ => Err(TupleError::UnknownTypeCode { code, offset: start }),
        }
    }

    /// Read an escaped payload up to (and past) its terminator.
    fn read_escaped(&mut self, start: usize) -> Result<Vec<u8>, TupleError> {
        let mut out = Vec::new();
        loop {
            let b = *self.data.get(self.offset).ok_or(TupleError::MissingTerminator { offset: start })?;
            self.offset += 1;
            if b != TERMINATOR {
                out.push(b);
                continue;
            }
            if self.data.get(self.offset) == Some(&ESCAPE_BYTE) {
                out.push(0x00);
                self.offset += 1;
                continue;
            }
            return Ok(out);
        }
    }

    fn read_int(&mut self, code: u8, start: usize) -> Result<i64, TupleError> {
        let negative = code < INT_ZERO_CODE;
        let len = if negative { INT_ZERO_CODE - code } else { code - INT_ZERO_CODE };

        let end = self.offset + len as usize;
        let raw = self.data.get(self.offset..end).ok_or(TupleError::UnexpectedEnd { offset: start })?;
        self.offset = end;

        let value = raw.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));

        if !negative {
            return i64::try_from(value).map_err(|_| TupleError::IntegerOverflow { offset: start });
        }

        let magnitude = len_mask(len) - value;
        if magnitude > i64::MIN.unsigned_abs() {
            return Err(TupleError::IntegerOverflow { offset: start });
        }
        Ok(0i64.wrapping_sub_unsigned(magnitude))
    }
}
