use std::cmp::Ordering;

use super::TupleError;
use super::decoding::Decoder;
use super::element::Element;

/// An ordered collection of typed elements that packs into sortable bytes.
///
/// ```
/// use aspen_layer::Tuple;
///
/// let a = Tuple::new().push(1i64).push(vec![0xFFu8]);
/// let b = Tuple::new().push(2i64).push(vec![0x00u8]);
/// assert!(a.pack() < b.pack());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Tuple {
    elements: Vec<Element>,
}

impl Tuple {
    /// Create an empty tuple.
    pub fn new() -> Self {
        Self { elements: Vec::new() }
    }

    /// Append an element (builder style).
    pub fn push<E: Into<Element>>(mut self, element: E) -> Self {
        self.elements.push(element.into());
        self
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    /// The element at `index` as an integer, if it is one.
    pub fn get_int(&self, index: usize) -> Option<i64> {
        self.get(index).and_then(Element::as_int)
    }

    /// The element at `index` as a byte string, if it is one.
    pub fn get_bytes(&self, index: usize) -> Option<&[u8]> {
        self.get(index).and_then(Element::as_bytes)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Pack into bytes that sort like the tuple itself.
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.elements.len() * 9);
        self.pack_into(&mut buf);
        buf
    }

    /// Pack onto the end of `buf`.
    pub fn pack_into(&self, buf: &mut Vec<u8>) {
        for element in &self.elements {
            element.encode_into(buf);
        }
    }

    /// Decode a tuple, consuming all of `data`.
    pub fn unpack(data: &[u8]) -> Result<Self, TupleError> {
        let mut decoder = Decoder::new(data);
        let mut elements = Vec::new();
        while !decoder.is_done() {
            elements.push(decoder.next_element()?);
        }
        Ok(Self { elements })
    }
}

impl PartialOrd for Tuple {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tuple {
    fn cmp(&self, other: &Self) -> Ordering {
        // Element-wise, shorter prefix first; this matches byte order of the packing.
        self.elements.iter().cmp(other.elements.iter())
    }
}

impl From<Vec<Element>> for Tuple {
    fn from(elements: Vec<Element>) -> Self {
        Self { elements }
    }
}
