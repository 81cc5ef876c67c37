//! Read request types.

/// Whether a read registers read-conflict ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// The read joins the transaction's read-conflict set.
    #[default]
    Serializable,
    /// The read is not conflict-checked at commit.
    Snapshot,
}

/// Positional lookup resolved by [`Transaction::get_key`](crate::Transaction::get_key).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySelector {
    /// Greatest key strictly less than the anchor.
    LastLessThan(Vec<u8>),
    /// Greatest key less than or equal to the anchor.
    LastLessOrEqual(Vec<u8>),
    /// Smallest key strictly greater than the anchor.
    FirstGreaterThan(Vec<u8>),
    /// Smallest key greater than or equal to the anchor.
    FirstGreaterOrEqual(Vec<u8>),
}

impl KeySelector {
    pub fn last_less_than(key: impl Into<Vec<u8>>) -> Self {
        KeySelector::LastLessThan(key.into())
    }

    pub fn last_less_or_equal(key: impl Into<Vec<u8>>) -> Self {
        KeySelector::LastLessOrEqual(key.into())
    }

    pub fn first_greater_than(key: impl Into<Vec<u8>>) -> Self {
        KeySelector::FirstGreaterThan(key.into())
    }

    pub fn first_greater_or_equal(key: impl Into<Vec<u8>>) -> Self {
        KeySelector::FirstGreaterOrEqual(key.into())
    }
}

/// Bounds and shape of a range read over `[begin, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeOptions {
    /// Inclusive start key.
    pub begin: Vec<u8>,
    /// Exclusive end key.
    pub end: Vec<u8>,
    /// Maximum pairs returned; 0 means no limit.
    pub limit: usize,
    /// Return pairs in descending key order.
    pub reverse: bool,
}

impl RangeOptions {
    /// Ascending, unlimited read of `[begin, end)`.
    pub fn new(begin: impl Into<Vec<u8>>, end: impl Into<Vec<u8>>) -> Self {
        Self {
            begin: begin.into(),
            end: end.into(),
            limit: 0,
            reverse: false,
        }
    }

    /// Ascending, unlimited read of a `(begin, end)` pair as returned by `Subspace::range`.
    pub fn from_range((begin, end): (Vec<u8>, Vec<u8>)) -> Self {
        Self::new(begin, end)
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }
}

/// A key and its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}
