// Interval index for one chromosome.
//
// Haplotype blocks come in small numbers per chromosome (tens to a few
// hundred), are inserted once and then queried many times. We keep them in a
// vector sorted by start and remember the longest interval seen, which bounds
// how far left of a query an overlapping interval can begin. A query is then
// two binary searches plus a scan of the candidates.
//
// All intervals are 0-based half-open [start, end).

/// Genomic coordinate. Signed so that negative input can be rejected by
/// validation instead of wrapping.
pub type Position = i64;

/// Upper bound used for "whole chromosome" scans. Larger than any real
/// chromosome.
pub const CHROM_MAX: Position = Position::MAX;

/// Anything with a half-open extent on a chromosome.
pub trait Span {
    fn start(&self) -> Position;
    fn end(&self) -> Position;

    fn len(&self) -> Position {
        self.end() - self.start()
    }

    fn is_empty(&self) -> bool {
        self.end() <= self.start()
    }

    /// Half-open containment of a single coordinate. A zero-width interval
    /// `[s, s)` contains `s`.
    fn contains(&self, pos: Position) -> bool {
        pos == self.start() || (self.start() < pos && pos < self.end())
    }

    /// Half-open overlap test against [start, end). A zero-width interval
    /// overlaps when its position lies in [start, end).
    fn overlaps(&self, start: Position, end: Position) -> bool {
        if self.is_empty() {
            start <= self.start() && self.start() < end
        } else {
            self.start() < end && self.end() > start
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntervalIndex<T> {
    // Sorted by start; equal starts keep insertion order.
    items: Vec<T>,
    max_len: Position,
}

impl<T> Default for IntervalIndex<T> {
    fn default() -> Self {
        IntervalIndex {
            items: Vec::new(),
            max_len: 0,
        }
    }
}

impl<T: Span> IntervalIndex<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an interval. Duplicates are allowed.
    pub fn insert(&mut self, item: T) {
        let start = item.start();
        let at = self.items.partition_point(|iv| iv.start() <= start);
        self.max_len = self.max_len.max(item.len());
        self.items.insert(at, item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All intervals, ascending by start.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Intervals overlapping [start, end), ascending by start.
    ///
    /// A zero-width query `[p, p)` is read as a point query and returns the
    /// intervals containing `p`. The caller is responsible for passing
    /// `start <= end`.
    pub fn query(&self, start: Position, end: Position) -> impl Iterator<Item = &T> + '_ {
        let point = start == end;
        // Nothing starting before `start - max_len` can reach `start`.
        let lo = self
            .items
            .partition_point(|iv| iv.start().saturating_add(self.max_len) < start);
        let hi = if point {
            self.items.partition_point(|iv| iv.start() <= start)
        } else {
            self.items.partition_point(|iv| iv.start() < end)
        };
        self.items[lo..hi.max(lo)].iter().filter(move |iv| {
            if point {
                iv.contains(start)
            } else {
                iv.overlaps(start, end)
            }
        })
    }
}

impl<'a, T> IntoIterator for &'a IntervalIndex<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
