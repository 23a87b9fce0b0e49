//! Half-open location ranges over a bytecode stream.

use std::fmt;

use crate::{Error, Result};

/// A half-open span `[start, start + length)` of bytecode locations.
///
/// Ranges order by `(start, length)`, which matches the order of units in a code map.
///
/// # Examples
///
/// ```rust
/// use tclscope::CodeRange;
///
/// let range = CodeRange::new(10, 5);
/// assert_eq!(range.end(), 15);
/// assert!(range.contains(14));
/// assert!(!range.contains(15));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CodeRange {
    /// First location covered by the range
    pub start: u32,
    /// Number of locations covered
    pub length: u32,
}

impl CodeRange {
    /// Creates a range from its start and length.
    #[must_use]
    pub const fn new(start: u32, length: u32) -> Self {
        CodeRange { start, length }
    }

    /// Creates a range covering `[start, end)`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRange`] if `end < start`.
    pub fn from_bounds(start: u32, end: u32) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidRange { start, end });
        }

        Ok(CodeRange {
            start,
            length: end - start,
        })
    }

    /// First location past the range, clamped to `u32::MAX`.
    #[must_use]
    pub const fn end(&self) -> u32 {
        self.start.saturating_add(self.length)
    }

    /// Returns `true` if the range covers no locations.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns `true` if `location` lies inside `[start, end)`.
    #[must_use]
    pub const fn contains(&self, location: u32) -> bool {
        location >= self.start && location < self.end()
    }

    /// Returns `true` if `other` lies completely inside this range.
    #[must_use]
    pub const fn contains_range(&self, other: &CodeRange) -> bool {
        other.start >= self.start && other.end() <= self.end()
    }

    /// Returns `true` if both ranges share at least one location.
    #[must_use]
    pub const fn overlaps(&self, other: &CodeRange) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    /// The shared part of both ranges, if any.
    #[must_use]
    pub fn overlap(&self, other: &CodeRange) -> Option<CodeRange> {
        if !self.overlaps(other) {
            return None;
        }

        let start = self.start.max(other.start);
        let end = self.end().min(other.end());
        Some(CodeRange::new(start, end - start))
    }

    /// The shared part of both ranges, or an empty range at the later start.
    #[must_use]
    pub fn intersection(&self, other: &CodeRange) -> CodeRange {
        self.overlap(other)
            .unwrap_or_else(|| CodeRange::new(self.start.max(other.start), 0))
    }

    /// The smallest range covering both ranges.
    #[must_use]
    pub fn union(&self, other: &CodeRange) -> CodeRange {
        let start = self.start.min(other.start);
        let end = self.end().max(other.end());
        CodeRange::new(start, end - start)
    }
}

impl fmt::Display for CodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds() {
        let range = CodeRange::from_bounds(4, 9).unwrap();
        assert_eq!(range, CodeRange::new(4, 5));
        assert!(matches!(
            CodeRange::from_bounds(9, 4),
            Err(Error::InvalidRange { start: 9, end: 4 })
        ));
        assert!(CodeRange::from_bounds(3, 3).unwrap().is_empty());
    }

    #[test]
    fn end_of_address_space() {
        let range = CodeRange::new(u32::MAX - 1, 5);
        assert_eq!(range.end(), u32::MAX);
        assert!(range.contains(u32::MAX - 1));
        assert!(!range.contains(u32::MAX));
        assert_eq!(range.to_string(), format!("{}-{}", u32::MAX - 1, u32::MAX));
    }

    #[test]
    fn overlapping() {
        let a = CodeRange::new(0, 10);
        let b = CodeRange::new(5, 10);
        let c = CodeRange::new(10, 2);

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert_eq!(a.overlap(&b), Some(CodeRange::new(5, 5)));
        assert_eq!(a.overlap(&c), None);
        assert_eq!(a.intersection(&c), CodeRange::new(10, 0));
        assert_eq!(a.union(&c), CodeRange::new(0, 12));
        assert!(a.contains_range(&CodeRange::new(2, 8)));
        assert!(!a.contains_range(&b));
    }

    #[test]
    fn ordering() {
        let mut ranges = vec![
            CodeRange::new(5, 1),
            CodeRange::new(0, 3),
            CodeRange::new(5, 0),
        ];
        ranges.sort();
        assert_eq!(
            ranges,
            vec![CodeRange::new(0, 3), CodeRange::new(5, 0), CodeRange::new(5, 1)]
        );
        assert_eq!(CodeRange::new(3, 4).to_string(), "3-7");
    }
}
