//! Child-list addressing.
//!
//! A [`Slice`] selects child positions either by a single (possibly
//! negative) index or by a `start:stop:step` range with the usual
//! clamping rules: out-of-range bounds are clipped, negative bounds count
//! from the end, and a negative step walks backwards.

use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo};

use crate::error::DomError;

/// A single index or an extended slice over a child list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slice {
    /// One position; negative values count from the end.
    Index(isize),
    /// Extended slice.
    Range {
        /// First position, `None` for "from the edge".
        start: Option<isize>,
        /// Exclusive end, `None` for "to the edge".
        stop: Option<isize>,
        /// Stride; must not be zero.
        step: isize,
    },
}

impl Slice {
    /// `[start:stop:step]`.
    #[must_use]
    pub const fn new(start: Option<isize>, stop: Option<isize>, step: isize) -> Self {
        Self::Range { start, stop, step }
    }

    /// `[:]`.
    #[must_use]
    pub const fn all() -> Self {
        Self::new(None, None, 1)
    }

    /// `[::step]`.
    #[must_use]
    pub const fn every(step: isize) -> Self {
        Self::new(None, None, step)
    }

    /// Resolve against a list of `len` children.
    ///
    /// Range slices never fail except for a zero step; an out-of-range
    /// single index fails.
    pub fn indices(&self, len: usize) -> Result<Vec<usize>, DomError> {
        let n = isize::try_from(len).unwrap_or(isize::MAX);
        match *self {
            Self::Index(index) => {
                let resolved = if index < 0 { index + n } else { index };
                if (0..n).contains(&resolved) {
                    Ok(vec![resolved.unsigned_abs()])
                } else {
                    Err(DomError::IndexOutOfRange { index, len })
                }
            }
            Self::Range { start, stop, step } => {
                if step == 0 {
                    return Err(DomError::ZeroStep);
                }
                let (lower, upper) = if step < 0 { (-1, n - 1) } else { (0, n) };
                let clamp = |bound: isize| {
                    if bound < 0 {
                        (bound + n).max(lower)
                    } else {
                        bound.min(upper)
                    }
                };
                let start = start.map_or(if step < 0 { upper } else { lower }, clamp);
                let stop = stop.map_or(if step < 0 { lower } else { upper }, clamp);
                let mut out = Vec::new();
                let mut i = start;
                while (step > 0 && i < stop) || (step < 0 && i > stop) {
                    out.push(i.unsigned_abs());
                    match i.checked_add(step) {
                        Some(next) => i = next,
                        None => break,
                    }
                }
                Ok(out)
            }
        }
    }
}

impl From<usize> for Slice {
    fn from(index: usize) -> Self {
        Self::Index(isize::try_from(index).unwrap_or(isize::MAX))
    }
}

fn bound(value: usize) -> Option<isize> {
    Some(isize::try_from(value).unwrap_or(isize::MAX))
}

impl From<Range<usize>> for Slice {
    fn from(range: Range<usize>) -> Self {
        Self::new(bound(range.start), bound(range.end), 1)
    }
}

impl From<RangeInclusive<usize>> for Slice {
    fn from(range: RangeInclusive<usize>) -> Self {
        Self::new(bound(*range.start()), bound(range.end().saturating_add(1)), 1)
    }
}

impl From<RangeFrom<usize>> for Slice {
    fn from(range: RangeFrom<usize>) -> Self {
        Self::new(bound(range.start), None, 1)
    }
}

impl From<RangeTo<usize>> for Slice {
    fn from(range: RangeTo<usize>) -> Self {
        Self::new(None, bound(range.end), 1)
    }
}

impl From<RangeFull> for Slice {
    fn from(_: RangeFull) -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_index() {
        assert_eq!(Slice::Index(2).indices(5), Ok(vec![2]));
        assert_eq!(Slice::Index(-1).indices(5), Ok(vec![4]));
        assert_eq!(
            Slice::Index(5).indices(5),
            Err(DomError::IndexOutOfRange { index: 5, len: 5 })
        );
        assert_eq!(
            Slice::Index(-6).indices(5),
            Err(DomError::IndexOutOfRange { index: -6, len: 5 })
        );
    }

    #[test]
    fn test_forward_ranges() {
        assert_eq!(Slice::from(0..3).indices(10), Ok(vec![0, 1, 2]));
        assert_eq!(Slice::every(2).indices(5), Ok(vec![0, 2, 4]));
        assert_eq!(Slice::new(Some(1), Some(9), 4).indices(10), Ok(vec![1, 5]));
        assert_eq!(Slice::from(3..100).indices(5), Ok(vec![3, 4]));
        assert_eq!(Slice::new(Some(-2), None, 1).indices(5), Ok(vec![3, 4]));
        assert_eq!(Slice::from(4..2).indices(5), Ok(vec![]));
    }

    #[test]
    fn test_backward_ranges() {
        assert_eq!(
            Slice::new(Some(9), Some(0), -2).indices(10),
            Ok(vec![9, 7, 5, 3, 1])
        );
        assert_eq!(Slice::every(-1).indices(3), Ok(vec![2, 1, 0]));
        assert_eq!(Slice::new(Some(100), None, -3).indices(5), Ok(vec![4, 1]));
    }

    #[test]
    fn test_huge_steps_stop_after_first() {
        assert_eq!(Slice::new(Some(1), None, isize::MAX).indices(5), Ok(vec![1]));
        assert_eq!(Slice::every(isize::MAX).indices(5), Ok(vec![0]));
        assert_eq!(Slice::every(isize::MIN).indices(5), Ok(vec![4]));
        assert_eq!(Slice::new(Some(-1), None, isize::MIN + 1).indices(3), Ok(vec![2]));
    }

    #[test]
    fn test_zero_step() {
        assert_eq!(Slice::every(0).indices(3), Err(DomError::ZeroStep));
    }
}
