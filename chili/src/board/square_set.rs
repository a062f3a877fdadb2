use std::fmt::{self, Debug};

use crate::bitset::bitset_traits;
use crate::{Square, NUM_SQUARES};

const MASK: u32 = (1 << NUM_SQUARES) - 1;

/// A [`Copy`] set of squares, one bit per square in row-major order.
///
/// Used for the pieces of one side and for reporting which squares changed
/// hands in a capture. Iteration yields the squares in row-major order.
///
/// Note that its "mutating" methods return a new object instead of really mutating.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SquareSet {
    bits: u32,
}

bitset_traits!(SquareSet, MASK);

impl SquareSet {
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    pub const fn full() -> Self {
        Self { bits: MASK }
    }

    #[must_use]
    pub const fn insert(self, sq: Square) -> Self {
        Self {
            bits: self.bits | (1 << sq.index()),
        }
    }

    #[must_use]
    pub const fn remove(self, sq: Square) -> Self {
        Self {
            bits: self.bits & !(1 << sq.index()),
        }
    }

    pub const fn contains(self, sq: Square) -> bool {
        self.bits & (1 << sq.index()) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    pub const fn len(self) -> u32 {
        self.bits.count_ones()
    }
}

impl FromIterator<Square> for SquareSet {
    fn from_iter<T: IntoIterator<Item = Square>>(iter: T) -> Self {
        iter.into_iter().fold(SquareSet::new(), SquareSet::insert)
    }
}

impl IntoIterator for SquareSet {
    type Item = Square;

    type IntoIter = SquareSetIter;

    fn into_iter(self) -> Self::IntoIter {
        SquareSetIter { bits: self.bits }
    }
}

pub struct SquareSetIter {
    bits: u32,
}

impl Iterator for SquareSetIter {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            return None;
        }
        let idx = self.bits.trailing_zeros() as usize;
        self.bits &= self.bits - 1;
        Some(Square::from_index(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.bits.count_ones() as usize;
        (n, Some(n))
    }
}

impl Debug for SquareSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.into_iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complement_stays_on_the_board() {
        let set = SquareSet::new().insert(Square::at(0, 0)).insert(Square::at(4, 4));
        let rest = !set;
        assert_eq!(rest.len(), 23);
        assert_eq!(rest | set, SquareSet::full());
        assert!((rest & set).is_empty());
    }

    #[test]
    fn iterates_in_row_major_order() {
        let squares = [Square::at(3, 1), Square::at(0, 4), Square::at(2, 2)];
        let set: SquareSet = squares.into_iter().collect();
        let collected: Vec<Square> = set.into_iter().collect();
        assert_eq!(
            collected,
            vec![Square::at(0, 4), Square::at(2, 2), Square::at(3, 1)]
        );
        assert!(!set.remove(Square::at(2, 2)).contains(Square::at(2, 2)));
    }
}
