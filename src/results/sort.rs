//! Cell ordering for column sorts.

use std::cmp::Ordering;

use feruca::Collator;

use super::Cell;

/// Direction of a column sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Returns the opposite direction.
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// Cell comparator for one sort pass.
///
/// NULL sorts after every non-null value regardless of direction. Two
/// numbers compare numerically; any pair involving text compares the
/// rendered values with Unicode collation, so accents and case are
/// secondary to the base letter (`"Élodie"` sorts between `"Alice"` and
/// `"eve"`). The comparison type is chosen per pair, so a column may mix
/// numbers and text.
pub struct CellOrder {
    collator: Collator,
    direction: SortDirection,
}

impl CellOrder {
    pub fn new(direction: SortDirection) -> Self {
        Self {
            collator: Collator::default(),
            direction,
        }
    }

    pub fn compare(&mut self, a: &Cell, b: &Cell) -> Ordering {
        match (a, b) {
            (Cell::Null, Cell::Null) => Ordering::Equal,
            (Cell::Null, _) => Ordering::Greater,
            (_, Cell::Null) => Ordering::Less,
            (Cell::Number(x), Cell::Number(y)) => self
                .direction
                .apply(x.partial_cmp(y).unwrap_or(Ordering::Equal)),
            _ => {
                let ordering = self.collate(&a.export_text(), &b.export_text());
                self.direction.apply(ordering)
            }
        }
    }

    /// Collation order with lowercase first on a full tie, so that
    /// `"apple" < "banana" < "Banana"`.
    fn collate(&mut self, a: &str, b: &str) -> Ordering {
        self.collator.collate(a, b).then_with(|| b.cmp(a))
    }
}
