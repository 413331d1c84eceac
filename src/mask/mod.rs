mod ownership;

pub use ownership::{HeldMask, HoldCounts, MaskLedger};

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a mask, stable across clones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MaskId(Uuid);

impl fmt::Display for MaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Weighted set of pixel coordinates describing an in-progress stroke.
///
/// Each coordinate holds at most one weight in `1..=255`. Adding to a
/// coordinate that already has a weight keeps the larger of the two.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionMask {
    id: MaskId,
    samples: HashMap<(i32, i32), u8>,
}

impl SelectionMask {
    pub fn new() -> Self {
        Self {
            id: MaskId(Uuid::new_v4()),
            samples: HashMap::new(),
        }
    }

    pub fn id(&self) -> MaskId {
        self.id
    }

    /// Max-blends `weight` into `(x, y)`. Returns true if the stored weight changed.
    pub fn add(&mut self, x: i32, y: i32, weight: u8) -> bool {
        if weight == 0 {
            return false;
        }
        let stored = self.samples.entry((x, y)).or_insert(0);
        if weight > *stored {
            *stored = weight;
            true
        } else {
            false
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        self.samples.get(&(x, y)).copied()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, u8)> + '_ {
        self.samples.iter().map(|(&(x, y), &w)| (x, y, w))
    }

    /// Samples ordered by row then column
    pub fn to_sorted_vec(&self) -> Vec<(i32, i32, u8)> {
        let mut samples: Vec<_> = self.iter().collect();
        samples.sort_by_key(|&(x, y, _)| (y, x));
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_keeps_maximum_weight() {
        let mut mask = SelectionMask::new();
        assert!(mask.add(3, 4, 100));
        assert!(!mask.add(3, 4, 40));
        assert!(mask.add(3, 4, 200));

        assert_eq!(mask.get(3, 4), Some(200));
        assert_eq!(mask.len(), 1);
    }

    #[test]
    fn test_zero_weight_is_ignored() {
        let mut mask = SelectionMask::new();
        assert!(!mask.add(0, 0, 0));
        assert!(mask.is_empty());
    }

    #[test]
    fn test_sorted_vec_orders_rows_then_columns() {
        let mut mask = SelectionMask::new();
        mask.add(-2, 5, 10);
        mask.add(-2, 5, 90);
        mask.add(7, -1, 1);
        mask.add(3, 5, 4);

        assert_eq!(mask.to_sorted_vec(), vec![(7, -1, 1), (-2, 5, 90), (3, 5, 4)]);
    }

    #[test]
    fn test_clear_keeps_identity() {
        let mut mask = SelectionMask::new();
        let id = mask.id();
        mask.add(0, 0, 1);
        mask.clear();
        assert!(mask.is_empty());
        assert_eq!(mask.id(), id);
    }
}
