//! Sibling ordering shared by routine items, exercise items and sets.
//!
//! Indices start dense at 0 and are only ever exchanged pairwise. Deleting a
//! sibling does not renumber the survivors, so callers must tolerate gaps.

use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sibling {
    pub id: i64,
    pub order_index: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    TowardTop,
    TowardBottom,
}

impl Direction {
    pub fn from_toward_top(toward_top: bool) -> Self {
        if toward_top {
            Direction::TowardTop
        } else {
            Direction::TowardBottom
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::TowardTop => "up",
            Direction::TowardBottom => "down",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapPlan {
    pub item: Sibling,
    pub neighbor: Sibling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingError {
    OutOfRange {
        index: i64,
        len: usize,
        direction: Direction,
    },
    SiblingNotFound {
        expected_index: i64,
    },
}

impl fmt::Display for OrderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderingError::OutOfRange {
                index,
                len,
                direction,
            } => write!(
                f,
                "cannot move {} from position {} of {}",
                direction.as_str(),
                index,
                len
            ),
            OrderingError::SiblingNotFound { expected_index } => {
                write!(f, "no sibling holds position {}", expected_index)
            }
        }
    }
}

impl Error for OrderingError {}

/// Where siblings live; implemented once per storage backend.
pub trait SiblingStore {
    type Error: From<OrderingError>;

    /// Live siblings under `parent_id`, ascending by index.
    fn siblings(&self, parent_id: i64) -> Result<Vec<Sibling>, Self::Error>;

    fn set_order_index(&self, id: i64, order_index: i64) -> Result<(), Self::Error>;
}

/// Index for a new last sibling: the sibling count on a dense sequence,
/// one past the highest index when earlier deletes left a gap.
pub fn next_index(siblings: &[Sibling]) -> i64 {
    let count = siblings.len() as i64;
    siblings
        .iter()
        .map(|sibling| sibling.order_index + 1)
        .max()
        .map_or(count, |after_last| after_last.max(count))
}

pub fn plan_swap(
    siblings: &[Sibling],
    item: Sibling,
    direction: Direction,
) -> Result<SwapPlan, OrderingError> {
    let len = siblings.len();
    let index = item.order_index;
    let target = match direction {
        Direction::TowardTop => {
            if index <= 0 {
                return Err(OrderingError::OutOfRange {
                    index,
                    len,
                    direction,
                });
            }
            index - 1
        }
        Direction::TowardBottom => {
            if index >= len as i64 - 1 {
                return Err(OrderingError::OutOfRange {
                    index,
                    len,
                    direction,
                });
            }
            index + 1
        }
    };

    let neighbor = siblings
        .iter()
        .find(|sibling| sibling.id != item.id && sibling.order_index == target)
        .copied()
        .ok_or(OrderingError::SiblingNotFound {
            expected_index: target,
        })?;

    Ok(SwapPlan { item, neighbor })
}

/// Exchanges `item` with its neighbour in `direction`; nothing is written
/// when the move is rejected.
pub fn swap_adjacent<S: SiblingStore>(
    store: &S,
    parent_id: i64,
    item: Sibling,
    direction: Direction,
) -> Result<SwapPlan, S::Error> {
    let siblings = store.siblings(parent_id)?;
    let plan = plan_swap(&siblings, item, direction)?;
    store.set_order_index(plan.neighbor.id, plan.item.order_index)?;
    store.set_order_index(plan.item.id, plan.neighbor.order_index)?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    struct MemorySiblings {
        rows: RefCell<Vec<Sibling>>,
        writes: RefCell<usize>,
    }

    impl MemorySiblings {
        fn dense(count: i64) -> Self {
            let rows = (0..count)
                .map(|index| Sibling {
                    id: 100 + index,
                    order_index: index,
                })
                .collect();
            Self {
                rows: RefCell::new(rows),
                writes: RefCell::new(0),
            }
        }

        fn get(&self, id: i64) -> Sibling {
            *self
                .rows
                .borrow()
                .iter()
                .find(|row| row.id == id)
                .expect("row should exist")
        }

        fn order(&self) -> Vec<i64> {
            let mut rows = self.rows.borrow().clone();
            rows.sort_by_key(|row| row.order_index);
            rows.into_iter().map(|row| row.id).collect()
        }
    }

    impl SiblingStore for MemorySiblings {
        type Error = OrderingError;

        fn siblings(&self, _parent_id: i64) -> Result<Vec<Sibling>, Self::Error> {
            let mut rows = self.rows.borrow().clone();
            rows.sort_by_key(|row| row.order_index);
            Ok(rows)
        }

        fn set_order_index(&self, id: i64, order_index: i64) -> Result<(), Self::Error> {
            *self.writes.borrow_mut() += 1;
            for row in self.rows.borrow_mut().iter_mut() {
                if row.id == id {
                    row.order_index = order_index;
                }
            }
            Ok(())
        }
    }

    #[test]
    fn next_index_is_count_for_dense_siblings() {
        assert_eq!(next_index(&[]), 0);
        let store = MemorySiblings::dense(3);
        assert_eq!(next_index(&store.rows.borrow()), 3);
    }

    #[test]
    fn next_index_skips_past_gap_left_by_delete() {
        let siblings = [
            Sibling {
                id: 1,
                order_index: 0,
            },
            Sibling {
                id: 3,
                order_index: 2,
            },
        ];
        assert_eq!(next_index(&siblings), 3);
    }

    #[test]
    fn move_up_then_down_restores_order() {
        let store = MemorySiblings::dense(4);
        let original = store.order();

        swap_adjacent(&store, 1, store.get(102), Direction::TowardTop).expect("up should work");
        assert_eq!(store.order(), vec![100, 102, 101, 103]);

        swap_adjacent(&store, 1, store.get(102), Direction::TowardBottom)
            .expect("down should work");
        assert_eq!(store.order(), original);
    }

    #[test]
    fn moving_top_item_up_fails_without_writes() {
        let store = MemorySiblings::dense(3);
        let err = swap_adjacent(&store, 1, store.get(100), Direction::TowardTop)
            .expect_err("top item cannot move up");
        assert!(matches!(err, OrderingError::OutOfRange { index: 0, .. }));
        assert_eq!(*store.writes.borrow(), 0);
    }

    #[test]
    fn moving_last_item_down_fails() {
        let store = MemorySiblings::dense(3);
        let err = swap_adjacent(&store, 1, store.get(102), Direction::TowardBottom)
            .expect_err("last item cannot move down");
        assert_eq!(
            err,
            OrderingError::OutOfRange {
                index: 2,
                len: 3,
                direction: Direction::TowardBottom
            }
        );
    }

    #[test]
    fn gap_reports_missing_sibling() {
        let siblings = [
            Sibling {
                id: 1,
                order_index: 0,
            },
            Sibling {
                id: 2,
                order_index: 2,
            },
            Sibling {
                id: 3,
                order_index: 3,
            },
        ];
        let err = plan_swap(&siblings, siblings[1], Direction::TowardTop)
            .expect_err("index 1 is missing");
        assert_eq!(err, OrderingError::SiblingNotFound { expected_index: 1 });
    }
}
