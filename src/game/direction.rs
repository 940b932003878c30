use super::grid::Cell;
use serde::Deserialize;

/// A cardinal direction on the grid.  Rows grow downwards, so `Up` decreases
/// the row index while increasing the continuous `y` coordinate.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Direction {
    Up,
    Left,
    Down,
    Right,
}

impl Direction {
    pub(crate) const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    pub(crate) fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Left => Direction::Right,
            Direction::Down => Direction::Up,
            Direction::Right => Direction::Left,
        }
    }

    /// Column & row deltas for a single step in this direction
    pub(crate) fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Down => (0, 1),
            Direction::Right => (1, 0),
        }
    }

    /// Unit vector in continuous space, where `y` points up
    pub(crate) fn unit_vector(self) -> (f32, f32) {
        match self {
            Direction::Up => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Down => (0.0, -1.0),
            Direction::Right => (1.0, 0.0),
        }
    }

    /// Return the direction in which something moved to get from `from` to
    /// `to`.  Checks are made in the order up, left, down, right, and the
    /// first match wins; returns `None` if the cells are the same.
    pub(crate) fn between(from: Cell, to: Cell) -> Option<Direction> {
        if to.row < from.row {
            Some(Direction::Up)
        } else if to.col < from.col {
            Some(Direction::Left)
        } else if to.row > from.row {
            Some(Direction::Down)
        } else if to.col > from.col {
            Some(Direction::Right)
        } else {
            None
        }
    }
}
