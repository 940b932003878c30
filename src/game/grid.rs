//! Projection between continuous positions & discrete grid cells, and the
//! occupancy snapshot built on top of it
use super::components::{self, Position, SnakeApple, SnakePart, SnakePartHead};
use super::direction::Direction;
use hecs::World;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// A grid cell addressed by column & row, with row 0 at the top.  Either
/// coordinate may be negative or past the edge of the board.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct Cell {
    pub(crate) col: i32,
    pub(crate) row: i32,
}

impl Cell {
    pub(crate) const fn new(col: i32, row: i32) -> Cell {
        Cell { col, row }
    }

    pub(crate) fn step(self, direction: Direction) -> Cell {
        let (dc, dr) = direction.offset();
        Cell {
            col: self.col + dc,
            row: self.row + dr,
        }
    }
}

/// Map a continuous coordinate to its 1-indexed grid cell.  A coordinate lying
/// exactly on a grid line belongs to the cell above it, so every value in
/// `[n, n + 1)` maps to `n + 1`.
#[allow(clippy::cast_possible_truncation)]
fn grid_coord(v: f32) -> i32 {
    (v.floor() as i32).saturating_add(1)
}

/// Map a position to 1-indexed `(x, y)` grid cell numbers, counting from the
/// bottom-left
pub(crate) fn to_grid_cell(pos: Position) -> (i32, i32) {
    (grid_coord(pos.x), grid_coord(pos.y))
}

/// Map a position to the cell containing it on a board `height` cells tall
pub(crate) fn to_indices(pos: Position, height: u16) -> Cell {
    let (x, y) = to_grid_cell(pos);
    let row = if height == 1 { 0 } else { i32::from(height) - y };
    Cell { col: x - 1, row }
}

/// Return the center of the 1-indexed grid cell `(x, y)`
#[allow(clippy::cast_precision_loss)]
pub(crate) fn from_grid_cell(x: i32, y: i32) -> Position {
    Position::new(x as f32 - 0.5, y as f32 - 0.5)
}

/// Return the center of `cell` on a board `height` cells tall
pub(crate) fn from_indices(cell: Cell, height: u16) -> Position {
    from_grid_cell(cell.col + 1, i32::from(height) - cell.row)
}

/// Occupancy flags for a single cell.  Flags combine with `|`; test them with
/// [`SlotState::contains()`] & [`SlotState::intersects()`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub(crate) struct SlotState(u8);

impl SlotState {
    pub(crate) const EMPTY: SlotState = SlotState(0b000);
    pub(crate) const HEAD: SlotState = SlotState(0b001);
    pub(crate) const BODY: SlotState = SlotState(0b010);
    pub(crate) const APPLE: SlotState = SlotState(0b100);

    /// True if every flag in `other` is set in `self`
    pub(crate) fn contains(self, other: SlotState) -> bool {
        self & other == other
    }

    /// True if any flag in `other` is set in `self`
    pub(crate) fn intersects(self, other: SlotState) -> bool {
        (self & other).0 != 0
    }

    pub(crate) fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for SlotState {
    type Output = SlotState;

    fn bitor(self, rhs: SlotState) -> SlotState {
        SlotState(self.0 | rhs.0)
    }
}

impl BitOrAssign for SlotState {
    fn bitor_assign(&mut self, rhs: SlotState) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for SlotState {
    type Output = SlotState;

    fn bitand(self, rhs: SlotState) -> SlotState {
        SlotState(self.0 & rhs.0)
    }
}

/// A `height × width` snapshot of cell occupancy
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct GridMap {
    width: u16,
    height: u16,
    slots: Vec<SlotState>,
}

impl GridMap {
    /// Create a map with every cell empty
    pub(crate) fn new(width: u16, height: u16) -> GridMap {
        GridMap {
            width,
            height,
            slots: vec![SlotState::EMPTY; usize::from(width) * usize::from(height)],
        }
    }

    pub(crate) fn width(&self) -> u16 {
        self.width
    }

    pub(crate) fn height(&self) -> u16 {
        self.height
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        let col = usize::try_from(cell.col).ok()?;
        let row = usize::try_from(cell.row).ok()?;
        let width = usize::from(self.width);
        (col < width && row < usize::from(self.height)).then_some(row * width + col)
    }

    /// Return the flags at `cell`, or `None` if it is off the board
    pub(crate) fn get(&self, cell: Cell) -> Option<SlotState> {
        self.index(cell).map(|i| self.slots[i])
    }

    /// Add `flags` to `cell`.  Returns `false` and changes nothing if the cell
    /// is off the board.
    pub(crate) fn mark(&mut self, cell: Cell, flags: SlotState) -> bool {
        if let Some(i) = self.index(cell) {
            self.slots[i] |= flags;
            true
        } else {
            false
        }
    }

    /// Iterate over every cell in row-major order
    pub(crate) fn cells(&self) -> impl Iterator<Item = (Cell, SlotState)> + '_ {
        let width = i32::from(self.width);
        (0..i32::from(self.height))
            .flat_map(move |row| (0..width).map(move |col| Cell::new(col, row)))
            .zip(self.slots.iter().copied())
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = &[SlotState]> + '_ {
        self.slots.chunks(usize::from(self.width.max(1)))
    }

    /// Return the cell holding the snake's head, if it's on the board
    pub(crate) fn head(&self) -> Option<Cell> {
        self.cells()
            .find_map(|(cell, slot)| slot.contains(SlotState::HEAD).then_some(cell))
    }

    /// Return all cells with no flags set
    pub(crate) fn empty_cells(&self) -> Vec<Cell> {
        self.cells()
            .filter_map(|(cell, slot)| slot.is_empty().then_some(cell))
            .collect()
    }

    /// True if some cell has all of `flags` set
    pub(crate) fn any_contains(&self, flags: SlotState) -> bool {
        self.slots.iter().any(|&slot| slot.contains(flags))
    }
}

/// Build a fresh occupancy snapshot of the world.  Anything projecting off the
/// board is left out.
pub(crate) fn get_map(world: &World) -> GridMap {
    let boundary = components::boundary(world);
    let mut map = GridMap::new(boundary.width, boundary.height);
    for (_, (pos, _)) in world.query::<(&Position, &SnakePart)>().iter() {
        map.mark(to_indices(*pos, boundary.height), SlotState::BODY);
    }
    for (_, (pos, _)) in world.query::<(&Position, &SnakePartHead)>().iter() {
        map.mark(to_indices(*pos, boundary.height), SlotState::HEAD);
    }
    for (_, (pos, _)) in world.query::<(&Position, &SnakeApple)>().iter() {
        map.mark(to_indices(*pos, boundary.height), SlotState::APPLE);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::components::{KeyControl, SnakeBoundary2D, Velocity};
    use rstest::rstest;

    fn assert_position(actual: Position, x: f32, y: f32) {
        assert!(
            (actual.x - x).abs() < f32::EPSILON && (actual.y - y).abs() < f32::EPSILON,
            "expected ({x}, {y}), got ({}, {})",
            actual.x,
            actual.y
        );
    }

    #[rstest]
    #[case(0.0, 1)]
    #[case(0.1, 1)]
    #[case(1.0, 2)]
    #[case(4.99999, 5)]
    #[case(5.0, 6)]
    #[case(-0.5, 0)]
    #[case(-1.0, 0)]
    fn test_to_grid_cell(#[case] v: f32, #[case] n: i32) {
        assert_eq!(to_grid_cell(Position::new(v, v)), (n, n));
    }

    #[test]
    fn every_value_in_unit_interval_maps_to_upper_cell() {
        for n in -3..30 {
            for step in 0..10u8 {
                #[allow(clippy::cast_precision_loss)]
                let v = n as f32 + f32::from(step) / 10.0;
                assert_eq!(grid_coord(v), n + 1, "value {v}");
            }
        }
    }

    #[rstest]
    #[case(0, -0.5)]
    #[case(-1, -1.5)]
    #[case(1, 0.5)]
    #[case(-2, -2.5)]
    #[case(2, 1.5)]
    fn test_from_grid_cell(#[case] n: i32, #[case] v: f32) {
        assert_position(from_grid_cell(n, n), v, v);
    }

    // 3-by-3 board: (0, 0) is top-left, (0, 2) is bottom-left.
    #[rstest]
    #[case(Cell::new(0, 0), 0.5, 2.5)]
    #[case(Cell::new(1, 1), 1.5, 1.5)]
    #[case(Cell::new(2, 2), 2.5, 0.5)]
    #[case(Cell::new(0, 2), 0.5, 0.5)]
    #[case(Cell::new(2, 0), 2.5, 2.5)]
    #[case(Cell::new(1, 0), 1.5, 2.5)]
    #[case(Cell::new(0, 1), 0.5, 1.5)]
    #[case(Cell::new(2, 1), 2.5, 1.5)]
    #[case(Cell::new(1, 2), 1.5, 0.5)]
    fn test_from_indices(#[case] cell: Cell, #[case] x: f32, #[case] y: f32) {
        assert_position(from_indices(cell, 3), x, y);
    }

    #[test]
    fn indices_roundtrip() {
        for height in 1..=6u16 {
            for col in -2..8 {
                for row in 0..i32::from(height) {
                    let cell = Cell::new(col, row);
                    assert_eq!(to_indices(from_indices(cell, height), height), cell);
                }
            }
        }
    }

    #[test]
    fn single_row_board_forces_row_zero() {
        assert_eq!(to_indices(Position::new(1.5, 3.2), 1), Cell::new(1, 0));
        assert_eq!(to_indices(Position::new(0.5, -4.0), 1), Cell::new(0, 0));
    }

    #[test]
    fn slot_flags_combine() {
        let slot = SlotState::HEAD | SlotState::APPLE;
        assert!(slot.contains(SlotState::HEAD));
        assert!(slot.contains(SlotState::APPLE));
        assert!(!slot.contains(SlotState::BODY));
        assert!(!slot.contains(SlotState::HEAD | SlotState::BODY));
        assert!(slot.intersects(SlotState::HEAD | SlotState::BODY));
        assert!(!slot.is_empty());
        assert!(SlotState::EMPTY.is_empty());
    }

    fn fixture_world() -> World {
        let mut world = World::new();
        let _ = world.spawn((
            KeyControl::default(),
            SnakeBoundary2D {
                width: 6,
                height: 5,
            },
        ));
        let _ = world.spawn((
            Position::new(0.0, 0.0),
            Velocity::default(),
            SnakePartHead {
                speed: 1.0,
                speed_boost_factor: 1.5,
            },
        ));
        let mut body = |x: f32, y: f32, facing_direction: Direction| {
            let _ = world.spawn((Position::new(x, y), SnakePart { facing_direction }));
        };
        // . . . . x x
        // . . . . x .
        // . x x x x .
        // . x . . . .
        // $ x . . . .
        body(1.0, 0.0, Direction::Left);
        body(1.5, 1.0, Direction::Down);
        body(1.9, 2.5, Direction::Down);
        body(2.0, 2.5, Direction::Left);
        body(3.5, 2.5, Direction::Left);
        body(4.5, 2.5, Direction::Left);
        body(4.5, 3.5, Direction::Down);
        body(4.5, 4.5, Direction::Down);
        body(5.5, 4.5, Direction::Left);
        world
    }

    #[test]
    fn test_get_map() {
        let world = fixture_world();
        let mut expected = GridMap::new(6, 5);
        expected.mark(Cell::new(0, 4), SlotState::HEAD);
        for (col, row) in [
            (1, 4),
            (1, 3),
            (1, 2),
            (2, 2),
            (3, 2),
            (4, 2),
            (4, 1),
            (4, 0),
            (5, 0),
        ] {
            expected.mark(Cell::new(col, row), SlotState::BODY);
        }
        pretty_assertions::assert_eq!(get_map(&world), expected);
    }

    #[test]
    fn get_map_skips_off_board_projections() {
        let mut world = fixture_world();
        let _ = world.spawn((Position::new(-3.0, 9.0), SnakeApple));
        let map = get_map(&world);
        assert!(!map.any_contains(SlotState::APPLE));
        assert_eq!(map.head(), Some(Cell::new(0, 4)));
    }

    #[test]
    fn get_map_overlays_apple() {
        let mut world = fixture_world();
        let _ = world.spawn((from_indices(Cell::new(0, 4), 5), SnakeApple));
        let map = get_map(&world);
        assert_eq!(
            map.get(Cell::new(0, 4)),
            Some(SlotState::HEAD | SlotState::APPLE)
        );
        assert!(map.any_contains(SlotState::HEAD | SlotState::APPLE));
    }

    #[test]
    fn cells_are_row_major() {
        let mut map = GridMap::new(3, 2);
        map.mark(Cell::new(2, 0), SlotState::BODY);
        map.mark(Cell::new(0, 1), SlotState::APPLE);
        assert!(!map.mark(Cell::new(3, 0), SlotState::BODY));
        assert!(!map.mark(Cell::new(0, -1), SlotState::BODY));
        let cells = map.cells().collect::<Vec<_>>();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[2], (Cell::new(2, 0), SlotState::BODY));
        assert_eq!(cells[3], (Cell::new(0, 1), SlotState::APPLE));
        assert_eq!(
            map.empty_cells(),
            vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(1, 1), Cell::new(2, 1)]
        );
        assert_eq!(map.rows().count(), 2);
    }
}
