//! Plain data records attached to entities in the simulation's
//! [`hecs::World`]
use super::direction::Direction;
use hecs::{Component, Entity, World};

/// Continuous coordinate in grid units.  Grid cell `n` (1-indexed) covers
/// `[n - 1, n)` on each axis, and `y` points up.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Position {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl Position {
    pub(crate) const fn new(x: f32, y: f32) -> Position {
        Position { x, y }
    }
}

/// Units per second
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Velocity {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl Velocity {
    pub(crate) const fn new(x: f32, y: f32) -> Velocity {
        Velocity { x, y }
    }
}

/// Fixed duration of one simulation tick
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct DeltaTime {
    pub(crate) dt_ms: u16,
}

/// The most recent movement & boost intents from the player
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct KeyControl {
    pub(crate) last_movement_key_down: Option<Direction>,

    /// Whether the boost key is physically held down
    pub(crate) is_shift_key_down: bool,

    /// Whether boosted speed applies.  Pressing boost engages it at once;
    /// releasing it only takes effect on the next direction key.
    pub(crate) boost_engaged: bool,
}

/// Dimensions of the playing field in cells
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct SnakeBoundary2D {
    pub(crate) width: u16,
    pub(crate) height: u16,
}

/// Marks the controllable head of the snake
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SnakePartHead {
    pub(crate) speed: f32,
    pub(crate) speed_boost_factor: f32,
}

/// A body segment, tagged with the direction the head was travelling when it
/// left this segment's cell
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct SnakePart {
    pub(crate) facing_direction: Direction,
}

/// Marks the entity holding the apple
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct SnakeApple;

/// Return the one entity carrying a `T`.
///
/// # Panics
///
/// Panics if no entity carries a `T`.  In debug builds, also panics if more
/// than one does.
pub(crate) fn single<T: Component>(world: &World) -> Entity {
    let entities = world
        .query::<&T>()
        .iter()
        .map(|(entity, _)| entity)
        .collect::<Vec<_>>();
    debug_assert_eq!(
        entities.len(),
        1,
        "exactly one {} should exist",
        std::any::type_name::<T>()
    );
    entities
        .first()
        .copied()
        .unwrap_or_else(|| panic!("a {} should exist", std::any::type_name::<T>()))
}

/// Return a copy of the one `T` in the world.
///
/// # Panics
///
/// Same conditions as [`single()`]
pub(crate) fn get_single<T: Component + Copy>(world: &World) -> T {
    let entity = single::<T>(world);
    *world
        .get::<&T>(entity)
        .expect("entity returned by query should carry the queried component")
}

pub(crate) fn boundary(world: &World) -> SnakeBoundary2D {
    get_single::<SnakeBoundary2D>(world)
}

pub(crate) fn key_control(world: &World) -> KeyControl {
    get_single::<KeyControl>(world)
}

/// Return the apple entity, if there still is one
pub(crate) fn apple(world: &World) -> Option<Entity> {
    let apples = world
        .query::<&SnakeApple>()
        .iter()
        .map(|(entity, _)| entity)
        .collect::<Vec<_>>();
    debug_assert!(apples.len() <= 1, "at most one apple should exist");
    apples.first().copied()
}

/// Number of body segments, i.e., the player's score
pub(crate) fn body_len(world: &World) -> usize {
    world.query::<&SnakePart>().iter().count()
}
