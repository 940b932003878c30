//! The gameplay engine: steering, trailing, apple consumption, and terminal
//! state detection
use super::components::{self, single, Position, SnakePart, SnakePartHead, Velocity};
use super::debug::head_position;
use super::direction::Direction;
use super::grid::{from_indices, get_map, to_indices, Cell, GridMap, SlotState};
use hecs::{Entity, World};
use rand::Rng;
use std::collections::HashMap;
use tracing::{debug, error, info};

/// Index of body segments by the cell they occupy
type BodyIndex = HashMap<Cell, (Entity, Direction)>;

fn body_index(world: &World, height: u16) -> BodyIndex {
    world
        .query::<(&Position, &SnakePart)>()
        .iter()
        .map(|(entity, (pos, part))| {
            (to_indices(*pos, height), (entity, part.facing_direction))
        })
        .collect()
}

/// Set the head's velocity from the most recent direction & boost intents,
/// unless the requested direction would reverse the snake into its own neck.
pub(crate) fn steer(world: &mut World) {
    let control = components::key_control(world);
    let Some(direction) = control.last_movement_key_down else {
        return;
    };
    let map = get_map(world);
    if is_going_backwards(world, &map, direction) {
        return;
    }
    let head = single::<SnakePartHead>(world);
    let Ok((part, vel)) = world.query_one_mut::<(&SnakePartHead, &mut Velocity)>(head) else {
        return;
    };
    let mut speed = part.speed;
    if control.boost_engaged {
        speed *= part.speed_boost_factor;
    }
    let (x, y) = direction.unit_vector();
    *vel = Velocity::new(x * speed, y * speed);
}

/// True if moving in `direction` would send the head straight back into the
/// segment it just left, i.e., the adjacent cell holds a body segment facing
/// the opposite way.
pub(crate) fn is_going_backwards(world: &World, map: &GridMap, direction: Direction) -> bool {
    let Some(head) = map.head() else {
        return false;
    };
    let neighbor = head.step(direction);
    if !map
        .get(neighbor)
        .is_some_and(|slot| slot.contains(SlotState::BODY))
    {
        return false;
    }
    world
        .query::<(&Position, &SnakePart)>()
        .iter()
        .any(|(_, (pos, part))| {
            to_indices(*pos, map.height()) == neighbor
                && part.facing_direction == direction.opposite()
        })
}

/// Move the body along behind the head, growing it if the head has reached
/// the apple, and then relocate the apple.  `previous` is the snapshot left
/// by the last call and is replaced with a fresh one.
pub(crate) fn apple_update<R: Rng>(world: &mut World, previous: &mut GridMap, rng: &mut R) {
    let map = get_map(world);
    let empty = map.empty_cells();
    let apple_eaten = map.any_contains(SlotState::HEAD | SlotState::APPLE);
    do_trailing(world, &map, previous, apple_eaten);
    if apple_eaten {
        debug!(score = components::body_len(world), "Apple eaten");
        respawn_apple(world, empty, rng);
    }
    *previous = get_map(world);
}

fn do_trailing(world: &mut World, map: &GridMap, previous: &GridMap, apple_eaten: bool) {
    let (Some(from), Some(to)) = (previous.head(), map.head()) else {
        return;
    };
    let Some(direction) = Direction::between(from, to) else {
        return;
    };
    let height = map.height();
    let bodies = body_index(world, height);
    if bodies.is_empty() && !apple_eaten {
        return;
    }
    let neck = to.step(direction.opposite());
    let _ = world.spawn((
        from_indices(neck, height),
        SnakePart {
            facing_direction: direction,
        },
    ));
    if bodies.is_empty() || apple_eaten {
        return;
    }
    let tail = find_tail(&bodies, neck);
    debug_assert!(
        tail.is_some(),
        "body chain should lead from the neck to a tail"
    );
    if let Some(tail) = tail {
        let _ = world.despawn(tail);
    } else {
        error!(?neck, "Body chain is broken; not shrinking the snake");
    }
}

/// Starting from the segment at `start`, walk towards the tail and return the
/// last segment.  Each step moves to the neighbor whose facing direction
/// points into the current cell.  `start` itself is not in `bodies`.
fn find_tail(bodies: &BodyIndex, start: Cell) -> Option<Entity> {
    let mut current = start;
    let mut tail = None;
    for _ in 0..bodies.len() {
        let older = Direction::ALL.into_iter().find_map(|d| {
            let cell = current.step(d.opposite());
            bodies
                .get(&cell)
                .filter(|&&(_, facing)| facing == d)
                .map(|&(entity, _)| (cell, entity))
        });
        let Some((cell, entity)) = older else {
            break;
        };
        current = cell;
        tail = Some(entity);
    }
    tail
}

/// Move the apple to a random cell from `candidates`, skipping any that the
/// body has since grown into.  If no candidate is left, the board is full and
/// the apple is removed.
fn respawn_apple<R: Rng>(world: &mut World, mut candidates: Vec<Cell>, rng: &mut R) {
    let Some(apple) = components::apple(world) else {
        return;
    };
    let height = components::boundary(world).height;
    while !candidates.is_empty() {
        let cell = candidates.swap_remove(rng.random_range(0..candidates.len()));
        if let Ok(mut pos) = world.get::<&mut Position>(apple) {
            *pos = from_indices(cell, height);
        }
        if !get_map(world)
            .get(cell)
            .is_some_and(|slot| slot.intersects(SlotState::HEAD | SlotState::BODY))
        {
            debug!(?cell, "Apple respawned");
            return;
        }
    }
    info!("No empty cells left; removing apple");
    let _ = world.despawn(apple);
}

/// True if every cell is covered by the snake
pub(crate) fn is_game_success(world: &World) -> bool {
    get_map(world)
        .cells()
        .all(|(_, slot)| slot.intersects(SlotState::HEAD | SlotState::BODY))
}

/// True if the head has left the board or run into the body
pub(crate) fn is_game_failure(world: &World) -> bool {
    let board = components::boundary(world);
    let pos = head_position(world);
    let inside = (0.0..f32::from(board.width)).contains(&pos.x)
        && (0.0..f32::from(board.height)).contains(&pos.y);
    !inside || get_map(world).any_contains(SlotState::HEAD | SlotState::BODY)
}
