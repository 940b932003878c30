//! Introspection helpers for tests & diagnostics
use super::components::{single, Position, SnakePartHead, Velocity};
use super::grid::{get_map, GridMap, SlotState};
use hecs::World;
use std::fmt::{self, Write};

/// Return the head's position.
///
/// # Panics
///
/// Panics if there is no head
pub(crate) fn head_position(world: &World) -> Position {
    let head = single::<SnakePartHead>(world);
    *world
        .get::<&Position>(head)
        .expect("snake head should have a Position")
}

/// Return the head's velocity, or zero if it has none
pub(crate) fn head_velocity(world: &World) -> Velocity {
    let head = single::<SnakePartHead>(world);
    match world.get::<&Velocity>(head) {
        Ok(vel) => *vel,
        Err(_) => Velocity::default(),
    }
}

fn slot_symbol(slot: SlotState) -> char {
    if slot.contains(SlotState::HEAD) {
        '$'
    } else if slot.contains(SlotState::BODY) {
        'x'
    } else if slot.contains(SlotState::APPLE) {
        '@'
    } else {
        '.'
    }
}

impl fmt::Display for GridMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for (i, &slot) in row.iter().enumerate() {
                if i > 0 {
                    f.write_char(' ')?;
                }
                f.write_char(slot_symbol(slot))?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

/// Render the current map followed by the head's position & velocity
pub(crate) fn dump(world: &World) -> String {
    let pos = head_position(world);
    let vel = head_velocity(world);
    format!(
        "{}head at ({:.2}, {:.2}) moving ({:.2}, {:.2})\n",
        get_map(world),
        pos.x,
        pos.y,
        vel.x,
        vel.y
    )
}
