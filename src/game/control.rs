//! Records the player's latest intents for the gameplay engine to pick up on
//! the next tick.  Nothing is validated here; repeated calls between ticks
//! simply overwrite each other.
use super::components::{single, KeyControl};
use super::direction::Direction;
use hecs::World;

fn with_key_control<F: FnOnce(&mut KeyControl)>(world: &mut World, f: F) {
    let entity = single::<KeyControl>(world);
    let mut control = world
        .get::<&mut KeyControl>(entity)
        .expect("entity returned by query should carry the queried component");
    f(&mut *control);
}

pub(crate) fn set_direction(world: &mut World, direction: Direction) {
    with_key_control(world, |control| {
        control.last_movement_key_down = Some(direction);
        control.boost_engaged = control.is_shift_key_down;
    });
}

pub(crate) fn set_boost(world: &mut World, down: bool) {
    with_key_control(world, |control| {
        control.is_shift_key_down = down;
        if down {
            control.boost_engaged = true;
        }
    });
}

pub(crate) fn up_key_down(world: &mut World) {
    set_direction(world, Direction::Up);
}

pub(crate) fn left_key_down(world: &mut World) {
    set_direction(world, Direction::Left);
}

pub(crate) fn down_key_down(world: &mut World) {
    set_direction(world, Direction::Down);
}

pub(crate) fn right_key_down(world: &mut World) {
    set_direction(world, Direction::Right);
}

pub(crate) fn shift_key_down(world: &mut World) {
    set_boost(world, true);
}

pub(crate) fn shift_key_up(world: &mut World) {
    set_boost(world, false);
}
