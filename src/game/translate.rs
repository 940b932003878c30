use super::components::{DeltaTime, Position, Velocity};
use hecs::World;

/// Advance every entity with both a `Position` and a `Velocity` by one tick.
/// Does nothing if the world has no `DeltaTime`.
pub(crate) fn update(world: &mut World) {
    let deltas = world
        .query::<&DeltaTime>()
        .iter()
        .map(|(_, dt)| dt.dt_ms)
        .collect::<Vec<_>>();
    let Some(&dt_ms) = deltas.first() else {
        return;
    };
    debug_assert_eq!(deltas.len(), 1, "at most one DeltaTime should exist");
    let secs = f32::from(dt_ms) / 1000.0;
    for (_, (pos, vel)) in world.query_mut::<(&mut Position, &Velocity)>() {
        pos.x += vel.x * secs;
        pos.y += vel.y * secs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_position(world: &World, x: f32, y: f32) {
        let pos = world
            .query::<&Position>()
            .iter()
            .map(|(_, &pos)| pos)
            .next()
            .unwrap();
        assert!(
            (pos.x - x).abs() < 1e-4 && (pos.y - y).abs() < 1e-4,
            "expected ({x}, {y}), got ({}, {})",
            pos.x,
            pos.y
        );
    }

    #[test]
    fn zero_velocity() {
        let mut world = World::new();
        let _ = world.spawn((Position::new(0.0, 0.0), Velocity::new(0.0, 0.0)));
        let _ = world.spawn((DeltaTime { dt_ms: 100 },));
        update(&mut world);
        assert_position(&world, 0.0, 0.0);
        for _ in 0..100 {
            update(&mut world);
        }
        assert_position(&world, 0.0, 0.0);
    }

    #[test]
    fn constant_velocity() {
        let mut world = World::new();
        let _ = world.spawn((Position::new(1.0, -2.0), Velocity::new(2.0, -0.5)));
        let _ = world.spawn((DeltaTime { dt_ms: 250 },));
        update(&mut world);
        assert_position(&world, 1.5, -2.125);
        for _ in 0..3 {
            update(&mut world);
        }
        assert_position(&world, 3.0, -2.5);
    }

    #[test]
    fn missing_delta_time_skips_translation() {
        let mut world = World::new();
        let _ = world.spawn((Position::new(1.0, 1.0), Velocity::new(5.0, 5.0)));
        update(&mut world);
        assert_position(&world, 1.0, 1.0);
    }

    #[test]
    fn entities_without_velocity_stay_put() {
        let mut world = World::new();
        let _ = world.spawn((DeltaTime { dt_ms: 1000 },));
        let _ = world.spawn((Position::new(4.0, 4.0),));
        update(&mut world);
        assert_position(&world, 4.0, 4.0);
    }
}
