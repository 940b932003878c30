mod components;
mod control;
mod debug;
mod direction;
mod gameplay;
mod grid;
mod scene;
mod translate;
pub(crate) use self::direction::Direction;
pub(crate) use self::grid::{GridMap, SlotState};
pub(crate) use self::scene::SceneConfig;
use self::scene::SceneError;
use hecs::World;
use rand::Rng;
use std::fmt;
use tracing::{info, trace};

/// One step of the fixed-tick pipeline
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Stage {
    /// Turn the head according to the player's intents
    Steer,
    /// Move everything that has a velocity
    Translate,
    /// Drag the body after the head and deal with the apple
    Trail,
}

impl Stage {
    const PIPELINE: [Stage; 3] = [Stage::Steer, Stage::Translate, Stage::Trail];
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum GameStatus {
    Running,
    /// The snake covers the whole board
    Won,
    /// The head left the board or ran into the body
    Lost,
}

impl GameStatus {
    pub(crate) fn is_over(self) -> bool {
        self != GameStatus::Running
    }
}

/// The state of one game of snake: the entity world, the occupancy snapshot
/// from the end of the last tick, and the RNG used to place apples
pub(crate) struct Simulation<R = rand::rngs::ThreadRng> {
    world: World,
    previous_map: GridMap,
    rng: R,
    scene: SceneConfig,
}

impl Simulation<rand::rngs::ThreadRng> {
    pub(crate) fn new(scene: SceneConfig) -> Result<Self, SceneError> {
        Simulation::new_with_rng(scene, rand::rng())
    }
}

impl<R: Rng> Simulation<R> {
    pub(crate) fn new_with_rng(scene: SceneConfig, rng: R) -> Result<Simulation<R>, SceneError> {
        scene.validate()?;
        let mut world = World::new();
        scene.build(&mut world);
        let previous_map = grid::get_map(&world);
        Ok(Simulation {
            world,
            previous_map,
            rng,
            scene,
        })
    }

    /// Advance the game by one fixed tick.  Does nothing once the game is
    /// over.
    pub(crate) fn tick(&mut self) {
        if self.status().is_over() {
            return;
        }
        for stage in Stage::PIPELINE {
            self.run_stage(stage);
        }
        trace!("\n{}", debug::dump(&self.world));
        let status = self.status();
        if status.is_over() {
            info!(?status, score = self.score(), "Game over");
        }
    }

    fn run_stage(&mut self, stage: Stage) {
        match stage {
            Stage::Steer => gameplay::steer(&mut self.world),
            Stage::Translate => translate::update(&mut self.world),
            Stage::Trail => {
                gameplay::apple_update(&mut self.world, &mut self.previous_map, &mut self.rng);
            }
        }
    }

    /// Throw away the current game and lay out a fresh one from the same
    /// scene
    pub(crate) fn restart(&mut self) {
        self.world.clear();
        self.scene.build(&mut self.world);
        self.resync();
    }
}

impl<R> Simulation<R> {
    /// Recompute the retained snapshot from the world as it is now
    fn resync(&mut self) {
        self.previous_map = grid::get_map(&self.world);
    }

    pub(crate) fn status(&self) -> GameStatus {
        if gameplay::is_game_failure(&self.world) {
            GameStatus::Lost
        } else if gameplay::is_game_success(&self.world) {
            GameStatus::Won
        } else {
            GameStatus::Running
        }
    }

    pub(crate) fn map(&self) -> GridMap {
        grid::get_map(&self.world)
    }

    /// Number of body segments
    pub(crate) fn score(&self) -> usize {
        components::body_len(&self.world)
    }

    pub(crate) fn scene(&self) -> &SceneConfig {
        &self.scene
    }

    /// Direction the head is currently moving in, if any
    pub(crate) fn heading(&self) -> Option<Direction> {
        let vel = debug::head_velocity(&self.world);
        Direction::ALL.into_iter().find(|d| {
            let (x, y) = d.unit_vector();
            x * vel.x + y * vel.y > 0.0
        })
    }

    /// Whether boosted speed is in effect.  This can outlast the boost key
    /// itself until the next direction key.
    pub(crate) fn boosting(&self) -> bool {
        components::key_control(&self.world).boost_engaged
    }

    pub(crate) fn boost_key_held(&self) -> bool {
        components::key_control(&self.world).is_shift_key_down
    }

    pub(crate) fn up_key_down(&mut self) {
        control::up_key_down(&mut self.world);
    }

    pub(crate) fn left_key_down(&mut self) {
        control::left_key_down(&mut self.world);
    }

    pub(crate) fn down_key_down(&mut self) {
        control::down_key_down(&mut self.world);
    }

    pub(crate) fn right_key_down(&mut self) {
        control::right_key_down(&mut self.world);
    }

    pub(crate) fn boost_key_down(&mut self) {
        control::shift_key_down(&mut self.world);
    }

    pub(crate) fn boost_key_up(&mut self) {
        control::shift_key_up(&mut self.world);
    }
}

impl<R> fmt::Debug for Simulation<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("entities", &self.world.len())
            .field("previous_map", &self.previous_map)
            .field("scene", &self.scene)
            .finish_non_exhaustive()
    }
}
