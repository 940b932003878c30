use super::components::{
    DeltaTime, KeyControl, SnakeApple, SnakeBoundary2D, SnakePartHead, Velocity,
};
use super::direction::Direction;
use super::grid::{from_indices, Cell};
use crate::consts;
use hecs::World;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Everything needed to lay out a fresh game
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub(crate) struct SceneConfig {
    pub(crate) width: u16,
    pub(crate) height: u16,

    /// Head speed in cells per second
    pub(crate) speed: f32,

    /// Multiplier applied to `speed` while boosting
    pub(crate) speed_boost_factor: f32,

    pub(crate) tick_period_ms: u16,

    /// Starting cell of the head as `[column, row]`, with row 0 at the top
    pub(crate) head_start: (u16, u16),

    /// Starting cell of the apple, if any
    pub(crate) apple_start: Option<(u16, u16)>,

    pub(crate) initial_direction: Direction,
}

impl Default for SceneConfig {
    fn default() -> SceneConfig {
        let width = consts::DEFAULT_BOARD_SIZE.width;
        let height = consts::DEFAULT_BOARD_SIZE.height;
        SceneConfig {
            width,
            height,
            speed: consts::DEFAULT_SPEED,
            speed_boost_factor: consts::DEFAULT_SPEED_BOOST_FACTOR,
            tick_period_ms: consts::DEFAULT_TICK_PERIOD_MS,
            head_start: (0, height.saturating_sub(1)),
            apple_start: Some((width / 2, (height / 2).saturating_sub(1))),
            initial_direction: Direction::Up,
        }
    }
}

impl SceneConfig {
    /// Greatest distance in cells that the head can cover in one tick
    pub(crate) fn max_cells_per_tick(&self) -> f32 {
        self.speed * self.speed_boost_factor.max(1.0) * f32::from(self.tick_period_ms) / 1000.0
    }

    /// Check that the scene can be built and that the head can never skip a
    /// cell between ticks.
    pub(crate) fn validate(&self) -> Result<(), SceneError> {
        if self.width == 0 || self.height == 0 {
            return Err(SceneError::EmptyBoard {
                width: self.width,
                height: self.height,
            });
        }
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(SceneError::Speed(self.speed));
        }
        if !self.speed_boost_factor.is_finite() || self.speed_boost_factor < 1.0 {
            return Err(SceneError::BoostFactor(self.speed_boost_factor));
        }
        if self.tick_period_ms == 0 {
            return Err(SceneError::ZeroTickPeriod);
        }
        let cells = self.max_cells_per_tick();
        if cells > 1.0 {
            return Err(SceneError::TooFast { cells });
        }
        self.check_in_bounds("head", self.head_start)?;
        if let Some(apple) = self.apple_start {
            self.check_in_bounds("apple", apple)?;
            if apple == self.head_start {
                return Err(SceneError::AppleOnHead);
            }
        }
        Ok(())
    }

    fn check_in_bounds(&self, what: &'static str, (col, row): (u16, u16)) -> Result<(), SceneError> {
        if col < self.width && row < self.height {
            Ok(())
        } else {
            Err(SceneError::OutOfBounds { what, col, row })
        }
    }

    /// Spawn the scene's entities into `world`, which should be empty
    pub(super) fn build(&self, world: &mut World) {
        let _ = world.spawn((
            KeyControl {
                last_movement_key_down: Some(self.initial_direction),
                ..KeyControl::default()
            },
            SnakeBoundary2D {
                width: self.width,
                height: self.height,
            },
            DeltaTime {
                dt_ms: self.tick_period_ms,
            },
        ));
        if let Some((col, row)) = self.apple_start {
            let _ = world.spawn((
                from_indices(Cell::new(i32::from(col), i32::from(row)), self.height),
                SnakeApple,
            ));
        }
        let (col, row) = self.head_start;
        let _ = world.spawn((
            from_indices(Cell::new(i32::from(col), i32::from(row)), self.height),
            Velocity::default(),
            SnakePartHead {
                speed: self.speed,
                speed_boost_factor: self.speed_boost_factor,
            },
        ));
        info!(
            width = self.width,
            height = self.height,
            tick_ms = self.tick_period_ms,
            "Built scene"
        );
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub(crate) enum SceneError {
    #[error("board must be at least 1×1, got {width}×{height}")]
    EmptyBoard { width: u16, height: u16 },
    #[error("speed must be a non-negative number, got {0}")]
    Speed(f32),
    #[error("speed boost factor must be a number no less than 1, got {0}")]
    BoostFactor(f32),
    #[error("tick period must be nonzero")]
    ZeroTickPeriod,
    #[error("snake could travel {cells} cells in one tick; at most 1 is supported")]
    TooFast { cells: f32 },
    #[error("{what} start ({col}, {row}) is outside the board")]
    OutOfBounds {
        what: &'static str,
        col: u16,
        row: u16,
    },
    #[error("apple cannot start on the snake's head")]
    AppleOnHead,
}
