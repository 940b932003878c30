use crate::command::Command;
use crate::consts;
use crate::game::{Direction, GameStatus, GridMap, Simulation, SlotState};
use crossterm::event::{poll, read, Event};
use rand::Rng;
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Margin, Position, Rect, Size},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Widget},
    Terminal,
};
use std::io;
use std::time::{Duration, Instant};
use tracing::debug;

/// Terminal front end: feeds key presses into a [`Simulation`] and ticks it
/// at the scene's fixed rate
#[derive(Debug)]
pub(crate) struct App<R = rand::rngs::ThreadRng> {
    sim: Simulation<R>,
    tick_period: Duration,
    next_tick: Option<Instant>,
    quitting: bool,
}

impl<R: Rng> App<R> {
    pub(crate) fn new(sim: Simulation<R>) -> App<R> {
        let tick_period = Duration::from_millis(u64::from(sim.scene().tick_period_ms));
        App {
            sim,
            tick_period,
            next_tick: None,
            quitting: false,
        }
    }

    pub(crate) fn run<B: Backend>(mut self, mut terminal: Terminal<B>) -> io::Result<()> {
        while !self.quitting {
            terminal.draw(|frame| frame.render_widget(&self, frame.area()))?;
            self.process_input()?;
        }
        Ok(())
    }

    fn process_input(&mut self) -> io::Result<()> {
        if self.sim.status().is_over() {
            self.handle_event(read()?);
            return Ok(());
        }
        let when = *self
            .next_tick
            .get_or_insert_with(|| Instant::now() + self.tick_period);
        let wait = when.saturating_duration_since(Instant::now());
        if wait.is_zero() || !poll(wait)? {
            self.sim.tick();
            // Schedule from the previous deadline so that slow frames don't
            // make the game drift
            self.next_tick = Some(when + self.tick_period);
        } else {
            self.handle_event(read()?);
        }
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        let Some(cmd) = event.as_key_press_event().and_then(Command::from_key_event) else {
            return;
        };
        let running = !self.sim.status().is_over();
        match cmd {
            Command::Quit | Command::Q => self.quitting = true,
            Command::R => {
                debug!("Restarting game");
                self.sim.restart();
                self.next_tick = None;
            }
            Command::Up if running => self.sim.up_key_down(),
            Command::Left if running => self.sim.left_key_down(),
            Command::Down if running => self.sim.down_key_down(),
            Command::Right if running => self.sim.right_key_down(),
            // Terminals generally don't report key releases, so the boost is
            // toggled rather than held.
            Command::Space if running => {
                if self.sim.boost_key_held() {
                    self.sim.boost_key_up();
                } else {
                    self.sim.boost_key_down();
                }
            }
            _ => (),
        }
    }
}

impl<R> Widget for &App<R> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [score_area, block_area, msg1_area, msg2_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);
        let mut score_bar = format!(" Score: {}", self.sim.score());
        if self.sim.boosting() {
            score_bar.push_str("  [boost]");
        }
        Line::styled(score_bar, consts::SCORE_BAR_STYLE).render(score_area, buf);

        let map = self.sim.map();
        let block_size = Size {
            width: map.width().saturating_add(2),
            height: map.height().saturating_add(2),
        };
        let block_area = center_rect(block_area, block_size);
        Block::bordered().render(block_area, buf);
        let mut board = Canvas {
            area: block_area.inner(Margin::new(1, 1)),
            buf,
        };
        board.draw_map(&map, head_symbol(self.sim.heading()));

        let status = self.sim.status();
        let banner = match status {
            GameStatus::Running => return,
            GameStatus::Won => " — YOU WIN —",
            GameStatus::Lost => " — GAME OVER —",
        };
        Span::from(banner).render(msg1_area, buf);
        Line::from_iter([
            Span::raw(" Restart ("),
            Span::styled("r", consts::KEY_STYLE),
            Span::raw(") — Quit ("),
            Span::styled("q", consts::KEY_STYLE),
            Span::raw(")"),
        ])
        .render(msg2_area, buf);
    }
}

fn head_symbol(heading: Option<Direction>) -> char {
    match heading {
        Some(Direction::Up) => consts::SNAKE_HEAD_NORTH_SYMBOL,
        Some(Direction::Down) => consts::SNAKE_HEAD_SOUTH_SYMBOL,
        Some(Direction::Right) => consts::SNAKE_HEAD_EAST_SYMBOL,
        Some(Direction::Left) => consts::SNAKE_HEAD_WEST_SYMBOL,
        None => consts::SNAKE_HEAD_IDLE_SYMBOL,
    }
}

/// Return a `Rect` of the given size centered within `area`, clipped to
/// `area` if too large
fn center_rect(area: Rect, size: Size) -> Rect {
    let [area] = Layout::horizontal([size.width])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([size.height])
        .flex(Flex::Center)
        .areas(area);
    area
}

#[derive(Debug, Eq, PartialEq)]
struct Canvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl Canvas<'_> {
    fn draw_map(&mut self, map: &GridMap, head: char) {
        for (cell, slot) in map.cells() {
            let (Ok(x), Ok(y)) = (u16::try_from(cell.col), u16::try_from(cell.row)) else {
                continue;
            };
            let pos = Position::new(x, y);
            if slot.contains(SlotState::HEAD | SlotState::BODY) {
                self.draw_cell(pos, consts::COLLISION_SYMBOL, consts::COLLISION_STYLE);
            } else if slot.contains(SlotState::HEAD) {
                self.draw_cell(pos, head, consts::SNAKE_STYLE);
            } else if slot.contains(SlotState::BODY) {
                self.draw_cell(pos, consts::SNAKE_BODY_SYMBOL, consts::SNAKE_STYLE);
            } else if slot.contains(SlotState::APPLE) {
                self.draw_cell(pos, consts::APPLE_SYMBOL, consts::APPLE_STYLE);
            }
        }
    }

    fn draw_cell(&mut self, pos: Position, symbol: char, style: Style) {
        if pos.x >= self.area.width || pos.y >= self.area.height {
            return;
        }
        let Some(x) = self.area.x.checked_add(pos.x) else {
            return;
        };
        let Some(y) = self.area.y.checked_add(pos.y) else {
            return;
        };
        if let Some(cell) = self.buf.cell_mut((x, y)) {
            cell.set_char(symbol);
            cell.set_style(Style::reset().patch(style));
        }
    }
}
