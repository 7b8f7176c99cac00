use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};
use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, KeyEventKind},
    style::Color,
};
use rand::rngs::StdRng;
use log::{debug, error, info, warn};

use crate::assets::Assets;
use crate::audio::AudioDevice;
use crate::clock::Clock;
use crate::config::GameConfig;
use crate::constants::KEY_HOLD_FRAMES;
use crate::error::GameResult;
use crate::rendering::{GameGrid, OutputTarget, Viewport};
use crate::session::{Session, SessionEvent, Status};
use crate::terminal_io::{handle_event, Command, InputSource, KeyState};

const GAME_OVER_MESSAGE: &str = "Game Over! Click to Restart.";
const WON_MESSAGE: &str = "You Won! Click to Restart.";
const CONTROLS_TEXT: &str = "Arrows/WASD: Move  Click/R: Restart  Q: Quit";

pub struct Game {
    pub terminal_width: u16,
    pub terminal_height: u16,
    pub stdout_target: OutputTarget,
    input: InputSource,
    audio: Box<dyn AudioDevice>,
    clock: Box<dyn Clock>,
    rng: StdRng,
    assets: Assets,
    config: GameConfig,
    session: Session,
    keys: KeyState,
    grid: GameGrid,
    frame_count: u64,
    debug_mode_active: bool,
}

impl Game {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: GameConfig,
        assets: Assets,
        terminal_width: u16,
        terminal_height: u16,
        stdout_target: OutputTarget,
        input: InputSource,
        audio: Box<dyn AudioDevice>,
        clock: Box<dyn Clock>,
        mut rng: StdRng,
    ) -> Self {
        let session = Session::new(config.rules, &mut rng, clock.now());
        let debug_mode_active = config.is_debug();
        Game {
            terminal_width,
            terminal_height,
            stdout_target,
            input,
            audio,
            clock,
            rng,
            assets,
            config,
            session,
            keys: KeyState::new(KEY_HOLD_FRAMES),
            grid: GameGrid::new(terminal_width, terminal_height),
            frame_count: 0,
            debug_mode_active,
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[cfg(test)]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn run(&mut self) -> GameResult<()> {
        if !self.debug_mode_active && !self.show_title_screen()? {
            info!("Quit from title screen.");
            return Ok(());
        }

        self.restart();
        let frame_budget = Duration::from_secs(1) / self.config.fps.max(1);

        loop {
            let frame_start = Instant::now();
            if !self.step()? {
                break;
            }
            if !self.debug_mode_active {
                if let Some(rest) = frame_budget.checked_sub(frame_start.elapsed()) {
                    thread::sleep(rest);
                }
            }
        }

        self.audio.stop_ambient();
        info!(
            "Game loop finished after {} frames ({:?}, {}/{} crystals).",
            self.frame_count,
            self.session.status(),
            self.session.collected(),
            self.session.initial_crystals()
        );
        Ok(())
    }

    /// Runs one frame. Returns `false` once the loop should stop.
    pub fn step(&mut self) -> GameResult<bool> {
        if self.max_frames_reached() {
            return Ok(false);
        }

        self.grid.clear();

        if !self.handle_input()? {
            return Ok(false);
        }

        let controls = self.keys.controls(self.frame_count);
        let events = self.session.tick(controls, self.clock.now(), &mut self.rng);
        self.dispatch(&events);

        self.draw();
        let log_frame = self.debug_mode_active && self.frame_count % u64::from(self.config.fps.max(1)) == 0;
        self.stdout_target.present(&self.grid, log_frame).map_err(|e| { error!("Failed to present frame: {}", e); e })?;

        self.clock.on_frame();
        self.frame_count += 1;
        Ok(true)
    }

    fn max_frames_reached(&self) -> bool {
        self.config.max_frames.is_some_and(|max| self.frame_count >= max)
    }

    fn handle_input(&mut self) -> GameResult<bool> {
        while let Some(event) = self.input.next_event(self.frame_count)? {
            match handle_event(&event, &mut self.keys, self.frame_count) {
                Some(Command::Quit) => {
                    info!("Quit requested at frame {}.", self.frame_count);
                    return Ok(false);
                }
                Some(Command::Restart) => {
                    if self.session.status().is_terminal() {
                        self.restart();
                    }
                }
                Some(Command::Resize(width, height)) => {
                    info!("Terminal resized to {}x{}", width, height);
                    self.terminal_width = width;
                    self.terminal_height = height;
                    self.grid.resize(width, height);
                }
                None => {}
            }
        }
        Ok(true)
    }

    /// Discards the current session and starts a fresh one with music.
    fn restart(&mut self) {
        if self.frame_count > 0 {
            info!("Restarting after {:?}.", self.session.status());
        }
        self.session = Session::new(self.config.rules, &mut self.rng, self.clock.now());
        self.keys.clear();
        if self.audio.ambient_playing() {
            self.audio.stop_ambient();
        }
        if let Err(e) = self.audio.start_ambient() {
            warn!("Background music failed to load ({}). The game will continue without it.", e);
        }
    }

    fn dispatch(&mut self, events: &[SessionEvent]) {
        for event in events {
            match event {
                SessionEvent::Crashed => {
                    self.audio.stop_ambient();
                    self.audio.play_crash();
                }
                SessionEvent::Won => self.audio.stop_ambient(),
                SessionEvent::CrystalCollected { remaining } => {
                    debug!("Crystal collected, {} remaining.", remaining);
                }
                SessionEvent::DifficultyIncreased { step, ship_speed_milli } => {
                    info!("Difficulty step {}: ship speed {:.3}", step, *ship_speed_milli as f64 / 1000.0);
                }
            }
        }
    }

    fn draw(&mut self) {
        let rules = &self.config.rules;
        let viewport = Viewport::new(rules.play_width, rules.play_height, self.grid.width, self.grid.height);
        let now = self.clock.now();

        viewport.draw(&mut self.grid, &self.assets.spaceship, self.session.ship().rect());
        for asteroid in self.session.asteroids() {
            viewport.draw(&mut self.grid, &self.assets.asteroid, asteroid.rect());
        }
        for crystal in self.session.crystals() {
            viewport.draw(&mut self.grid, &self.assets.energy_crystal, crystal.rect());
        }

        let status_line = format!(
            "Crystals: {}/{}  Time: {}s  Speed: {:.3}",
            self.session.collected(),
            self.session.initial_crystals(),
            self.session.elapsed_secs(now),
            self.session.ship().speed
        );
        self.grid.write_text(0, 0, &status_line);
        self.grid.write_text(0, self.grid.height as i32 - 1, CONTROLS_TEXT);

        let overlay = match self.session.status() {
            Status::Playing => None,
            Status::GameOver => Some((Color::Red, GAME_OVER_MESSAGE)),
            Status::Won => Some((Color::Blue, WON_MESSAGE)),
        };
        if let Some((color, message)) = overlay {
            self.grid.clear();
            self.grid.background = Some(color);
            let middle = self.grid.height as i32 / 2;
            self.grid.write_centered(middle, message);
            self.grid.write_centered(middle + 2, &status_line);
        }
    }

    /// Returns `false` if the player quit instead of starting.
    fn show_title_screen(&mut self) -> GameResult<bool> {
        let title_art = [
            r"SPACE SCAVENGER",
            r"  ___ ___  _   ___ ___ ",
            r" / __| _ \/_\ / __| __|",
            r" \__ \  _/ _ \ (__| _| ",
            r" |___/_|/_/ \_\___|___|",
            r"",
            r"Collect every crystal. Dodge the asteroids.",
        ];

        self.grid.clear_screen_manual(&mut self.stdout_target, self.terminal_width, self.terminal_height)?;
        let title_start_y = (self.terminal_height / 2).saturating_sub(title_art.len() as u16 / 2);
        for (i, line) in title_art.iter().enumerate() {
            let x = (self.terminal_width / 2).saturating_sub(line.len() as u16 / 2);
            self.stdout_target.execute_move_to(MoveTo(x, title_start_y + i as u16))?;
            write!(self.stdout_target, "{}", line)?;
        }

        let press_any_key_msg = "Press any key to start...";
        let msg_x = (self.terminal_width / 2).saturating_sub(press_any_key_msg.len() as u16 / 2);
        self.stdout_target.execute_move_to(MoveTo(msg_x, self.terminal_height.saturating_sub(5)))?;
        write!(self.stdout_target, "{}", press_any_key_msg)?;
        self.stdout_target.flush()?;
        info!("Title screen displayed. Waiting for key press.");

        loop {
            match event::read().map_err(|e| { error!("Failed to read event: {}", e); e })? {
                Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                    let quit = matches!(key_event.code, KeyCode::Char('q') | KeyCode::Esc);
                    self.grid.clear_screen_manual(&mut self.stdout_target, self.terminal_width, self.terminal_height)?;
                    self.stdout_target.flush()?;
                    return Ok(!quit);
                }
                Event::Resize(width, height) => {
                    self.terminal_width = width;
                    self.terminal_height = height;
                    self.grid.resize(width, height);
                }
                _ => {}
            }
        }
    }
}
