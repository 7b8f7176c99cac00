mod assets;
mod audio;
mod clock;
mod config;
mod constants;
mod difficulty;
mod entities;
mod error;
mod game;
mod rendering;
mod session;
mod terminal_io;
mod types;

use std::env;
use std::io;
use std::process::ExitCode;
use crossterm::{
    cursor::{Hide, Show},
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, size, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use log::{error, info, warn};

use crate::assets::Assets;
use crate::audio::{AudioDevice, TerminalAudio};
use crate::clock::{Clock, FrameClock, SystemClock};
use crate::config::GameConfig;
use crate::constants::LOG_FILE;
use crate::error::{GameError, GameResult};
use crate::game::Game;
use crate::rendering::{OutputTarget, ScreenBuffer};
use crate::terminal_io::{InputSource, SimulatedInput};

/// Puts the terminal into game mode and restores it on drop, including on
/// error paths.
struct TerminalGuard {
    keyboard_enhanced: bool,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        info!("Attempting to enable raw mode.");
        enable_raw_mode().map_err(|e| { error!("Failed to enable raw mode: {}", e); e })?;
        let mut guard = TerminalGuard { keyboard_enhanced: false };

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide, EnableMouseCapture)
            .map_err(|e| { error!("Failed to prepare terminal: {}", e); e })?;
        if matches!(supports_keyboard_enhancement(), Ok(true)) {
            execute!(stdout, PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))?;
            guard.keyboard_enhanced = true;
            info!("Terminal reports key releases.");
        }
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        if self.keyboard_enhanced {
            let _ = execute!(stdout, PopKeyboardEnhancementFlags);
        }
        let _ = execute!(stdout, DisableMouseCapture, Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
        info!("Terminal restored.");
    }
}

fn open_audio(assets: &Assets, speakers: bool) -> Box<dyn AudioDevice> {
    #[cfg(feature = "audio")]
    {
        if speakers {
            match audio::RodioAudio::try_create(assets) {
                Ok(device) => return Box::new(device),
                Err(e) => warn!("Audio output unavailable ({}), falling back to terminal bell.", e),
            }
        }
    }
    Box::new(TerminalAudio::new(assets, speakers))
}

fn run(config: GameConfig) -> GameResult<()> {
    let assets = Assets::load(&config.assets_dir)?;
    let rng = match config.seed {
        Some(seed) => {
            info!("Using fixed seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    if let Some(view) = config.debug {
        info!("Debug mode enabled. Resolution {}x{}", view.width, view.height);
        let stdout_target = OutputTarget::ScreenBuffer(ScreenBuffer::new(view.width, view.height));
        let input = InputSource::Simulated(SimulatedInput::demo_script());
        let audio = open_audio(&assets, false);
        let clock: Box<dyn Clock> = Box::new(FrameClock::new(config.fps));
        let mut game = Game::new(config, assets, view.width, view.height, stdout_target, input, audio, clock, rng);
        return game.run();
    }

    let _terminal = TerminalGuard::enter()?;
    let (width, height) = size().map_err(|e| { error!("Failed to get terminal size: {}", e); e })?;
    info!("Terminal size: {}x{}", width, height);
    if height < 2 {
        warn!("Terminal is only {} row(s) tall; the HUD will overlap the play area.", height);
    }

    let audio = open_audio(&assets, true);
    let clock: Box<dyn Clock> = Box::new(SystemClock::new());
    let mut game = Game::new(
        config,
        assets,
        width,
        height,
        OutputTarget::Stdout(io::stdout()),
        InputSource::Terminal,
        audio,
        clock,
        rng,
    );
    game.run()
}

fn main() -> ExitCode {
    if let Err(e) = simple_logging::log_to_file(LOG_FILE, log::LevelFilter::Info) {
        eprintln!("space-scavenger: cannot open {}: {}", LOG_FILE, e);
        return ExitCode::FAILURE;
    }
    info!("Starting Space Scavenger.");

    let result = GameConfig::from_args(env::args().skip(1)).and_then(run);
    match result {
        Ok(()) => {
            info!("Exiting normally.");
            ExitCode::SUCCESS
        }
        Err(GameError::Usage(message)) => {
            eprintln!("{}", message);
            ExitCode::from(2)
        }
        Err(e) => {
            error!("Fatal: {}", e);
            eprintln!("space-scavenger: {}", e);
            ExitCode::FAILURE
        }
    }
}
