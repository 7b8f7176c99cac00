use std::path::PathBuf;

use crate::constants::*;
use crate::error::{GameError, GameResult};

pub const USAGE: &str = "usage: space-scavenger [FRAMES] [--assets DIR] [--seed N]\n       \
                         space-scavenger --debug [WIDTH HEIGHT [FRAMES]] [--assets DIR] [--seed N]";

/// Gameplay tuning for one session. Copied into every `Session` so a restart
/// always starts from the same base values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rules {
    pub play_width: f64,
    pub play_height: f64,
    pub ship_size: f64,
    pub ship_speed: f64,
    pub ship_speed_increment: f64,
    pub asteroid_count: usize,
    pub asteroid_speed: f64,
    pub asteroid_size: f64,
    pub max_asteroid_size: f64,
    pub asteroid_growth: f64,
    pub collision_margin: f64,
    pub crystal_size: f64,
    pub crystal_min_count: usize,
    pub crystal_max_count: usize,
    pub difficulty_step_secs: u64,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            play_width: PLAY_WIDTH,
            play_height: PLAY_HEIGHT,
            ship_size: SHIP_SIZE,
            ship_speed: SPACESHIP_SPEED,
            ship_speed_increment: SPACESHIP_SPEED_INCREMENT,
            asteroid_count: ASTEROID_COUNT,
            asteroid_speed: ASTEROID_SPEED,
            asteroid_size: ASTEROID_SIZE,
            max_asteroid_size: MAX_ASTEROID_SIZE,
            asteroid_growth: ASTEROID_GROWTH_RATE,
            collision_margin: ASTEROID_COLLISION_MARGIN,
            crystal_size: CRYSTAL_SIZE,
            crystal_min_count: ENERGY_CRYSTAL_MIN_COUNT,
            crystal_max_count: ENERGY_CRYSTAL_MAX_COUNT,
            difficulty_step_secs: DIFFICULTY_INCREASE_STEP_SECS,
        }
    }
}

/// Terminal size used by the headless debug renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebugView {
    pub width: u16,
    pub height: u16,
}

impl Default for DebugView {
    fn default() -> Self {
        DebugView { width: DEBUG_WIDTH, height: DEBUG_HEIGHT }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub rules: Rules,
    pub fps: u32,
    pub assets_dir: PathBuf,
    pub debug: Option<DebugView>,
    pub max_frames: Option<u64>,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            rules: Rules::default(),
            fps: FPS,
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
            debug: None,
            max_frames: None,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Parses command-line arguments, excluding the program name.
    pub fn from_args<I>(args: I) -> GameResult<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = GameConfig::default();
        let mut positional: Vec<String> = Vec::new();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--debug" => config.debug = Some(DebugView::default()),
                "--assets" => {
                    let dir = args.next().ok_or_else(|| usage("--assets needs a directory"))?;
                    config.assets_dir = PathBuf::from(dir);
                }
                "--seed" => {
                    let seed = args.next().ok_or_else(|| usage("--seed needs a number"))?;
                    config.seed = Some(parse_number(&seed, "seed")?);
                }
                "-h" | "--help" => return Err(GameError::Usage(USAGE.to_string())),
                flag if flag.starts_with("--") => {
                    return Err(usage(&format!("unknown option {}", flag)));
                }
                _ => positional.push(arg),
            }
        }

        match (config.debug.is_some(), positional.as_slice()) {
            (_, []) => {}
            (false, [frames]) => config.max_frames = Some(parse_number(frames, "frame count")?),
            (true, [width, height]) | (true, [width, height, _]) => {
                config.debug = Some(DebugView {
                    width: parse_number(width, "width")?,
                    height: parse_number(height, "height")?,
                });
                if let [_, _, frames] = positional.as_slice() {
                    config.max_frames = Some(parse_number(frames, "frame count")?);
                }
            }
            _ => return Err(usage("unexpected arguments")),
        }

        if let Some(view) = config.debug {
            if view.width == 0 || view.height < 2 {
                return Err(usage("debug view must be at least 1x2 cells"));
            }
        }

        Ok(config)
    }

    pub fn is_debug(&self) -> bool {
        self.debug.is_some()
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, what: &str) -> GameResult<T> {
    value
        .parse::<T>()
        .map_err(|_| usage(&format!("invalid {}: {}", what, value)))
}

fn usage(message: &str) -> GameError {
    GameError::Usage(format!("{}\n{}", message, USAGE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> GameResult<GameConfig> {
        GameConfig::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_arguments_gives_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.rules.asteroid_count, 5);
        assert_eq!(config.fps, 60);
    }

    #[test]
    fn single_number_is_frame_cap() {
        let config = parse(&["300"]).unwrap();
        assert_eq!(config.max_frames, Some(300));
        assert!(!config.is_debug());
    }

    #[test]
    fn debug_with_resolution_and_frames() {
        let config = parse(&["--debug", "40", "12", "90", "--seed", "7"]).unwrap();
        assert_eq!(config.debug, Some(DebugView { width: 40, height: 12 }));
        assert_eq!(config.max_frames, Some(90));
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn debug_without_resolution_uses_default_view() {
        let config = parse(&["--debug"]).unwrap();
        assert_eq!(config.debug, Some(DebugView::default()));
        assert_eq!(config.max_frames, None);
    }

    #[test]
    fn assets_directory_is_configurable() {
        let config = parse(&["--assets", "/tmp/sprites"]).unwrap();
        assert_eq!(config.assets_dir, PathBuf::from("/tmp/sprites"));
    }

    #[test]
    fn bad_arguments_are_usage_errors() {
        for args in [
            &["--debug", "40"][..],
            &["abc"][..],
            &["--fullscreen"][..],
            &["--seed"][..],
            &["1", "2"][..],
            &["--debug", "0", "10"][..],
        ] {
            assert!(matches!(parse(args), Err(GameError::Usage(_))), "{:?}", args);
        }
    }
}
