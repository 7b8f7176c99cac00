// --- Play area ---
pub const PLAY_WIDTH: f64 = 800.0;
pub const PLAY_HEIGHT: f64 = 600.0;
pub const FPS: u32 = 60;

// --- Ship ---
pub const SHIP_SIZE: f64 = 40.0;
pub const SHIP_SPAWN_BOTTOM_OFFSET: f64 = 50.0; // Ship centre starts this far above the bottom edge
pub const SPACESHIP_SPEED: f64 = 5.0;
pub const SPACESHIP_SPEED_INCREMENT: f64 = 0.025;

// --- Asteroids ---
pub const ASTEROID_COUNT: usize = 5;
pub const ASTEROID_SPEED: f64 = 2.0;
pub const ASTEROID_SIZE: f64 = 50.0;
pub const MAX_ASTEROID_SIZE: f64 = 100.0;
pub const ASTEROID_GROWTH_RATE: f64 = 0.5;
pub const ASTEROID_COLLISION_MARGIN: f64 = 5.0; // Hitbox inset on every side

// --- Energy crystals ---
pub const CRYSTAL_SIZE: f64 = 25.0;
pub const ENERGY_CRYSTAL_MIN_COUNT: usize = 8;
pub const ENERGY_CRYSTAL_MAX_COUNT: usize = 15;

// --- Difficulty ---
pub const DIFFICULTY_INCREASE_STEP_SECS: u64 = 5;

// --- Input ---
pub const KEY_HOLD_FRAMES: u64 = 12; // Used when the terminal never reports key releases

// --- Assets and logging ---
pub const DEFAULT_ASSETS_DIR: &str = "assets";
pub const SPACESHIP_SPRITE_FILE: &str = "spaceship.txt";
pub const ASTEROID_SPRITE_FILE: &str = "asteroid.txt";
pub const CRYSTAL_SPRITE_FILE: &str = "energy_crystal.txt";
pub const CRASH_SOUND_FILE: &str = "clash_sound.wav";
pub const BACKGROUND_MUSIC_FILE: &str = "background_music.wav";
pub const LOG_FILE: &str = "space-scavenger.log";

// --- Debug mode ---
pub const DEBUG_WIDTH: u16 = 80;
pub const DEBUG_HEIGHT: u16 = 24;
