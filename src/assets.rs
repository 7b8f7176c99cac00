use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info};

use crate::constants::*;
use crate::error::{GameError, GameResult};
use crate::rendering::Sprite;

/// Raw bytes of a sound file, decoded by whichever audio device plays it.
#[derive(Clone, Debug, PartialEq)]
pub struct SoundClip {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// Everything the game needs from disk before the first frame. Missing
/// sprites or crash sound abort startup; the ambient track is only located
/// here and loaded later by the audio device, where failure is tolerated.
#[derive(Clone, Debug)]
pub struct Assets {
    pub spaceship: Sprite,
    pub asteroid: Sprite,
    pub energy_crystal: Sprite,
    pub crash_sound: SoundClip,
    pub background_music: PathBuf,
}

impl Assets {
    pub fn load(dir: &Path) -> GameResult<Self> {
        info!("Loading assets from {}", dir.display());
        let assets = Assets {
            spaceship: load_sprite(&dir.join(SPACESHIP_SPRITE_FILE))?,
            asteroid: load_sprite(&dir.join(ASTEROID_SPRITE_FILE))?,
            energy_crystal: load_sprite(&dir.join(CRYSTAL_SPRITE_FILE))?,
            crash_sound: load_sound(&dir.join(CRASH_SOUND_FILE))?,
            background_music: dir.join(BACKGROUND_MUSIC_FILE),
        };
        info!("Assets loaded.");
        Ok(assets)
    }
}

pub fn load_sprite(path: &Path) -> GameResult<Sprite> {
    let text = fs::read_to_string(path).map_err(|source| {
        error!("Failed to read sprite {}: {}", path.display(), source);
        GameError::Asset { path: path.to_path_buf(), source }
    })?;
    Sprite::parse(&text).ok_or_else(|| {
        error!("Sprite {} is empty", path.display());
        GameError::EmptySprite { path: path.to_path_buf() }
    })
}

pub fn load_sound(path: &Path) -> GameResult<SoundClip> {
    let bytes = fs::read(path).map_err(|source| {
        error!("Failed to read sound {}: {}", path.display(), source);
        GameError::Asset { path: path.to_path_buf(), source }
    })?;
    Ok(SoundClip { path: path.to_path_buf(), bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("space-scavenger-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_full_set(dir: &Path) {
        fs::write(dir.join(SPACESHIP_SPRITE_FILE), " /\\\n/##\\").unwrap();
        fs::write(dir.join(ASTEROID_SPRITE_FILE), "@@\n@@").unwrap();
        fs::write(dir.join(CRYSTAL_SPRITE_FILE), "<>").unwrap();
        fs::write(dir.join(CRASH_SOUND_FILE), b"RIFF").unwrap();
    }

    #[test]
    fn loads_complete_asset_directory() {
        let dir = scratch_dir("complete");
        write_full_set(&dir);
        let assets = Assets::load(&dir).unwrap();
        assert_eq!(assets.spaceship.width(), 4);
        assert_eq!(assets.crash_sound.bytes, b"RIFF");
        assert_eq!(assets.background_music, dir.join(BACKGROUND_MUSIC_FILE));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_required_asset_is_fatal() {
        let dir = scratch_dir("missing");
        write_full_set(&dir);
        fs::remove_file(dir.join(CRASH_SOUND_FILE)).unwrap();
        match Assets::load(&dir) {
            Err(GameError::Asset { path, .. }) => assert_eq!(path, dir.join(CRASH_SOUND_FILE)),
            other => panic!("expected asset error, got {:?}", other.map(|_| ())),
        }
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn blank_sprite_is_rejected() {
        let dir = scratch_dir("blank");
        write_full_set(&dir);
        fs::write(dir.join(ASTEROID_SPRITE_FILE), "  \n").unwrap();
        assert!(matches!(Assets::load(&dir), Err(GameError::EmptySprite { .. })));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn shipped_assets_are_complete() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_ASSETS_DIR);
        let assets = Assets::load(&dir).unwrap();
        assert!(assets.background_music.exists());
    }
}
