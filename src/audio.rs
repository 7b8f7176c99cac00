use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use log::{info, warn};

use crate::assets::{Assets, SoundClip};
use crate::error::AudioError;

/// Sound output used by the frame loop. Every call is fire-and-forget;
/// only loading the ambient track can fail, and callers carry on without it.
pub trait AudioDevice {
    fn play_crash(&mut self);
    fn start_ambient(&mut self) -> Result<(), AudioError>;
    fn stop_ambient(&mut self);
    fn ambient_playing(&self) -> bool;
}

/// Terminal fallback: the crash is the terminal bell and the ambient track
/// is only validated and tracked, never heard.
pub struct TerminalAudio {
    crash_sound: SoundClip,
    music_path: PathBuf,
    ambient_playing: bool,
    bell: bool,
}

impl TerminalAudio {
    pub fn new(assets: &Assets, bell: bool) -> Self {
        TerminalAudio {
            crash_sound: assets.crash_sound.clone(),
            music_path: assets.background_music.clone(),
            ambient_playing: false,
            bell,
        }
    }
}

impl AudioDevice for TerminalAudio {
    fn play_crash(&mut self) {
        info!("Playing crash sound {} ({} bytes)", self.crash_sound.path.display(), self.crash_sound.bytes.len());
        if self.bell {
            let mut stdout = io::stdout();
            if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
                warn!("Failed to ring terminal bell: {}", e);
            }
        }
    }

    fn start_ambient(&mut self) -> Result<(), AudioError> {
        let bytes = fs::read(&self.music_path).map_err(|source| AudioError::Read {
            path: self.music_path.clone(),
            source,
        })?;
        info!("Ambient track {} loaded ({} bytes), looping.", self.music_path.display(), bytes.len());
        self.ambient_playing = true;
        Ok(())
    }

    fn stop_ambient(&mut self) {
        if self.ambient_playing {
            info!("Ambient track stopped.");
        }
        self.ambient_playing = false;
    }

    fn ambient_playing(&self) -> bool {
        self.ambient_playing
    }
}

#[cfg(feature = "audio")]
pub use self::speakers::RodioAudio;

#[cfg(feature = "audio")]
mod speakers {
    use std::fs::File;
    use std::io::{BufReader, Cursor};
    use std::path::PathBuf;

    use log::{info, warn};
    use rodio::source::Buffered;
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

    use super::AudioDevice;
    use crate::assets::Assets;
    use crate::error::AudioError;

    /// Real speaker output through rodio.
    pub struct RodioAudio {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        crash: Buffered<Decoder<Cursor<Vec<u8>>>>,
        music_path: PathBuf,
        music: Option<Sink>,
    }

    impl RodioAudio {
        pub fn try_create(assets: &Assets) -> Result<Self, AudioError> {
            let (_stream, handle) =
                OutputStream::try_default().map_err(|e| AudioError::Output(e.to_string()))?;
            let crash = Decoder::new(Cursor::new(assets.crash_sound.bytes.clone()))
                .map_err(|source| AudioError::Decode {
                    path: assets.crash_sound.path.clone(),
                    source,
                })?
                .buffered();
            Ok(RodioAudio {
                _stream,
                handle,
                crash,
                music_path: assets.background_music.clone(),
                music: None,
            })
        }
    }

    impl AudioDevice for RodioAudio {
        fn play_crash(&mut self) {
            if let Err(e) = self.handle.play_raw(self.crash.clone().convert_samples()) {
                warn!("Failed to play crash sound: {}", e);
            }
        }

        fn start_ambient(&mut self) -> Result<(), AudioError> {
            self.stop_ambient();
            let file = File::open(&self.music_path).map_err(|source| AudioError::Read {
                path: self.music_path.clone(),
                source,
            })?;
            let source = Decoder::new(BufReader::new(file)).map_err(|source| AudioError::Decode {
                path: self.music_path.clone(),
                source,
            })?;
            let sink = Sink::try_new(&self.handle).map_err(|e| AudioError::Output(e.to_string()))?;
            sink.append(source.repeat_infinite());
            self.music = Some(sink);
            info!("Ambient track {} looping.", self.music_path.display());
            Ok(())
        }

        fn stop_ambient(&mut self) {
            if let Some(sink) = self.music.take() {
                sink.stop();
            }
        }

        fn ambient_playing(&self) -> bool {
            self.music.is_some()
        }
    }
}

#[cfg(test)]
pub mod recording {
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    use super::AudioDevice;
    use crate::error::AudioError;

    #[derive(Debug, Default)]
    pub struct AudioLog {
        pub crashes: u32,
        pub ambient_starts: u32,
        pub ambient_stops: u32,
        pub ambient_playing: bool,
    }

    /// Records calls so tests can assert on side effects.
    pub struct RecordingAudio {
        pub log: Rc<RefCell<AudioLog>>,
        pub ambient_available: bool,
    }

    impl RecordingAudio {
        pub fn new(ambient_available: bool) -> (Self, Rc<RefCell<AudioLog>>) {
            let log = Rc::new(RefCell::new(AudioLog::default()));
            (RecordingAudio { log: Rc::clone(&log), ambient_available }, log)
        }
    }

    impl AudioDevice for RecordingAudio {
        fn play_crash(&mut self) {
            self.log.borrow_mut().crashes += 1;
        }

        fn start_ambient(&mut self) -> Result<(), AudioError> {
            if !self.ambient_available {
                return Err(AudioError::Read {
                    path: PathBuf::from("background_music.wav"),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }
            let mut log = self.log.borrow_mut();
            log.ambient_starts += 1;
            log.ambient_playing = true;
            Ok(())
        }

        fn stop_ambient(&mut self) {
            let mut log = self.log.borrow_mut();
            log.ambient_stops += 1;
            log.ambient_playing = false;
        }

        fn ambient_playing(&self) -> bool {
            self.log.borrow().ambient_playing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::Sprite;

    fn assets_with_music(music: PathBuf) -> Assets {
        let sprite = Sprite::parse("#").unwrap();
        Assets {
            spaceship: sprite.clone(),
            asteroid: sprite.clone(),
            energy_crystal: sprite,
            crash_sound: SoundClip { path: PathBuf::from("crash.wav"), bytes: vec![1, 2, 3] },
            background_music: music,
        }
    }

    #[test]
    fn missing_ambient_track_is_reported_not_fatal() {
        let assets = assets_with_music(PathBuf::from("/nonexistent/background_music.wav"));
        let mut audio = TerminalAudio::new(&assets, false);
        assert!(matches!(audio.start_ambient(), Err(AudioError::Read { .. })));
        assert!(!audio.ambient_playing());
        audio.play_crash();
        audio.stop_ambient();
    }

    #[test]
    fn ambient_track_starts_and_stops() {
        let path = std::env::temp_dir().join(format!("space-scavenger-music-{}.wav", std::process::id()));
        fs::write(&path, b"RIFF").unwrap();
        let mut audio = TerminalAudio::new(&assets_with_music(path.clone()), false);
        audio.start_ambient().unwrap();
        assert!(audio.ambient_playing());
        audio.stop_ambient();
        assert!(!audio.ambient_playing());
        fs::remove_file(path).unwrap();
    }
}
