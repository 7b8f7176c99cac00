use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("failed to load asset {path}: {source}")]
    Asset {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("sprite {path} contains no drawable rows")]
    EmptySprite { path: PathBuf },

    #[error("{0}")]
    Usage(String),
}

/// Failures of the audio collaborator. Only the ambient track is allowed to
/// fail at runtime; the game keeps running without it.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("could not read sound {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[cfg(feature = "audio")]
    #[error("could not decode sound {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },

    #[cfg(feature = "audio")]
    #[error("no audio output available: {0}")]
    Output(String),
}

pub type GameResult<T> = Result<T, GameError>;
