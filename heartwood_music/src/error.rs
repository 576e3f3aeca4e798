// Error types for the two fallible edges of the crate: loading a config
// file and writing a MIDI file. Everything between them is total.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("ticks_per_quarter {0} is outside 1..=32767")]
    Resolution(u16),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write MIDI file: {0}")]
    Io(#[from] std::io::Error),
    #[error("time signature denominator {0} is not a power of two")]
    TimeSignature(u8),
    #[error("ticks_per_quarter {0} does not fit an SMF header (1..=32767)")]
    Resolution(u16),
}
