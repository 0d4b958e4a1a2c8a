pub mod config;
pub mod error;
pub mod streaming;

pub use config::{MockConfig, WaveformKind};
pub use error::{StreamError, StreamResult};
pub use streaming::{MockStreamer, Waveform};
