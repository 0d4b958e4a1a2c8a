pub mod buffer;
pub mod error;
pub mod params;

pub use buffer::SharedBuffer;
pub use error::{ConfigError, ConfigResult};
pub use params::StreamParams;

/// Complex baseband sample produced by the mock source.
pub type Sample = num_complex::Complex64;

/// Eviction bound a freshly constructed stream starts with.
pub const DEFAULT_MAX_BUFFER: usize = 16384;
