pub mod cancel;
pub mod frame;
pub mod performance;
pub mod streamer;
pub mod waveform;

pub use cancel::CancellationToken;
pub use frame::{CycleStats, FrameGenerator};
pub use performance::{PerformanceMonitor, PerformanceSnapshot};
pub use streamer::MockStreamer;
pub use waveform::{BoxedWaveform, Waveform};
