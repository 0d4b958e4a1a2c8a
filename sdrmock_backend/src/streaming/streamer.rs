//! Background sample source that imitates a radio driver's receive stream.
//!
//! The streamer owns a waveform behind a swap slot and a single generation thread.
//! Every `frame_size / rate` seconds the thread wakes up, generates one frame under
//! the buffer and waveform locks, and goes back to sleep with no lock held.
//!
//! Stopping is cooperative: the thread checks its cancellation token once per cycle,
//! so `stop()` can take up to one sleep interval plus one frame to return. There is
//! no timeout; a waveform that never returns keeps `stop()` waiting forever.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::atomic::AtomicCell;
use parking_lot::Mutex;
use sdrmock_core::{DEFAULT_MAX_BUFFER, SharedBuffer, StreamParams};
use tracing::{debug, error, info};

use super::cancel::CancellationToken;
use super::frame::FrameGenerator;
use super::performance::{PerformanceMonitor, PerformanceSnapshot};
use super::waveform::{BoxedWaveform, Waveform};
use crate::error::{StreamError, StreamResult};

const THREAD_NAME: &str = "sdrmock-stream";
const PERF_EMA_ALPHA: f64 = 0.1;

/// Mock receive stream.
///
/// Construction never validates its parameters. A positive, finite rate and a
/// non-zero frame size are preconditions; see `StreamParams::validate`.
pub struct MockStreamer {
    params: StreamParams,
    buffer: SharedBuffer,

    /// Active waveform, swappable while the stream runs.
    waveform: Arc<Mutex<BoxedWaveform>>,

    /// Eviction bound, read by the worker at the start of every cycle.
    max_buffer: Arc<AtomicCell<usize>>,

    monitor: Arc<PerformanceMonitor>,
    session: Option<Session>,
}

struct Session {
    token: CancellationToken,
    worker: JoinHandle<()>,
}

impl MockStreamer {
    pub fn new(
        waveform: impl Waveform,
        rate: f64,
        center_freq: f64,
        gain: f64,
        frame_size: usize,
    ) -> Self {
        Self::from_params(waveform, StreamParams::new(rate, center_freq, gain, frame_size))
    }

    pub fn from_params(waveform: impl Waveform, params: StreamParams) -> Self {
        Self::from_boxed(Box::new(waveform), params)
    }

    pub fn from_boxed(waveform: BoxedWaveform, params: StreamParams) -> Self {
        Self {
            params,
            buffer: SharedBuffer::with_capacity(DEFAULT_MAX_BUFFER),
            waveform: Arc::new(Mutex::new(waveform)),
            max_buffer: Arc::new(AtomicCell::new(DEFAULT_MAX_BUFFER)),
            monitor: Arc::new(PerformanceMonitor::new(&params, PERF_EMA_ALPHA)),
            session: None,
        }
    }

    /// Change the eviction bound. Applies from the next generation cycle.
    pub fn set_max_buffer(&self, max_samples: usize) {
        self.max_buffer.store(max_samples);
    }

    pub fn max_buffer(&self) -> usize {
        self.max_buffer.load()
    }

    /// Spawn the generation thread and return without waiting for samples.
    ///
    /// Each session restarts stream time at 0.0 and clears the performance counters.
    /// Starting an already running stream
    /// is refused with `StreamError::AlreadyStreaming`; the running session is left
    /// untouched.
    pub fn start(&mut self) -> StreamResult<()> {
        if self.session.is_some() {
            return Err(StreamError::AlreadyStreaming);
        }

        self.monitor.reset_all();
        let token = CancellationToken::new();
        let worker = Worker {
            params: self.params,
            generator: FrameGenerator::new(&self.params),
            buffer: self.buffer.clone(),
            waveform: Arc::clone(&self.waveform),
            max_buffer: Arc::clone(&self.max_buffer),
            monitor: Arc::clone(&self.monitor),
        };

        let worker_token = token.clone();
        let handle = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || worker.run(worker_token))
            .map_err(StreamError::Spawn)?;

        debug!(params = %self.params, max_buffer = self.max_buffer(), "mock stream started");
        self.session = Some(Session { token, worker: handle });
        Ok(())
    }

    /// Replace the waveform used for generation.
    ///
    /// Blocks while a frame is being generated, so a frame never mixes two waveforms.
    /// The previous waveform is dropped after the lock is released.
    pub fn set_waveform(&self, waveform: impl Waveform) {
        self.set_boxed_waveform(Box::new(waveform));
    }

    pub fn set_boxed_waveform(&self, waveform: BoxedWaveform) {
        let previous = std::mem::replace(&mut *self.waveform.lock(), waveform);
        drop(previous);
        debug!("waveform swapped");
    }

    /// Signal the generation thread to finish and wait for it.
    ///
    /// Once this returns no more samples are appended to the buffer.
    pub fn stop(&mut self) -> StreamResult<()> {
        let session = self.session.take().ok_or(StreamError::NotStreaming)?;
        session.token.cancel();
        session
            .worker
            .join()
            .map_err(|_| StreamError::WorkerPanicked)?;
        debug!("mock stream stopped");
        Ok(())
    }

    pub fn is_streaming(&self) -> bool {
        self.session.is_some()
    }

    /// Shared handle to the sample buffer for consumers.
    pub fn buffer(&self) -> SharedBuffer {
        self.buffer.clone()
    }

    pub fn params(&self) -> &StreamParams {
        &self.params
    }

    /// Metrics of the current session, or of the last one once stopped.
    pub fn performance(&self) -> PerformanceSnapshot {
        self.monitor.snapshot(false)
    }

    pub fn reset_performance(&self) {
        self.monitor.reset_all();
    }
}

impl Drop for MockStreamer {
    fn drop(&mut self) {
        if self.session.is_some() {
            if let Err(e) = self.stop() {
                error!(error = %e, "mock stream did not shut down cleanly");
            }
        }
    }
}

/// Everything the generation thread owns for one session.
struct Worker {
    params: StreamParams,
    generator: FrameGenerator,
    buffer: SharedBuffer,
    waveform: Arc<Mutex<BoxedWaveform>>,
    max_buffer: Arc<AtomicCell<usize>>,
    monitor: Arc<PerformanceMonitor>,
}

impl Worker {
    fn run(mut self, token: CancellationToken) {
        let Some(interval) = self.params.frame_interval() else {
            error!(
                rate = self.params.rate,
                frame_size = self.params.frame_size,
                "frame interval is not a valid duration, generation loop not started"
            );
            return;
        };

        while !token.is_cancelled() {
            thread::sleep(interval);

            let stats = {
                let _timing = self.monitor.scoped_cycle();
                self.generator
                    .run_cycle(&self.buffer, &self.waveform, self.max_buffer.load())
            };
            self.monitor.record_cycle(stats);
        }

        info!(elapsed_secs = self.generator.elapsed(), "closing mock stream thread");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::waveform::Constant;

    #[test]
    fn defaults_before_start() {
        let streamer = MockStreamer::new(Constant::new(1.0, 0.0), 10.0, 915e6, 2.0, 5);
        assert!(!streamer.is_streaming());
        assert_eq!(streamer.max_buffer(), DEFAULT_MAX_BUFFER);
        assert_eq!(streamer.params().center_freq, 915e6);
        assert!(streamer.buffer().is_empty());
    }

    #[test]
    fn buffer_handles_share_storage() {
        let streamer = MockStreamer::new(Constant::new(1.0, 0.0), 10.0, 0.0, 1.0, 5);
        let consumer = streamer.buffer();
        streamer.buffer().push_back(Constant::new(3.0, 0.0).0);
        assert_eq!(consumer.len(), 1);
    }

    #[test]
    fn capacity_change_is_visible_immediately() {
        let streamer = MockStreamer::new(Constant::new(1.0, 0.0), 10.0, 0.0, 1.0, 5);
        streamer.set_max_buffer(3);
        assert_eq!(streamer.max_buffer(), 3);
    }

    #[test]
    fn stop_without_start_is_rejected() {
        let mut streamer = MockStreamer::new(Constant::new(1.0, 0.0), 10.0, 0.0, 1.0, 5);
        assert!(matches!(streamer.stop(), Err(StreamError::NotStreaming)));
    }
}
