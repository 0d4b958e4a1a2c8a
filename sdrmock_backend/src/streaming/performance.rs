use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use quanta::{Clock, Instant as QuantaInstant};
use sdrmock_core::StreamParams;

use super::frame::CycleStats;

/// Snapshot of generation-loop metrics, suitable for logging.
#[derive(Debug, Clone)]
pub struct PerformanceSnapshot {
    /// Generation cycles completed since creation or the last reset.
    pub cycle_count: u64,
    /// Samples appended to the buffer.
    pub samples_generated: u64,
    /// Samples dropped from the head because the buffer was full.
    pub samples_evicted: u64,
    /// Fastest frame generation observed (ns).
    pub min_cycle_nanos: Option<u64>,
    /// Slowest frame generation observed (ns).
    pub max_cycle_nanos: Option<u64>,
    /// EMA of frame generation time in nanoseconds.
    pub ema_cycle_nanos: f64,
    /// Sleep between cycles, `frame_size / rate`.
    pub expected_cycle_nanos: f64,
    pub avg_load_percent: f64,
}

/// Lock-free counters for the generation loop.
///
/// The background thread only touches atomics (`record_cycle`, `scoped_cycle`);
/// `snapshot` can run concurrently from any thread.
pub struct PerformanceMonitor {
    clock: Clock,
    frame_size: usize,
    rate: f64,

    cycle_count: AtomicU64,
    samples_generated: AtomicU64,
    samples_evicted: AtomicU64,

    min_cycle_nanos: AtomicU64,
    max_cycle_nanos: AtomicU64,
    /// EMA of cycle duration stored as f64 bits
    ema_cycle_bits: AtomicU64,

    ema_alpha: f64,
}

impl PerformanceMonitor {
    /// `ema_alpha` controls how quickly the moving average follows new cycle timings;
    /// values around 0.05..0.2 work well.
    pub fn new(params: &StreamParams, ema_alpha: f64) -> Self {
        assert!(ema_alpha > 0.0 && ema_alpha <= 1.0);
        Self {
            clock: Clock::new(),
            frame_size: params.frame_size,
            rate: params.rate,
            cycle_count: AtomicU64::new(0),
            samples_generated: AtomicU64::new(0),
            samples_evicted: AtomicU64::new(0),
            min_cycle_nanos: AtomicU64::new(u64::MAX),
            max_cycle_nanos: AtomicU64::new(0),
            ema_cycle_bits: AtomicU64::new(0u64),
            ema_alpha,
        }
    }

    /// Count a finished cycle and its sample totals.
    #[inline]
    pub fn record_cycle(&self, stats: CycleStats) {
        self.cycle_count.fetch_add(1, Ordering::Relaxed);
        self.samples_generated
            .fetch_add(stats.generated as u64, Ordering::Relaxed);
        self.samples_evicted
            .fetch_add(stats.evicted as u64, Ordering::Relaxed);
    }

    /// Record how long one frame took to generate. Updates min, max and EMA.
    #[inline]
    pub fn record_cycle_duration_nanos(&self, nanos: u64) {
        self.min_cycle_nanos.fetch_min(nanos, Ordering::Relaxed);
        self.max_cycle_nanos.fetch_max(nanos, Ordering::Relaxed);

        // EMA_new = alpha * x + (1 - alpha) * EMA_old
        let alpha = self.ema_alpha;
        let mut old_bits = self.ema_cycle_bits.load(Ordering::Relaxed);
        loop {
            let old_f = f64::from_bits(old_bits);
            let new_f = alpha * (nanos as f64) + (1.0 - alpha) * old_f;
            match self.ema_cycle_bits.compare_exchange_weak(
                old_bits,
                new_f.to_bits(),
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(found) => old_bits = found,
            }
        }
    }

    #[inline]
    pub fn record_cycle_duration(&self, d: Duration) {
        let nanos = u64::try_from(d.as_nanos()).unwrap_or(u64::MAX);
        self.record_cycle_duration_nanos(nanos);
    }

    /// Guard that records the time between construction and drop:
    ///
    /// ```ignore
    /// let stats = {
    ///     let _timing = monitor.scoped_cycle();
    ///     generator.run_cycle(&buffer, &waveform, max)
    /// };
    /// monitor.record_cycle(stats);
    /// ```
    #[inline]
    pub fn scoped_cycle(&self) -> CycleTimer<'_> {
        CycleTimer {
            monitor: self,
            start: self.clock.now(),
        }
    }

    /// Read every counter. With `reset_peaks` the min/max/EMA timing values start
    /// over afterwards; the counts are left alone.
    pub fn snapshot(&self, reset_peaks: bool) -> PerformanceSnapshot {
        let cycle_count = self.cycle_count.load(Ordering::Relaxed);
        let samples_generated = self.samples_generated.load(Ordering::Relaxed);
        let samples_evicted = self.samples_evicted.load(Ordering::Relaxed);
        let min_raw = self.min_cycle_nanos.load(Ordering::Relaxed);
        let max_raw = self.max_cycle_nanos.load(Ordering::Relaxed);
        let ema_f = f64::from_bits(self.ema_cycle_bits.load(Ordering::Relaxed));

        let expected_cycle_nanos = (self.frame_size as f64 / self.rate) * 1_000_000_000.0;
        let avg_load_percent = if expected_cycle_nanos.is_finite() && expected_cycle_nanos > 0.0 {
            (ema_f / expected_cycle_nanos) * 100.0
        } else {
            0.0
        };

        // u64::MAX / 0 mean "nothing recorded yet"
        let min_cycle_nanos = (min_raw != u64::MAX).then_some(min_raw);
        let max_cycle_nanos = (max_raw != 0).then_some(max_raw);

        if reset_peaks {
            self.min_cycle_nanos.store(u64::MAX, Ordering::Relaxed);
            self.max_cycle_nanos.store(0, Ordering::Relaxed);
            self.ema_cycle_bits.store(0u64, Ordering::Relaxed);
        }

        PerformanceSnapshot {
            cycle_count,
            samples_generated,
            samples_evicted,
            min_cycle_nanos,
            max_cycle_nanos,
            ema_cycle_nanos: ema_f,
            expected_cycle_nanos,
            avg_load_percent,
        }
    }

    pub fn reset_all(&self) {
        self.cycle_count.store(0, Ordering::Relaxed);
        self.samples_generated.store(0, Ordering::Relaxed);
        self.samples_evicted.store(0, Ordering::Relaxed);
        self.min_cycle_nanos.store(u64::MAX, Ordering::Relaxed);
        self.max_cycle_nanos.store(0, Ordering::Relaxed);
        self.ema_cycle_bits.store(0u64, Ordering::Relaxed);
    }
}

/// Records elapsed generation time on drop.
pub struct CycleTimer<'a> {
    monitor: &'a PerformanceMonitor,
    start: QuantaInstant,
}

impl Drop for CycleTimer<'_> {
    fn drop(&mut self) {
        let elapsed = self.monitor.clock.now().saturating_duration_since(self.start);
        self.monitor.record_cycle_duration(elapsed);
    }
}
