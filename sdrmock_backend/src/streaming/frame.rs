use parking_lot::Mutex;
use sdrmock_core::{SharedBuffer, StreamParams};

use super::waveform::BoxedWaveform;

/// Result of one generation cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub generated: usize,
    pub evicted: usize,
}

/// Per-session generation state: the running time axis plus the fixed frame
/// parameters. A new one is built for every stream session so time restarts at 0.
#[derive(Debug, Clone)]
pub struct FrameGenerator {
    period: f64,
    gain: f64,
    frame_size: usize,
    t: f64,
}

impl FrameGenerator {
    pub fn new(params: &StreamParams) -> Self {
        Self {
            period: params.period(),
            gain: params.gain,
            frame_size: params.frame_size,
            t: 0.0,
        }
    }

    /// Stream time the next sample will be generated at.
    pub fn elapsed(&self) -> f64 {
        self.t
    }

    /// Produce one frame into `buffer`.
    ///
    /// Lock order is buffer first, then waveform. Both are held for the whole frame so
    /// every sample of the frame comes from the same waveform and consumers never see
    /// a partial frame. After each append the oldest samples are evicted until the
    /// buffer is back within `max_buffer`.
    pub fn run_cycle(
        &mut self,
        buffer: &SharedBuffer,
        waveform: &Mutex<BoxedWaveform>,
        max_buffer: usize,
    ) -> CycleStats {
        let mut samples = buffer.write();
        let mut waveform = waveform.lock();
        let mut stats = CycleStats::default();

        for _ in 0..self.frame_size {
            samples.push_back(waveform.sample_at(self.t) * self.gain);
            stats.generated += 1;

            while samples.len() > max_buffer {
                samples.pop_front();
                stats.evicted += 1;
            }

            self.t += self.period;
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::waveform::{Constant, Tone, Waveform};
    use sdrmock_core::Sample;

    fn slot(waveform: impl Waveform) -> Mutex<BoxedWaveform> {
        Mutex::new(Box::new(waveform))
    }

    #[test]
    fn bounded_frame_keeps_newest_samples() {
        let params = StreamParams::new(10.0, 0.0, 2.0, 5);
        let mut generator = FrameGenerator::new(&params);
        let buffer = SharedBuffer::new();

        let stats = generator.run_cycle(&buffer, &slot(Constant::new(1.0, 0.0)), 3);

        assert_eq!(stats, CycleStats { generated: 5, evicted: 2 });
        assert_eq!(buffer.snapshot(), vec![Sample::new(2.0, 0.0); 3]);
    }

    #[test]
    fn time_steps_by_one_period_from_zero() {
        // 1/4 is exact in binary, so accumulated time stays exact too
        let params = StreamParams::new(4.0, 0.0, 1.0, 3);
        let mut generator = FrameGenerator::new(&params);
        let buffer = SharedBuffer::new();
        let ramp = slot(|t: f64| Sample::new(t, 0.0));

        generator.run_cycle(&buffer, &ramp, 100);
        generator.run_cycle(&buffer, &ramp, 100);

        let times: Vec<f64> = buffer.snapshot().iter().map(|s| s.re).collect();
        assert_eq!(times, vec![0.0, 0.25, 0.5, 0.75, 1.0, 1.25]);
        assert_eq!(generator.elapsed(), 1.5);
    }

    #[test]
    fn time_is_strictly_increasing_at_awkward_rates() {
        let params = StreamParams::new(3.0, 0.0, 1.0, 50);
        let mut generator = FrameGenerator::new(&params);
        let buffer = SharedBuffer::new();

        generator.run_cycle(&buffer, &slot(|t: f64| Sample::new(t, 0.0)), 1000);

        let times: Vec<f64> = buffer.snapshot().iter().map(|s| s.re).collect();
        assert_eq!(times[0], 0.0);
        for pair in times.windows(2) {
            assert!(pair[1] > pair[0]);
            assert!((pair[1] - pair[0] - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn gain_scales_every_sample() {
        let unity = StreamParams::new(100.0, 0.0, 1.0, 16);
        let boosted = unity.with_gain(-3.5);
        let reference = SharedBuffer::new();
        let scaled = SharedBuffer::new();

        FrameGenerator::new(&unity).run_cycle(&reference, &slot(Tone::new(7.0)), 64);
        FrameGenerator::new(&boosted).run_cycle(&scaled, &slot(Tone::new(7.0)), 64);

        for (r, s) in reference.snapshot().iter().zip(scaled.snapshot()) {
            assert!((*r * -3.5 - s).norm() < 1e-12);
        }
    }

    #[test]
    fn center_frequency_does_not_change_samples() {
        let base = StreamParams::new(100.0, 0.0, 1.0, 8);
        let tuned = base.with_center_freq(2.4e9);
        let a = SharedBuffer::new();
        let b = SharedBuffer::new();

        FrameGenerator::new(&base).run_cycle(&a, &slot(Tone::new(5.0)), 64);
        FrameGenerator::new(&tuned).run_cycle(&b, &slot(Tone::new(5.0)), 64);

        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn shrinking_the_bound_takes_effect_next_cycle() {
        let params = StreamParams::new(10.0, 0.0, 1.0, 4);
        let mut generator = FrameGenerator::new(&params);
        let buffer = SharedBuffer::new();
        let ramp = slot(|t: f64| Sample::new(t, 0.0));

        generator.run_cycle(&buffer, &ramp, 10);
        generator.run_cycle(&buffer, &ramp, 10);
        assert_eq!(buffer.len(), 8);

        let stats = generator.run_cycle(&buffer, &ramp, 2);
        assert_eq!(stats.evicted, 10);
        assert_eq!(buffer.len(), 2);

        // the survivors are the two newest samples of the last frame
        let newest: Vec<f64> = buffer.snapshot().iter().map(|s| s.re).collect();
        assert!((newest[0] - 1.0).abs() < 1e-12);
        assert!((newest[1] - 1.1).abs() < 1e-12);
    }

    #[test]
    fn zero_bound_keeps_nothing() {
        let params = StreamParams::new(10.0, 0.0, 1.0, 4);
        let buffer = SharedBuffer::new();

        let stats =
            FrameGenerator::new(&params).run_cycle(&buffer, &slot(Constant::new(1.0, 1.0)), 0);

        assert_eq!(stats, CycleStats { generated: 4, evicted: 4 });
        assert!(buffer.is_empty());
    }
}
