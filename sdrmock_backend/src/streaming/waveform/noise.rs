use sdrmock_core::Sample;

use super::Waveform;

/// Linear congruential generator: deterministic, allocation free, good enough for
/// test noise.
#[derive(Debug, Clone)]
struct FastRng {
    state: u32,
}

impl FastRng {
    fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed }, // Avoid zero seed
        }
    }

    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    #[inline]
    fn next_f64(&mut self) -> f64 {
        (self.next_u32() as f64) * (1.0 / 4294967296.0) // [0.0, 1.0)
    }

    #[inline]
    fn next_bipolar(&mut self) -> f64 {
        (self.next_f64() - 0.5) * 2.0
    }
}

/// Complex white noise, uniform on each rail.
///
/// The output ignores `t` and depends only on how many samples have been drawn, so
/// two generators with the same seed produce the same sequence.
#[derive(Debug, Clone)]
pub struct WhiteNoise {
    rng: FastRng,
    seed: u32,
    amplitude: f64,
}

impl WhiteNoise {
    pub fn new() -> Self {
        Self::with_seed(1)
    }

    pub fn with_seed(seed: u32) -> Self {
        Self {
            rng: FastRng::new(seed),
            seed,
            amplitude: 0.1, // Conservative default for noise
        }
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Rewind to the first sample of the seeded sequence.
    pub fn reset(&mut self) {
        self.rng = FastRng::new(self.seed);
    }
}

impl Default for WhiteNoise {
    fn default() -> Self {
        Self::new()
    }
}

impl Waveform for WhiteNoise {
    fn sample_at(&mut self, _t: f64) -> Sample {
        let re = self.rng.next_bipolar();
        let im = self.rng.next_bipolar();
        Sample::new(re, im) * self.amplitude
    }
}
