//! Pluggable sample generators for the mock stream.
//!
//! A waveform maps elapsed stream time (seconds since the stream started) to one
//! complex sample. The streamer calls it once per sample while holding the waveform
//! lock, so implementations must return promptly and must never block.

pub mod noise;
pub mod oscillators;
pub mod tables;

use sdrmock_core::Sample;

pub use noise::WhiteNoise;
pub use oscillators::{Chirp, ShapedTone, Tone};
pub use tables::WaveShape;

/// Capability every generator implements.
///
/// `sample_at` takes `&mut self` so stateful sources (noise, recorders) work without
/// interior mutability; the streamer already serialises access.
pub trait Waveform: Send + 'static {
    fn sample_at(&mut self, t: f64) -> Sample;
}

/// Boxed waveform as stored in the streamer's swap slot.
pub type BoxedWaveform = Box<dyn Waveform>;

impl<F> Waveform for F
where
    F: FnMut(f64) -> Sample + Send + 'static,
{
    fn sample_at(&mut self, t: f64) -> Sample {
        self(t)
    }
}

/// DC value, independent of time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant(pub Sample);

impl Constant {
    pub fn new(re: f64, im: f64) -> Self {
        Self(Sample::new(re, im))
    }
}

impl Waveform for Constant {
    fn sample_at(&mut self, _t: f64) -> Sample {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Silence;

impl Waveform for Silence {
    fn sample_at(&mut self, _t: f64) -> Sample {
        Sample::new(0.0, 0.0)
    }
}

/// Sum of two waveforms evaluated at the same instant.
pub struct Sum {
    a: BoxedWaveform,
    b: BoxedWaveform,
}

impl Sum {
    pub fn new(a: impl Waveform, b: impl Waveform) -> Self {
        Self {
            a: Box::new(a),
            b: Box::new(b),
        }
    }

    pub fn from_boxed(a: BoxedWaveform, b: BoxedWaveform) -> Self {
        Self { a, b }
    }
}

impl Waveform for Sum {
    fn sample_at(&mut self, t: f64) -> Sample {
        self.a.sample_at(t) + self.b.sample_at(t)
    }
}

/// Waveform multiplied by a complex factor.
pub struct Scaled {
    inner: BoxedWaveform,
    factor: Sample,
}

impl Scaled {
    pub fn new(inner: impl Waveform, factor: Sample) -> Self {
        Self {
            inner: Box::new(inner),
            factor,
        }
    }

    pub fn from_boxed(inner: BoxedWaveform, factor: Sample) -> Self {
        Self { inner, factor }
    }
}

impl Waveform for Scaled {
    fn sample_at(&mut self, t: f64) -> Sample {
        self.inner.sample_at(t) * self.factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_waveforms() {
        let mut ramp: BoxedWaveform = Box::new(|t: f64| Sample::new(t, -t));
        assert_eq!(ramp.sample_at(0.5), Sample::new(0.5, -0.5));
    }

    #[test]
    fn stateful_closure_keeps_state() {
        let mut calls = 0u32;
        let mut counter = move |_t: f64| {
            calls += 1;
            Sample::new(calls as f64, 0.0)
        };
        counter.sample_at(0.0);
        assert_eq!(counter.sample_at(0.0), Sample::new(2.0, 0.0));
    }

    #[test]
    fn combinators_compose() {
        let mut sum = Sum::new(Constant::new(1.0, 0.0), Constant::new(0.0, 2.0));
        assert_eq!(sum.sample_at(3.0), Sample::new(1.0, 2.0));

        let mut scaled = Scaled::new(Constant::new(1.0, 1.0), Sample::new(0.0, 1.0));
        assert_eq!(scaled.sample_at(0.0), Sample::new(-1.0, 1.0));

        assert_eq!(Silence.sample_at(42.0), Sample::new(0.0, 0.0));
    }
}
