use std::f64::consts::TAU;

use sdrmock_core::Sample;

use super::Waveform;
use super::tables::{WaveShape, init_tables, normalize_phase};

/// Complex exponential at a baseband offset frequency.
///
/// Positive frequencies rotate counter-clockwise, which is what a real receiver
/// sees for a carrier sitting above the tuned center frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    frequency: f64,
    amplitude: f64,
    phase: f64,
}

impl Tone {
    pub fn new(frequency: f64) -> Self {
        Self {
            frequency,
            amplitude: 1.0,
            phase: 0.0,
        }
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Starting phase in radians.
    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }
}

impl Waveform for Tone {
    fn sample_at(&mut self, t: f64) -> Sample {
        Sample::from_polar(self.amplitude, TAU * self.frequency * t + self.phase)
    }
}

/// Real periodic shape on the I rail, Q held at zero.
///
/// Shapes come from the shared lookup tables, so square and sawtooth edges are
/// band-unlimited just like a naive DDS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapedTone {
    shape: WaveShape,
    frequency: f64,
    amplitude: f64,
    phase: f64,
}

impl ShapedTone {
    pub fn new(shape: WaveShape, frequency: f64) -> Self {
        init_tables();

        Self {
            shape,
            frequency,
            amplitude: 1.0,
            phase: 0.0,
        }
    }

    pub fn sine(frequency: f64) -> Self {
        Self::new(WaveShape::Sine, frequency)
    }

    pub fn triangle(frequency: f64) -> Self {
        Self::new(WaveShape::Triangle, frequency)
    }

    pub fn sawtooth(frequency: f64) -> Self {
        Self::new(WaveShape::Sawtooth, frequency)
    }

    pub fn square(frequency: f64) -> Self {
        Self::new(WaveShape::Square, frequency)
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Starting phase in cycles (0.0 to 1.0).
    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = normalize_phase(phase);
        self
    }

    pub fn shape(&self) -> WaveShape {
        self.shape
    }
}

impl Waveform for ShapedTone {
    fn sample_at(&mut self, t: f64) -> Sample {
        let phase = normalize_phase(self.frequency * t + self.phase);
        Sample::new(self.shape.interpolated_sample(phase) * self.amplitude, 0.0)
    }
}

/// Linear frequency sweep that restarts every `sweep_time` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chirp {
    start_freq: f64,
    end_freq: f64,
    sweep_time: f64,
    amplitude: f64,
}

impl Chirp {
    pub fn new(start_freq: f64, end_freq: f64, sweep_time: f64) -> Self {
        Self {
            start_freq,
            end_freq,
            sweep_time,
            amplitude: 1.0,
        }
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Instantaneous frequency at stream time `t`.
    pub fn frequency_at(&self, t: f64) -> f64 {
        let (tau, rate) = self.sweep_position(t);
        self.start_freq + rate * tau
    }

    // Time into the current sweep and the sweep rate in Hz/s. A non-positive sweep
    // time degenerates to a steady tone at the start frequency.
    fn sweep_position(&self, t: f64) -> (f64, f64) {
        if self.sweep_time > 0.0 {
            let tau = t.rem_euclid(self.sweep_time);
            (tau, (self.end_freq - self.start_freq) / self.sweep_time)
        } else {
            (t, 0.0)
        }
    }
}

impl Waveform for Chirp {
    fn sample_at(&mut self, t: f64) -> Sample {
        let (tau, rate) = self.sweep_position(t);
        let theta = TAU * (self.start_freq * tau + 0.5 * rate * tau * tau);
        Sample::from_polar(self.amplitude, theta)
    }
}
