use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Fixed parameters of one mock stream.
///
/// `center_freq` mirrors the tuning argument of a real radio driver; it is carried
/// along but never enters the sample math.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamParams {
    /// Samples per second.
    pub rate: f64,
    #[serde(default)]
    pub center_freq: f64,
    #[serde(default = "unity_gain")]
    pub gain: f64,
    /// Samples produced per generation cycle.
    pub frame_size: usize,
}

fn unity_gain() -> f64 {
    1.0
}

impl StreamParams {
    pub fn new(rate: f64, center_freq: f64, gain: f64, frame_size: usize) -> Self {
        Self {
            rate,
            center_freq,
            gain,
            frame_size,
        }
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_center_freq(mut self, center_freq: f64) -> Self {
        self.center_freq = center_freq;
        self
    }

    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_frame_size(mut self, frame_size: usize) -> Self {
        self.frame_size = frame_size;
        self
    }

    /// 1 MS/s in 4096-sample frames, roughly what a USRP hands back per `recv`.
    pub fn usrp_like() -> Self {
        Self::new(1_000_000.0, 915e6, 1.0, 4096)
    }

    /// 48 kS/s in 256-sample frames.
    pub fn audio_rate() -> Self {
        Self::new(48_000.0, 0.0, 1.0, 256)
    }

    /// Slow stream for unit tests and eyeballing output.
    pub fn slow() -> Self {
        Self::new(1_000.0, 0.0, 1.0, 10)
    }

    /// Time between consecutive samples in seconds.
    pub fn period(&self) -> f64 {
        1.0 / self.rate
    }

    /// Sleep between generation cycles. `None` when the rate cannot produce a
    /// representable duration (zero, negative or NaN).
    pub fn frame_interval(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.frame_size as f64 / self.rate).ok()
    }

    pub fn frame_latency_ms(&self) -> f64 {
        (self.frame_size as f64 / self.rate) * 1000.0
    }

    /// Checks the preconditions the stream itself assumes but never enforces.
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, value) in [
            ("rate", self.rate),
            ("center_freq", self.center_freq),
            ("gain", self.gain),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteParameter { name, value });
            }
        }

        if self.rate <= 0.0 {
            return Err(ConfigError::NonPositiveRate(self.rate));
        }

        if self.frame_size == 0 {
            return Err(ConfigError::ZeroFrameSize);
        }

        Ok(())
    }
}

impl Default for StreamParams {
    fn default() -> Self {
        Self::slow()
    }
}

impl fmt::Display for StreamParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} S/s @ {} Hz, gain {}, frame {} ({:.3} ms)",
            self.rate,
            self.center_freq,
            self.gain,
            self.frame_size,
            self.frame_latency_ms()
        )
    }
}
