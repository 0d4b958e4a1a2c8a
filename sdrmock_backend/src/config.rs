use std::fmt;
use std::path::Path;

use sdrmock_core::{ConfigError, ConfigResult, DEFAULT_MAX_BUFFER, Sample, StreamParams};
use serde::{Deserialize, Serialize};

use crate::streaming::MockStreamer;
use crate::streaming::waveform::{
    BoxedWaveform, Chirp, Constant, Scaled, ShapedTone, Silence, Sum, Tone, WaveShape,
    WhiteNoise,
};

/// Serializable description of a waveform, as written in a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WaveformKind {
    Constant {
        re: f64,
        #[serde(default)]
        im: f64,
    },
    Silence,
    Tone {
        frequency: f64,
        #[serde(default = "unit_amplitude")]
        amplitude: f64,
        #[serde(default)]
        phase: f64,
    },
    Shaped {
        shape: WaveShape,
        frequency: f64,
        #[serde(default = "unit_amplitude")]
        amplitude: f64,
    },
    Chirp {
        start_freq: f64,
        end_freq: f64,
        sweep_time: f64,
        #[serde(default = "unit_amplitude")]
        amplitude: f64,
    },
    Noise {
        #[serde(default = "noise_amplitude")]
        amplitude: f64,
        #[serde(default = "noise_seed")]
        seed: u32,
    },
    Sum {
        a: Box<WaveformKind>,
        b: Box<WaveformKind>,
    },
    Scaled {
        inner: Box<WaveformKind>,
        re: f64,
        #[serde(default)]
        im: f64,
    },
}

fn unit_amplitude() -> f64 {
    1.0
}

fn noise_amplitude() -> f64 {
    0.1
}

fn noise_seed() -> u32 {
    1
}

fn default_max_buffer() -> usize {
    DEFAULT_MAX_BUFFER
}

impl WaveformKind {
    pub fn build(&self) -> BoxedWaveform {
        match self {
            Self::Constant { re, im } => Box::new(Constant(Sample::new(*re, *im))),
            Self::Silence => Box::new(Silence),
            Self::Tone {
                frequency,
                amplitude,
                phase,
            } => Box::new(
                Tone::new(*frequency)
                    .with_amplitude(*amplitude)
                    .with_phase(*phase),
            ),
            Self::Shaped {
                shape,
                frequency,
                amplitude,
            } => Box::new(ShapedTone::new(*shape, *frequency).with_amplitude(*amplitude)),
            Self::Chirp {
                start_freq,
                end_freq,
                sweep_time,
                amplitude,
            } => Box::new(
                Chirp::new(*start_freq, *end_freq, *sweep_time).with_amplitude(*amplitude),
            ),
            Self::Noise { amplitude, seed } => {
                Box::new(WhiteNoise::with_seed(*seed).with_amplitude(*amplitude))
            }
            Self::Sum { a, b } => Box::new(Sum::from_boxed(a.build(), b.build())),
            Self::Scaled { inner, re, im } => {
                Box::new(Scaled::from_boxed(inner.build(), Sample::new(*re, *im)))
            }
        }
    }
}

impl Default for WaveformKind {
    fn default() -> Self {
        Self::Tone {
            frequency: 1_000.0,
            amplitude: 1.0,
            phase: 0.0,
        }
    }
}

impl fmt::Display for WaveformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant { re, im } => write!(f, "constant {}", Sample::new(*re, *im)),
            Self::Silence => write!(f, "silence"),
            Self::Tone { frequency, .. } => write!(f, "tone @ {} Hz", frequency),
            Self::Shaped {
                shape, frequency, ..
            } => write!(f, "{:?} @ {} Hz", shape, frequency),
            Self::Chirp {
                start_freq,
                end_freq,
                sweep_time,
                ..
            } => write!(f, "chirp {} -> {} Hz over {} s", start_freq, end_freq, sweep_time),
            Self::Noise { amplitude, seed } => {
                write!(f, "noise (amplitude {}, seed {})", amplitude, seed)
            }
            Self::Sum { a, b } => write!(f, "({}) + ({})", a, b),
            Self::Scaled { inner, re, im } => {
                write!(f, "({}) * {}", inner, Sample::new(*re, *im))
            }
        }
    }
}

/// Everything needed to build a `MockStreamer`, loadable from JSON:
///
/// ```json
/// {
///   "stream": { "rate": 1000000.0, "center_freq": 915e6, "gain": 1.0, "frame_size": 4096 },
///   "max_buffer": 65536,
///   "waveform": { "type": "tone", "frequency": 10000.0 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockConfig {
    pub stream: StreamParams,
    #[serde(default = "default_max_buffer")]
    pub max_buffer: usize,
    #[serde(default)]
    pub waveform: WaveformKind,
}

impl MockConfig {
    pub fn new(stream: StreamParams) -> Self {
        Self {
            stream,
            max_buffer: DEFAULT_MAX_BUFFER,
            waveform: WaveformKind::default(),
        }
    }

    pub fn with_max_buffer(mut self, max_buffer: usize) -> Self {
        self.max_buffer = max_buffer;
        self
    }

    pub fn with_waveform(mut self, waveform: WaveformKind) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.stream.validate()
    }

    /// Build an idle streamer with this config's waveform and eviction bound.
    pub fn build_streamer(&self) -> MockStreamer {
        let streamer = MockStreamer::from_boxed(self.waveform.build(), self.stream);
        streamer.set_max_buffer(self.max_buffer);
        streamer
    }
}

impl Default for MockConfig {
    fn default() -> Self {
        Self::new(StreamParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::Waveform;

    #[test]
    fn parses_full_document() {
        let config = MockConfig::from_json_str(
            r#"{
                "stream": { "rate": 2000.0, "center_freq": 433.92e6, "gain": 0.5, "frame_size": 64 },
                "max_buffer": 256,
                "waveform": { "type": "shaped", "shape": "square", "frequency": 50.0 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.stream, StreamParams::new(2000.0, 433.92e6, 0.5, 64));
        assert_eq!(config.max_buffer, 256);
        assert_eq!(
            config.waveform,
            WaveformKind::Shaped {
                shape: WaveShape::Square,
                frequency: 50.0,
                amplitude: 1.0
            }
        );
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config =
            MockConfig::from_json_str(r#"{ "stream": { "rate": 10.0, "frame_size": 5 } }"#)
                .unwrap();
        assert_eq!(config.max_buffer, DEFAULT_MAX_BUFFER);
        assert_eq!(config.waveform, WaveformKind::default());
    }

    #[test]
    fn rejects_unknown_waveform() {
        let err = MockConfig::from_json_str(
            r#"{ "stream": { "rate": 10.0, "frame_size": 5 }, "waveform": { "type": "fm" } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = MockConfig::from_path("/definitely/not/here.json").unwrap_err();
        match err {
            ConfigError::Io { path, .. } => assert!(path.ends_with("here.json")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn built_waveforms_match_their_description() {
        let mut constant = WaveformKind::Constant { re: 1.0, im: -1.0 }.build();
        assert_eq!(constant.sample_at(9.0), Sample::new(1.0, -1.0));

        let mut tone = WaveformKind::Tone {
            frequency: 1.0,
            amplitude: 2.0,
            phase: 0.0,
        }
        .build();
        assert!((tone.sample_at(0.25) - Sample::new(0.0, 2.0)).norm() < 1e-9);

        let mut silence = WaveformKind::Silence.build();
        assert_eq!(silence.sample_at(1.0), Sample::new(0.0, 0.0));

        let mut noise = WaveformKind::Noise {
            amplitude: 0.5,
            seed: 3,
        }
        .build();
        let mut reference = WhiteNoise::with_seed(3).with_amplitude(0.5);
        assert_eq!(noise.sample_at(0.0), reference.sample_at(0.0));
    }

    #[test]
    fn sum_parses_and_adds_both_terms() {
        let config = MockConfig::from_json_str(
            r#"{
                "stream": { "rate": 10.0, "frame_size": 5 },
                "waveform": {
                    "type": "sum",
                    "a": { "type": "constant", "re": 1.0 },
                    "b": { "type": "constant", "re": 0.0, "im": 2.0 }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.waveform,
            WaveformKind::Sum {
                a: Box::new(WaveformKind::Constant { re: 1.0, im: 0.0 }),
                b: Box::new(WaveformKind::Constant { re: 0.0, im: 2.0 }),
            }
        );
        assert_eq!(config.waveform.build().sample_at(4.0), Sample::new(1.0, 2.0));

        let silent: WaveformKind = serde_json::from_str(
            r#"{ "type": "sum", "a": { "type": "silence" }, "b": { "type": "silence" } }"#,
        )
        .unwrap();
        assert_eq!(silent.build().sample_at(0.0), Sample::new(0.0, 0.0));
        assert_eq!(silent.to_string(), "(silence) + (silence)");
    }

    #[test]
    fn scaled_parses_and_applies_complex_factor() {
        let kind: WaveformKind = serde_json::from_str(
            r#"{ "type": "scaled", "inner": { "type": "constant", "re": 1.0, "im": 1.0 }, "re": 0.0, "im": 1.0 }"#,
        )
        .unwrap();

        assert_eq!(kind.build().sample_at(0.0), Sample::new(-1.0, 1.0));

        let half: WaveformKind = serde_json::from_str(
            r#"{ "type": "scaled", "inner": { "type": "tone", "frequency": 1.0 }, "re": 0.5 }"#,
        )
        .unwrap();
        let s = half.build().sample_at(0.25);
        assert!((s - Sample::new(0.0, 0.5)).norm() < 1e-9);
    }

    #[test]
    fn build_streamer_applies_bound() {
        let config = MockConfig::new(StreamParams::slow()).with_max_buffer(12);
        let streamer = config.build_streamer();
        assert_eq!(streamer.max_buffer(), 12);
        assert!(!streamer.is_streaming());
    }

    #[test]
    fn display_is_readable() {
        assert_eq!(WaveformKind::default().to_string(), "tone @ 1000 Hz");
        assert_eq!(WaveformKind::Silence.to_string(), "silence");
    }
}
