use std::f64::consts::TAU;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

const TABLE_SIZE: usize = 8192; // Power of 2 for fast masking
const TABLE_MASK: usize = TABLE_SIZE - 1;

// Built once on first use, shared by every shaped oscillator
static SINE_TABLE: OnceLock<Vec<f64>> = OnceLock::new();
static TRIANGLE_TABLE: OnceLock<Vec<f64>> = OnceLock::new();
static SAWTOOTH_TABLE: OnceLock<Vec<f64>> = OnceLock::new();
static SQUARE_TABLE: OnceLock<Vec<f64>> = OnceLock::new();

/// Real periodic shapes available to `ShapedTone`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveShape {
    Sine,
    Triangle,
    Sawtooth,
    Square,
}

impl WaveShape {
    pub fn table(self) -> &'static [f64] {
        match self {
            WaveShape::Sine => sine_table(),
            WaveShape::Triangle => triangle_table(),
            WaveShape::Sawtooth => sawtooth_table(),
            WaveShape::Square => square_table(),
        }
    }

    /// Value at `phase` in cycles, `[0.0, 1.0)`.
    #[inline]
    pub fn interpolated_sample(self, phase: f64) -> f64 {
        interpolated_lookup(self.table(), phase)
    }
}

/// Build every table up front so the first frame doesn't pay for it.
pub fn init_tables() {
    for shape in [
        WaveShape::Sine,
        WaveShape::Triangle,
        WaveShape::Sawtooth,
        WaveShape::Square,
    ] {
        let _ = shape.table();
    }
}

fn build_table(f: impl Fn(f64) -> f64) -> Vec<f64> {
    (0..TABLE_SIZE)
        .map(|i| f(i as f64 / TABLE_SIZE as f64))
        .collect()
}

pub fn sine_table() -> &'static [f64] {
    SINE_TABLE.get_or_init(|| build_table(|phase| (TAU * phase).sin()))
}

pub fn triangle_table() -> &'static [f64] {
    TRIANGLE_TABLE.get_or_init(|| {
        build_table(|phase| {
            if phase < 0.25 {
                4.0 * phase
            } else if phase < 0.75 {
                2.0 - 4.0 * phase
            } else {
                4.0 * phase - 4.0
            }
        })
    })
}

pub fn sawtooth_table() -> &'static [f64] {
    SAWTOOTH_TABLE.get_or_init(|| build_table(|phase| 2.0 * phase - 1.0))
}

pub fn square_table() -> &'static [f64] {
    SQUARE_TABLE.get_or_init(|| build_table(|phase| if phase < 0.5 { 1.0 } else { -1.0 }))
}

/// Linear interpolation between neighbouring table entries.
/// Phase should be normalized to [0.0, 1.0)
#[inline]
pub fn interpolated_lookup(table: &[f64], phase: f64) -> f64 {
    let scaled_phase = phase * TABLE_SIZE as f64;
    let whole = scaled_phase.floor();
    let index = whole as usize & TABLE_MASK;
    let frac = scaled_phase - whole;

    let sample1 = table[index];
    let sample2 = table[(index + 1) & TABLE_MASK];

    sample1 + frac * (sample2 - sample1)
}

/// Wrap a phase in cycles into [0.0, 1.0).
#[inline]
pub fn normalize_phase(phase: f64) -> f64 {
    let wrapped = phase.rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}
