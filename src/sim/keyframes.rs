//! Piecewise-linear keyframe channels

use std::fmt;

use crate::{clamp01, lerp};

/// Reasons a keyframe list is rejected
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyframeError {
    /// No (input, output) pairs were given
    Empty,
    /// Input and output lists differ in length
    LengthMismatch { inputs: usize, outputs: usize },
    /// A breakpoint or output value is NaN or infinite
    NonFinite { index: usize },
}

impl fmt::Display for KeyframeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyframeError::Empty => write!(f, "keyframe list is empty"),
            KeyframeError::LengthMismatch { inputs, outputs } => write!(
                f,
                "keyframe inputs ({}) and outputs ({}) differ in length",
                inputs, outputs
            ),
            KeyframeError::NonFinite { index } => {
                write!(f, "keyframe {} is not a finite number", index)
            }
        }
    }
}

impl std::error::Error for KeyframeError {}

/// An (input, output) breakpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub input: f32,
    pub output: f32,
}

/// Ordered keyframes, interpolated linearly and clamped outside the range
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframes {
    frames: Vec<Keyframe>,
}

impl Keyframes {
    /// Build from parallel input/output lists.
    ///
    /// Inputs that are out of order are sorted (stable, so equal breakpoints
    /// keep their declared order and produce a step).
    pub fn new(inputs: &[f32], outputs: &[f32]) -> Result<Self, KeyframeError> {
        if inputs.len() != outputs.len() {
            return Err(KeyframeError::LengthMismatch {
                inputs: inputs.len(),
                outputs: outputs.len(),
            });
        }
        Self::from_pairs(inputs.iter().copied().zip(outputs.iter().copied()))
    }

    /// Build from (input, output) pairs
    pub fn from_pairs<I>(pairs: I) -> Result<Self, KeyframeError>
    where
        I: IntoIterator<Item = (f32, f32)>,
    {
        let mut frames = Vec::new();
        for (index, (input, output)) in pairs.into_iter().enumerate() {
            if !input.is_finite() || !output.is_finite() {
                return Err(KeyframeError::NonFinite { index });
            }
            frames.push(Keyframe { input, output });
        }
        if frames.is_empty() {
            return Err(KeyframeError::Empty);
        }
        if !frames.windows(2).all(|w| w[0].input <= w[1].input) {
            log::debug!("Sorting out-of-order keyframes");
            frames.sort_by(|a, b| a.input.total_cmp(&b.input));
        }
        Ok(Self { frames })
    }

    /// Two-point channel; only fails on non-finite values
    pub fn linear(in_range: (f32, f32), out_range: (f32, f32)) -> Result<Self, KeyframeError> {
        Self::new(&[in_range.0, in_range.1], &[out_range.0, out_range.1])
    }

    pub fn frames(&self) -> &[Keyframe] {
        &self.frames
    }

    /// Smallest and largest output value
    pub fn output_range(&self) -> (f32, f32) {
        self.frames.iter().fold((f32::MAX, f32::MIN), |(lo, hi), k| {
            (lo.min(k.output), hi.max(k.output))
        })
    }

    /// Interpolate at `x`. NaN samples as the first keyframe.
    pub fn sample(&self, x: f32) -> f32 {
        let first = self.frames[0];
        let last = self.frames[self.frames.len() - 1];
        if x.is_nan() || x <= first.input {
            return first.output;
        }
        if x >= last.input {
            return last.output;
        }

        // Last segment whose start is <= x
        let upper = self.frames.partition_point(|k| k.input <= x);
        let a = self.frames[upper - 1];
        let b = self.frames[upper];
        let span = b.input - a.input;
        if span <= f32::EPSILON {
            return b.output;
        }
        lerp(a.output, b.output, clamp01((x - a.input) / span))
    }
}
