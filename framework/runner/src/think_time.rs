use std::time::Duration;

use rand::Rng;

/// The pause an agent takes between two actions, sampled uniformly from `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThinkTime {
    min: Duration,
    max: Duration,
}

#[derive(derive_more::Error, derive_more::Display, Debug, PartialEq)]
pub enum ThinkTimeError {
    #[display("Think time bounds must be finite and non-negative, got min={min}s max={max}s")]
    InvalidBound { min: f64, max: f64 },
    #[display("Think time lower bound {min}s is greater than upper bound {max}s")]
    Inverted { min: f64, max: f64 },
    #[display("Think time bounds are too large, got min={min}s max={max}s")]
    OutOfRange { min: f64, max: f64 },
}

impl ThinkTime {
    /// A think time drawn uniformly between `min_s` and `max_s` seconds, inclusive.
    pub fn between(min_s: f64, max_s: f64) -> Result<Self, ThinkTimeError> {
        if !min_s.is_finite() || !max_s.is_finite() || min_s < 0.0 || max_s < 0.0 {
            return Err(ThinkTimeError::InvalidBound {
                min: min_s,
                max: max_s,
            });
        }

        if min_s > max_s {
            return Err(ThinkTimeError::Inverted {
                min: min_s,
                max: max_s,
            });
        }

        // `abs` turns -0.0 into 0.0.
        let to_duration = |seconds: f64| Duration::try_from_secs_f64(seconds.abs());
        match (to_duration(min_s), to_duration(max_s)) {
            (Ok(min), Ok(max)) => Ok(Self { min, max }),
            _ => Err(ThinkTimeError::OutOfRange {
                min: min_s,
                max: max_s,
            }),
        }
    }

    /// The same pause after every action.
    pub fn constant(seconds: f64) -> Result<Self, ThinkTimeError> {
        Self::between(seconds, seconds)
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Sample a pause using the provided random source.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min == self.max {
            return self.min;
        }

        let seconds = rng.gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64());

        // Float conversion can land a nanosecond outside the range.
        Duration::from_secs_f64(seconds).clamp(self.min, self.max)
    }
}

impl Default for ThinkTime {
    /// No pause, agents run their next action immediately.
    fn default() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }
}
