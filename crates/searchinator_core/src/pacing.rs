use std::time::Duration;

use rand::Rng;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RangeError {
    #[error("delay bounds must be finite and non-negative (got {min}..={max})")]
    Invalid { min: f64, max: f64 },
    #[error("delay of {0}s is too long")]
    TooLong(f64),
    #[error("minimum delay {min}s exceeds maximum {max}s")]
    Inverted { min: f64, max: f64 },
}

/// Inclusive interval from which sleeps are drawn uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min: Duration,
    max: Duration,
}

impl DelayRange {
    pub fn from_secs(min: f64, max: f64) -> Result<Self, RangeError> {
        if !min.is_finite() || !max.is_finite() || min < 0.0 || max < 0.0 {
            return Err(RangeError::Invalid { min, max });
        }
        let to_duration =
            |secs: f64| Duration::try_from_secs_f64(secs).map_err(|_| RangeError::TooLong(secs));
        let (lower, upper) = (to_duration(min)?, to_duration(max)?);
        if lower > upper {
            return Err(RangeError::Inverted { min, max });
        }
        Ok(Self {
            min: lower,
            max: upper,
        })
    }

    /// A range that never sleeps.
    pub fn zero() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        rng.gen_range(self.min..=self.max)
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self {
            min: Duration::from_secs(1),
            max: Duration::from_secs(3),
        }
    }
}
