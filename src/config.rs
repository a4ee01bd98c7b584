use crate::error::ScoringError;

#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Forgiveness window in seconds applied around reference segment
    /// boundaries. Time inside the collar is never counted as false alarm
    /// or miss for a mapped speaker.
    pub collar_seconds: f64,
}

impl ScoringConfig {
    pub const DEFAULT_COLLAR_SECONDS: f64 = 0.250;

    pub fn with_collar(collar_seconds: f64) -> Self {
        Self { collar_seconds }
    }

    pub(crate) fn validate(&self) -> Result<(), ScoringError> {
        if !self.collar_seconds.is_finite() || self.collar_seconds < 0.0 {
            return Err(ScoringError::invalid_input(format!(
                "collar must be finite and non-negative, got {}",
                self.collar_seconds
            )));
        }
        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            collar_seconds: Self::DEFAULT_COLLAR_SECONDS,
        }
    }
}
