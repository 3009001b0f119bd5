//! Time source for audit timestamps.

use std::sync::{Arc, RwLock};

use chrono::{Duration, FixedOffset, NaiveDateTime, Utc};

use crate::config::time::TimeConfig;
use crate::error::AppError;

/// Supplies the current civil time, without a time zone.
pub trait Clock: Send + Sync + 'static {
    /// The current local date and time.
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock shifted by a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct CivilClock {
    offset: FixedOffset,
}

impl CivilClock {
    /// Create a clock for the given offset.
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Build the clock from the time settings.
    pub fn from_config(config: &TimeConfig) -> Result<Self, AppError> {
        let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).ok_or_else(|| {
            AppError::configuration(format!(
                "Invalid UTC offset: {} minutes",
                config.utc_offset_minutes
            ))
        })?;
        Ok(Self::new(offset))
    }

    /// The configured offset.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Clock for CivilClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct FixedClock {
    current: Arc<RwLock<NaiveDateTime>>,
}

impl FixedClock {
    /// Create a clock frozen at `at`.
    pub fn new(at: NaiveDateTime) -> Self {
        Self {
            current: Arc::new(RwLock::new(at)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut current = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::new(noon());
        assert_eq!(clock.now(), noon());
        clock.advance(Duration::minutes(5));
        assert_eq!(clock.now(), noon() + Duration::minutes(5));
    }

    #[test]
    fn test_civil_clock_applies_offset() {
        let clock = CivilClock::from_config(&TimeConfig::default()).unwrap();
        assert_eq!(clock.offset().local_minus_utc(), -3 * 3600);

        let utc = Utc::now().naive_utc();
        let local = clock.now();
        let diff = (utc - local).num_minutes();
        assert!((179..=181).contains(&diff), "diff was {diff}");
    }

    #[test]
    fn test_invalid_offset() {
        let config = TimeConfig {
            utc_offset_minutes: 48 * 60,
        };
        assert!(CivilClock::from_config(&config).is_err());
    }
}
