//! Civil time configuration.

use serde::{Deserialize, Serialize};

/// Offset used to stamp audit timestamps.
///
/// Timestamps are stored without a time zone, in the civil time of the
/// deployment. The default is UTC-03:00 (America/Sao_Paulo, which has not
/// observed daylight saving time since 2019).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConfig {
    /// Minutes east of UTC.
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset_minutes(),
        }
    }
}

fn default_utc_offset_minutes() -> i32 {
    -180
}
