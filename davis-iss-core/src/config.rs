//! Configuration types for the Davis ISS receiver pipeline.
use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, Result};

/// Tuner gain: automatic AGC or a fixed value in dB.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum GainSetting {
    Auto,
    Fixed(f64),
}

impl Default for GainSetting {
    fn default() -> Self {
        GainSetting::Auto
    }
}

/// Tunables for the hop-follow state machine (resolves the Open Questions
/// around the miss threshold and drift/slack constants as configurable
/// fields rather than hard-coded values).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HopTuning {
    /// Base dwell time in seconds, before the per-station slope term.
    pub dwell_base_secs: f64,
    /// Per-station-id dwell time slope, in seconds.
    pub dwell_slope_secs: f64,
    /// Extra slack added to the dwell deadline before declaring a miss.
    pub deadline_slack_secs: f64,
    /// Consecutive missed deadlines before falling back to Scan.
    pub max_missed: u32,
    /// A packet arriving this much earlier than expected is treated as a
    /// duplicate/glitch and does not advance the hop.
    pub duplicate_drift_secs: f64,
}

impl Default for HopTuning {
    fn default() -> Self {
        Self {
            dwell_base_secs: 2.5625,
            dwell_slope_secs: 0.0625,
            deadline_slack_secs: 0.3,
            max_missed: 50,
            duplicate_drift_secs: -0.5,
        }
    }
}

impl HopTuning {
    pub fn dwell_time_secs(&self, station_id: u8) -> f64 {
        self.dwell_base_secs + self.dwell_slope_secs * station_id as f64
    }
}

/// Top-level, TOML-deserializable receiver configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReceiverConfig {
    /// Samples per transmitted bit; sets the receiver's sample rate
    /// (`19200 * symbol_length`).
    pub symbol_length: usize,
    /// Pin the expected station id (0..8), or `None` to accept any.
    pub station_id: Option<u8>,
    pub gain: GainSetting,
    pub ppm_correction: i32,
    pub hop: HopTuning,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            symbol_length: 8,
            station_id: None,
            gain: GainSetting::default(),
            ppm_correction: 0,
            hop: HopTuning::default(),
        }
    }
}

impl ReceiverConfig {
    pub fn sample_rate(&self) -> usize {
        19_200 * self.symbol_length
    }

    pub fn validate(&self) -> Result<()> {
        if self.symbol_length == 0 {
            return Err(ConfigError::InvalidSymbolLength(self.symbol_length).into());
        }
        if let Some(id) = self.station_id {
            if id >= 8 {
                return Err(ConfigError::InvalidStationId(id).into());
            }
        }
        Ok(())
    }
}
