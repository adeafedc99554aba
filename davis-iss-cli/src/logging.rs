//! Structured logging for decoded readings and receiver status.

use crate::config::{LogFormat, LogTarget, LoggingConfig};
use chrono::{DateTime, Utc};
use color_eyre::eyre::Result;
use davis_iss_core::events::WeatherEvent;
use davis_iss_core::frame::FrameOutcome;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Structured log event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEvent {
    /// A decoded, CRC-valid reading from the sample path.
    Reading(ReadingEvent),

    /// A hop-controller lock state transition (Scan <-> Locked, or rescan).
    SyncStatus(SyncStatusEvent),

    /// Periodic accept/drop counters since the last summary.
    Statistics(StatisticsEvent),

    /// General info message.
    Info { message: String },

    /// Warning message.
    Warn { message: String },

    /// Error message.
    Error { message: String, details: Option<String> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingEvent {
    pub timestamp: DateTime<Utc>,
    pub station_id: u8,
    pub sensor: davis_iss_core::sensors::SensorReading,
    pub wind_speed_mph: u8,
    pub wind_dir_deg: u16,
    pub rssi_db: f64,
    pub snr_db: f64,
    pub freq_err_hz: f64,
}

impl From<&WeatherEvent> for ReadingEvent {
    fn from(event: &WeatherEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            station_id: event.station_id,
            sensor: event.sensor,
            wind_speed_mph: event.wind_speed_mph,
            wind_dir_deg: event.wind_dir_deg,
            rssi_db: event.rssi_db,
            snr_db: event.snr_db,
            freq_err_hz: event.freq_err_hz,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncStatusEvent {
    pub timestamp: DateTime<Utc>,
    pub locked: bool,
    pub transmitter_id: Option<u8>,
    pub hop_idx: usize,
    pub missed: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsEvent {
    pub timestamp: DateTime<Utc>,
    pub duration_secs: f64,
    pub accepted: usize,
    pub crc_failed: usize,
    pub duplicate: usize,
    pub out_of_range: usize,
}

impl StatisticsEvent {
    pub fn from_outcome(outcome: FrameOutcome, duration_secs: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            duration_secs,
            accepted: outcome.accepted,
            crc_failed: outcome.crc_failed,
            duplicate: outcome.duplicate,
            out_of_range: outcome.out_of_range,
        }
    }
}

/// Logger that outputs structured logs in one of three wire formats.
pub struct StructuredLogger {
    config: LoggingConfig,
    writer: Box<dyn Write + Send>,
    start_time: DateTime<Utc>,
}

impl StructuredLogger {
    pub fn new(config: LoggingConfig) -> Result<Self> {
        let writer: Box<dyn Write + Send> = match &config.target {
            LogTarget::Stdout => Box::new(io::stdout()),
            LogTarget::Stderr => Box::new(io::stderr()),
            LogTarget::File => {
                let path = config
                    .file_path
                    .as_ref()
                    .ok_or_else(|| color_eyre::eyre::eyre!("file path required for file logging"))?;
                Box::new(BufWriter::new(File::create(path)?))
            }
        };

        Ok(Self {
            config,
            writer,
            start_time: Utc::now(),
        })
    }

    pub fn log(&mut self, event: LogEvent) -> Result<()> {
        let output = match self.config.format {
            LogFormat::Json => self.format_json(&event)?,
            LogFormat::Logfmt => self.format_logfmt(&event)?,
            LogFormat::Pretty => self.format_pretty(&event)?,
        };

        writeln!(self.writer, "{}", output)?;
        self.writer.flush()?;

        Ok(())
    }

    fn format_json(&self, event: &LogEvent) -> Result<String> {
        Ok(serde_json::to_string(event)?)
    }

    fn format_logfmt(&self, event: &LogEvent) -> Result<String> {
        let ts = Utc::now().to_rfc3339();

        let msg = match event {
            LogEvent::Reading(r) => format!(
                "ts=\"{}\" type=reading station={} sensor={} rssi_db={:.1} snr_db={:.1} freq_err_hz={:.1}",
                ts,
                r.station_id,
                sensor_tag(&r.sensor),
                r.rssi_db,
                r.snr_db,
                r.freq_err_hz
            ),
            LogEvent::SyncStatus(s) => format!(
                "ts=\"{}\" type=sync_status locked={} hop_idx={} missed={}",
                ts, s.locked, s.hop_idx, s.missed
            ),
            LogEvent::Statistics(s) => format!(
                "ts=\"{}\" type=statistics duration_secs={:.1} accepted={} crc_failed={} duplicate={} out_of_range={}",
                ts, s.duration_secs, s.accepted, s.crc_failed, s.duplicate, s.out_of_range
            ),
            LogEvent::Info { message } => format!("ts=\"{}\" level=info msg=\"{}\"", ts, message),
            LogEvent::Warn { message } => format!("ts=\"{}\" level=warn msg=\"{}\"", ts, message),
            LogEvent::Error { message, details } => {
                if let Some(d) = details {
                    format!("ts=\"{}\" level=error msg=\"{}\" details=\"{}\"", ts, message, d)
                } else {
                    format!("ts=\"{}\" level=error msg=\"{}\"", ts, message)
                }
            }
        };

        Ok(msg)
    }

    fn format_pretty(&self, event: &LogEvent) -> Result<String> {
        let ts = Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");

        let msg = match event {
            LogEvent::Reading(r) => format!(
                "[{}] STATION {}: {} | RSSI={:.1}dB SNR={:.1}dB \u{394}f={:.1}Hz | wind {}mph @ {}\u{b0}",
                ts,
                r.station_id,
                sensor_tag(&r.sensor),
                r.rssi_db,
                r.snr_db,
                r.freq_err_hz,
                r.wind_speed_mph,
                r.wind_dir_deg
            ),
            LogEvent::SyncStatus(s) => format!(
                "[{}] SYNC: {} | hop_idx={} missed={}",
                ts,
                if s.locked { "LOCKED" } else { "SEARCHING" },
                s.hop_idx,
                s.missed
            ),
            LogEvent::Statistics(s) => format!(
                "[{}] STATISTICS ({:.1}s): accepted={} crc_failed={} duplicate={} out_of_range={}",
                ts, s.duration_secs, s.accepted, s.crc_failed, s.duplicate, s.out_of_range
            ),
            LogEvent::Info { message } => format!("[{}] INFO: {}", ts, message),
            LogEvent::Warn { message } => format!("[{}] WARN: {}", ts, message),
            LogEvent::Error { message, details } => {
                if let Some(d) = details {
                    format!("[{}] ERROR: {} | {}", ts, message, d)
                } else {
                    format!("[{}] ERROR: {}", ts, message)
                }
            }
        };

        Ok(msg)
    }

    pub fn elapsed(&self) -> f64 {
        (Utc::now() - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}

fn sensor_tag(reading: &davis_iss_core::sensors::SensorReading) -> String {
    use davis_iss_core::sensors::SensorReading::*;
    match reading {
        Supercap { volts } => format!("supercap={volts:.2}V"),
        Uv { index } => match index {
            Some(i) => format!("uv={i:.1}"),
            None => "uv=absent".to_string(),
        },
        RainRate { inches_per_hour } => format!("rain_rate={inches_per_hour:.2}in/hr"),
        Solar { watts_per_m2 } => match watts_per_m2 {
            Some(w) => format!("solar={w:.0}W/m2"),
            None => "solar=absent".to_string(),
        },
        Light { raw } => format!("light_raw={raw}"),
        Temperature { degrees_f } => format!("temp={degrees_f:.1}F"),
        WindGust { mph } => format!("gust={mph}mph"),
        Humidity { percent } => format!("humidity={percent:.1}%"),
        RainTotal { delta_clicks, cumulative_clicks } => {
            format!("rain_total=+{delta_clicks}clicks ({cumulative_clicks} total)")
        }
        Unknown { nibble } => format!("unknown_nibble=0x{nibble:X}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use davis_iss_core::sensors::SensorReading;

    fn sample_event() -> WeatherEvent {
        WeatherEvent {
            received_at_unix_secs: 0.0,
            station_id: 2,
            sensor: SensorReading::Temperature { degrees_f: 75.0 },
            wind_speed_mph: 4,
            wind_dir_deg: 180,
            rssi_db: -60.0,
            snr_db: 20.0,
            freq_err_hz: -5.0,
            raw_frame: [0x82, 0, 0, 0x02, 0xEE, 0, 0, 0, 0, 0],
        }
    }

    #[test]
    fn reading_event_carries_sensor_through() {
        let event = sample_event();
        let reading: ReadingEvent = (&event).into();
        assert_eq!(reading.sensor, event.sensor);
        assert_eq!(reading.station_id, 2);
    }

    #[test]
    fn sensor_tag_formats_temperature() {
        let tag = sensor_tag(&SensorReading::Temperature { degrees_f: 75.0 });
        assert_eq!(tag, "temp=75.0F");
    }
}
