//! The §6.4 emitted record and the sink trait that consumes it.
//!
//! `EventSink` stands in for the real system's MQTT publisher the way
//! `SdrDriver` stands in for the real RTL-SDR driver: this crate ships two
//! trait impls (`LoggingSink`, `ChannelSink`) and leaves a broker-backed
//! implementation to a follow-up crate.

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::sensors::SensorReading;

/// A fully decoded, CRC-valid packet plus the channel metrics measured
/// around it and a wall-clock timestamp. `received_at` is seconds since
/// `UNIX_EPOCH`, left as a plain `f64` so this type stays usable without a
/// particular time crate on the hot path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherEvent {
    pub received_at_unix_secs: f64,
    pub station_id: u8,
    pub sensor: SensorReading,
    pub wind_speed_mph: u8,
    pub wind_dir_deg: u16,
    pub rssi_db: f64,
    pub snr_db: f64,
    pub freq_err_hz: f64,
    pub raw_frame: [u8; 10],
}

/// Destination for decoded readings. The real system publishes these over
/// MQTT with a Home-Assistant-shaped discovery schema; that wiring is out of
/// scope here (§1 Non-goals) but the seam is this trait.
pub trait EventSink: Send {
    fn publish(&mut self, event: &WeatherEvent) -> Result<()>;
}

/// Routes events through a caller-supplied closure. Used by the CLI to hand
/// events to its structured logger without this crate depending on the
/// CLI's logging types.
pub struct LoggingSink<F: FnMut(&WeatherEvent) -> Result<()> + Send> {
    callback: F,
}

impl<F: FnMut(&WeatherEvent) -> Result<()> + Send> LoggingSink<F> {
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F: FnMut(&WeatherEvent) -> Result<()> + Send> EventSink for LoggingSink<F> {
    fn publish(&mut self, event: &WeatherEvent) -> Result<()> {
        (self.callback)(event)
    }
}

/// Hands events to an unbounded `crossbeam_channel`, for tests and for
/// consumers that want to own their own draining loop rather than a
/// callback.
pub struct ChannelSink {
    tx: crossbeam_channel::Sender<WeatherEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, crossbeam_channel::Receiver<WeatherEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn publish(&mut self, event: &WeatherEvent) -> Result<()> {
        // A disconnected receiver just means nobody is listening anymore;
        // that is not a receiver-path error.
        let _ = self.tx.send(event.clone());
        Ok(())
    }
}

/// Collects every published event in memory. Useful in tests that want to
/// assert on the full sequence of decoded readings.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<WeatherEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for RecordingSink {
    fn publish(&mut self, event: &WeatherEvent) -> Result<()> {
        self.events.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> WeatherEvent {
        WeatherEvent {
            received_at_unix_secs: 0.0,
            station_id: 2,
            sensor: SensorReading::Temperature { degrees_f: 75.0 },
            wind_speed_mph: 0,
            wind_dir_deg: 0,
            rssi_db: -60.0,
            snr_db: 20.0,
            freq_err_hz: -5.0,
            raw_frame: [0x82, 0, 0, 0x02, 0xEE, 0, 0, 0, 0, 0],
        }
    }

    #[test]
    fn recording_sink_collects_events() {
        let mut sink = RecordingSink::new();
        sink.publish(&sample_event()).unwrap();
        sink.publish(&sample_event()).unwrap();
        assert_eq!(sink.events.len(), 2);
    }

    #[test]
    fn channel_sink_delivers_to_receiver() {
        let (mut sink, rx) = ChannelSink::new();
        sink.publish(&sample_event()).unwrap();
        let received = rx.try_recv().unwrap();
        assert_eq!(received.station_id, 2);
    }

    #[test]
    fn callback_sink_invokes_closure() {
        let mut seen = 0;
        {
            let mut sink = LoggingSink::new(|_event| {
                seen += 1;
                Ok(())
            });
            sink.publish(&sample_event()).unwrap();
        }
        assert_eq!(seen, 1);
    }
}
