//! Ties the DSP front-end, frame slicer, sensor dispatch and event sink
//! together into the sample-path half of the concurrency model (§5). This
//! module has no knowledge of hop state at all: it hands each accepted
//! frame's `(transmitter_id, freq_err_hz)` out as a `PacketEvent` for the
//! caller to forward to the hop controller thread, matching "the frequency-
//! error memory is owned by the hop controller (push model)".

use crate::dsp::{Demodulator, PacketConfig};
use crate::errors::Result;
use crate::events::{EventSink, WeatherEvent};
use crate::frame::{slice_candidates, FrameOutcome};
use crate::hop::PacketEvent;
use crate::sensors::SensorDispatcher;

/// Owns every piece of state on the sample path: the DSP buffers, the
/// per-block frame-outcome tally, and the sensor dispatcher's rain-total
/// wrap counters.
pub struct SamplePath {
    demod: Demodulator,
    dispatcher: SensorDispatcher,
    outcome: FrameOutcome,
}

impl SamplePath {
    pub fn new(config: PacketConfig) -> Self {
        Self {
            demod: Demodulator::new(config),
            dispatcher: SensorDispatcher::new(),
            outcome: FrameOutcome::default(),
        }
    }

    pub fn config(&self) -> PacketConfig {
        self.demod.config
    }

    /// Cumulative accept/crc-fail/duplicate/out-of-range counts since the
    /// last call to `reset_outcome`.
    pub fn outcome(&self) -> FrameOutcome {
        self.outcome
    }

    pub fn reset_outcome(&mut self) {
        self.outcome = FrameOutcome::default();
    }

    /// Process one raw I/Q block (`2 * block_size` bytes), publishing a
    /// `WeatherEvent` to `sink` for every accepted frame and returning the
    /// `PacketEvent`s the hop controller should be told about, in arrival
    /// order.
    pub fn process_block(
        &mut self,
        raw: &[u8],
        now_unix_secs: f64,
        sink: &mut dyn EventSink,
    ) -> Result<Vec<PacketEvent>> {
        let candidates = self.demod.process_block(raw)?;
        self.handle_candidates(&candidates, now_unix_secs, sink)
    }

    /// Validate, dispatch and publish a set of already-found candidate
    /// indices against the current demodulator state. Split out from
    /// `process_block` so tests can seed `demod.quantized` directly instead
    /// of round-tripping a synthetic waveform through the full DSP chain.
    fn handle_candidates(
        &mut self,
        candidates: &[usize],
        now_unix_secs: f64,
        sink: &mut dyn EventSink,
    ) -> Result<Vec<PacketEvent>> {
        let accepted = slice_candidates(&self.demod, candidates, &mut self.outcome);

        let mut packet_events = Vec::with_capacity(accepted.len());
        for frame in accepted {
            let payload: [u8; 8] = frame.data[2..10]
                .try_into()
                .expect("a 10-byte frame always has an 8-byte payload");
            let (header, reading) = self.dispatcher.dispatch(&payload);

            let event = WeatherEvent {
                received_at_unix_secs: now_unix_secs,
                station_id: header.station_id,
                sensor: reading,
                wind_speed_mph: header.wind_speed_mph,
                wind_dir_deg: header.wind_dir_deg,
                rssi_db: frame.rssi_db,
                snr_db: frame.snr_db,
                freq_err_hz: frame.freq_err_hz,
                raw_frame: frame.data,
            };
            sink.publish(&event)?;

            packet_events.push(PacketEvent {
                transmitter_id: header.station_id,
                freq_err_hz: frame.freq_err_hz.round() as i32,
            });
        }

        Ok(packet_events)
    }
}
