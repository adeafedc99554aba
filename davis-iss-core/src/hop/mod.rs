//! Frequency-hop-following state machine.
//!
//! The state transitions (`HopController`) are expressed against a caller
//! supplied clock (seconds as `f64`) so they can be driven deterministically
//! in tests; `run` wires the same transitions to a real `SdrDriver` on a
//! dedicated thread using wall-clock time.

pub mod channel_plan;
pub mod freq_memory;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use rand::Rng;

use channel_plan::{channel_plan, HOP_PATTERN, NUM_CHANNELS};
use freq_memory::FreqMemory;

use crate::config::HopTuning;
use crate::driver::SdrDriver;
use crate::errors::{HopError, Result};

/// A packet-accepted notification posted by the sample path.
#[derive(Debug, Clone, Copy)]
pub struct PacketEvent {
    pub transmitter_id: u8,
    pub freq_err_hz: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Scan,
    Locked,
}

/// Current hop-follow state.
#[derive(Debug, Clone)]
pub struct HopState {
    stage: Stage,
    pub hop_idx: usize,
    pub transmitter_id: u8,
    pub missed: u32,
    t_hop: f64,
}

/// Pure, clock-agnostic hop-follow state machine (spec: Scan / Locked /
/// Cadence loop / Recovery). `now` is seconds elapsed since an arbitrary
/// epoch chosen by the caller.
pub struct HopController {
    tuning: HopTuning,
    channels: [u32; NUM_CHANNELS],
    memory: FreqMemory,
    state: HopState,
}

impl HopController {
    pub fn new(tuning: HopTuning) -> Self {
        Self {
            tuning,
            channels: channel_plan(),
            memory: FreqMemory::new(),
            state: HopState {
                stage: Stage::Scan,
                hop_idx: 0,
                transmitter_id: 0,
                missed: 0,
                t_hop: 0.0,
            },
        }
    }

    pub fn state(&self) -> &HopState {
        &self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state.stage == Stage::Locked
    }

    fn tune_freq(&self, hop_idx: usize) -> u32 {
        let ch = HOP_PATTERN[hop_idx % NUM_CHANNELS];
        let corr = self.memory.correction_hz(self.state.transmitter_id, ch);
        (self.channels[ch] as i64 + corr as i64) as u32
    }

    /// Begin (or resume) scanning at a caller-chosen random channel index.
    pub fn start_scan(&mut self, now: f64, scan_hop_idx: usize) -> u32 {
        self.state.stage = Stage::Scan;
        self.state.hop_idx = scan_hop_idx % NUM_CHANNELS;
        self.state.missed = 0;
        self.state.t_hop = now;
        self.tune_freq(self.state.hop_idx)
    }

    /// A packet was accepted by the frame slicer. Returns the next tune
    /// frequency, or `None` if the packet was judged a duplicate/glitch and
    /// the hop did not advance.
    pub fn on_packet_accepted(&mut self, event: PacketEvent, now: f64) -> Option<u32> {
        match self.state.stage {
            Stage::Scan => {
                self.state.transmitter_id = event.transmitter_id;
                self.state.stage = Stage::Locked;
                self.state.missed = 0;
                self.record_and_advance(event, now);
                Some(self.tune_freq(self.state.hop_idx))
            }
            Stage::Locked => {
                let expected = self.state.t_hop + self.tuning.dwell_time_secs(self.state.transmitter_id);
                let drift = now - expected;
                if drift < self.tuning.duplicate_drift_secs {
                    return None;
                }
                self.state.missed = 0;
                self.record_and_advance(event, now);
                Some(self.tune_freq(self.state.hop_idx))
            }
        }
    }

    fn record_and_advance(&mut self, event: PacketEvent, now: f64) {
        let ch = HOP_PATTERN[self.state.hop_idx % NUM_CHANNELS];
        self.memory.record(event.transmitter_id, ch, event.freq_err_hz);
        self.state.hop_idx = (self.state.hop_idx + 1) % NUM_CHANNELS;
        self.state.t_hop = now;
    }

    /// The cadence deadline fired before a packet arrived.
    pub fn on_deadline_miss(&mut self, now: f64, scan_hop_idx: usize) -> u32 {
        match self.state.stage {
            Stage::Scan => self.tune_freq(self.state.hop_idx),
            Stage::Locked => {
                self.state.missed += 1;
                if self.state.missed >= self.tuning.max_missed {
                    return self.start_scan(now, scan_hop_idx);
                }
                let expected = self.state.t_hop + self.tuning.dwell_time_secs(self.state.transmitter_id);
                self.state.t_hop = expected;
                self.state.hop_idx = (self.state.hop_idx + 1) % NUM_CHANNELS;
                self.tune_freq(self.state.hop_idx)
            }
        }
    }

    /// Seconds (on the caller's clock) at which the next deadline fires.
    pub fn next_deadline(&self, now: f64) -> f64 {
        let dwell = self.tuning.dwell_time_secs(self.state.transmitter_id);
        match self.state.stage {
            Stage::Scan => now,
            Stage::Locked => self.state.t_hop + dwell + self.tuning.deadline_slack_secs,
        }
    }
}

/// Drive a `HopController` against a real clock and a shared driver handle
/// until `shutdown` is set. Intended to run on its own `std::thread`.
pub fn run(
    mut controller: HopController,
    events: crossbeam_channel::Receiver<PacketEvent>,
    driver: Arc<Mutex<dyn SdrDriver>>,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    let start = Instant::now();
    let now_secs = || start.elapsed().as_secs_f64();

    let mut rng = rand::thread_rng();
    let initial_scan_idx = rng.gen_range(0..NUM_CHANNELS);
    let freq = controller.start_scan(now_secs(), initial_scan_idx);
    tune(&driver, freq)?;

    while !shutdown.load(Ordering::Relaxed) {
        let deadline = controller.next_deadline(now_secs());
        let timeout = (deadline - now_secs()).max(0.0);
        match events.recv_timeout(std::time::Duration::from_secs_f64(timeout)) {
            Ok(event) => {
                if let Some(freq) = controller.on_packet_accepted(event, now_secs()) {
                    tune(&driver, freq)?;
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                let scan_idx = rand::thread_rng().gen_range(0..NUM_CHANNELS);
                let freq = controller.on_deadline_miss(now_secs(), scan_idx);
                tune(&driver, freq)?;
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                return Err(HopError::ChannelClosed.into());
            }
        }
    }
    Ok(())
}

fn tune(driver: &Arc<Mutex<dyn SdrDriver>>, freq_hz: u32) -> Result<()> {
    let mut guard = driver
        .lock()
        .map_err(|_| HopError::TuneFailed("driver mutex poisoned".into()))?;
    guard.set_center_freq(freq_hz)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HopTuning;

    fn tuning() -> HopTuning {
        HopTuning {
            dwell_base_secs: 2.0,
            dwell_slope_secs: 0.0,
            deadline_slack_secs: 0.3,
            max_missed: 3,
            duplicate_drift_secs: -0.5,
        }
    }

    #[test]
    fn scan_transitions_to_locked_on_first_packet() {
        let mut hc = HopController::new(tuning());
        hc.start_scan(0.0, 5);
        assert!(!hc.is_locked());
        hc.on_packet_accepted(PacketEvent { transmitter_id: 1, freq_err_hz: 0 }, 0.1);
        assert!(hc.is_locked());
    }

    #[test]
    fn locked_state_advances_hop_idx_monotonically() {
        let mut hc = HopController::new(tuning());
        hc.start_scan(0.0, 10);
        hc.on_packet_accepted(PacketEvent { transmitter_id: 0, freq_err_hz: 0 }, 0.0);
        let start_idx = hc.state().hop_idx;
        let mut t = 2.0;
        for _ in 0..5 {
            hc.on_packet_accepted(PacketEvent { transmitter_id: 0, freq_err_hz: 0 }, t);
            t += 2.0;
        }
        assert_eq!(hc.state().hop_idx, (start_idx + 5) % NUM_CHANNELS);
    }

    #[test]
    fn early_duplicate_packet_does_not_advance_hop() {
        let mut hc = HopController::new(tuning());
        hc.start_scan(0.0, 0);
        hc.on_packet_accepted(PacketEvent { transmitter_id: 0, freq_err_hz: 0 }, 0.0);
        let idx_before = hc.state().hop_idx;
        // Packet arrives far too early relative to the dwell deadline.
        let result = hc.on_packet_accepted(PacketEvent { transmitter_id: 0, freq_err_hz: 0 }, 0.1);
        assert!(result.is_none());
        assert_eq!(hc.state().hop_idx, idx_before);
    }

    #[test]
    fn max_missed_deadlines_falls_back_to_scan() {
        let mut hc = HopController::new(tuning());
        hc.start_scan(0.0, 0);
        hc.on_packet_accepted(PacketEvent { transmitter_id: 0, freq_err_hz: 0 }, 0.0);
        let mut t = 2.0;
        for _ in 0..2 {
            hc.on_deadline_miss(t, 0);
            t += 2.0;
        }
        assert!(hc.is_locked());
        hc.on_deadline_miss(t, 3);
        assert!(!hc.is_locked());
    }

    #[test]
    fn missed_counter_resets_on_successful_packet() {
        let mut hc = HopController::new(tuning());
        hc.start_scan(0.0, 0);
        hc.on_packet_accepted(PacketEvent { transmitter_id: 0, freq_err_hz: 0 }, 0.0);
        hc.on_deadline_miss(2.0, 0);
        assert_eq!(hc.state().missed, 1);
        hc.on_packet_accepted(PacketEvent { transmitter_id: 0, freq_err_hz: 0 }, 4.0);
        assert_eq!(hc.state().missed, 0);
    }

    #[test]
    fn seeded_scan_sequence_is_reproducible() {
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        let draw = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.gen_range(0..NUM_CHANNELS)
        };

        assert_eq!(draw(42), draw(42));

        let mut hc_a = HopController::new(tuning());
        let mut hc_b = HopController::new(tuning());
        let idx = draw(7);
        assert_eq!(hc_a.start_scan(0.0, idx), hc_b.start_scan(0.0, idx));
    }
}
