//! SDR driver boundary. `MockDriver` stands in for a real RTL-SDR backend
//! in tests and in the CLI's `--replay` mode; a hardware-backed
//! implementation is a second trait impl outside this crate.
use std::collections::VecDeque;

use crate::config::GainSetting;
use crate::errors::{DriverError, Result};

/// Everything a hop controller and sample path need from a tuner.
pub trait SdrDriver: Send {
    fn set_sample_rate(&mut self, hz: u32) -> Result<()>;
    fn set_gain(&mut self, gain: GainSetting) -> Result<()>;
    fn set_freq_correction(&mut self, ppm: i32) -> Result<()>;
    fn set_center_freq(&mut self, hz: u32) -> Result<()>;
    fn start_stream(&mut self) -> Result<()>;
    /// Block until `buf.len()` bytes have been read, or return an error.
    fn read_block(&mut self, buf: &mut [u8]) -> Result<()>;
    fn stop_stream(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

/// Deterministic in-memory driver, fed from a captured or synthetic byte
/// stream. Useful both for unit tests and for the CLI's replay mode (see
/// `original_source`'s `replay.py`).
pub struct MockDriver {
    samples: VecDeque<u8>,
    /// If true, the sample queue wraps around instead of running dry.
    pub loop_samples: bool,
    pub sample_rate_hz: Option<u32>,
    pub gain: Option<GainSetting>,
    pub ppm_correction: Option<i32>,
    pub center_freq_hz: Option<u32>,
    pub tune_history: Vec<u32>,
    streaming: bool,
    closed: bool,
}

impl MockDriver {
    pub fn new(samples: Vec<u8>) -> Self {
        Self {
            samples: samples.into(),
            loop_samples: false,
            sample_rate_hz: None,
            gain: None,
            ppm_correction: None,
            center_freq_hz: None,
            tune_history: Vec::new(),
            streaming: false,
            closed: false,
        }
    }

    pub fn looping(mut self) -> Self {
        self.loop_samples = true;
        self
    }
}

impl SdrDriver for MockDriver {
    fn set_sample_rate(&mut self, hz: u32) -> Result<()> {
        self.sample_rate_hz = Some(hz);
        Ok(())
    }

    fn set_gain(&mut self, gain: GainSetting) -> Result<()> {
        self.gain = Some(gain);
        Ok(())
    }

    fn set_freq_correction(&mut self, ppm: i32) -> Result<()> {
        self.ppm_correction = Some(ppm);
        Ok(())
    }

    fn set_center_freq(&mut self, hz: u32) -> Result<()> {
        self.center_freq_hz = Some(hz);
        self.tune_history.push(hz);
        Ok(())
    }

    fn start_stream(&mut self) -> Result<()> {
        if self.closed {
            return Err(DriverError::StreamClosed.into());
        }
        self.streaming = true;
        Ok(())
    }

    fn read_block(&mut self, buf: &mut [u8]) -> Result<()> {
        if !self.streaming {
            return Err(DriverError::StreamClosed.into());
        }
        for slot in buf.iter_mut() {
            match self.samples.pop_front() {
                Some(b) => {
                    *slot = b;
                    if self.loop_samples {
                        self.samples.push_back(b);
                    }
                }
                None => {
                    return Err(DriverError::ShortRead {
                        requested: buf.len(),
                        actual: 0,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    fn stop_stream(&mut self) -> Result<()> {
        self.streaming = false;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.streaming = false;
        self.closed = true;
        Ok(())
    }
}
