//! Davis Instruments ISS receiver core
//!
//! This crate demodulates the 2-FSK signal transmitted by a Davis Instruments
//! Integrated Sensor Suite (ISS) weather station, recovers and validates
//! frames, follows the station's frequency-hop sequence, and decodes the
//! per-sensor payloads. The modules are organized so that the sample path
//! (DSP → framing) and the control path (hop controller) can be driven
//! independently and tested without hardware.

pub mod config;
pub mod dsp;
pub mod driver;
pub mod errors;
pub mod events;
pub mod frame;
pub mod hop;
pub mod logging;
pub mod receiver;
pub mod sensors;
pub mod utils;

pub use config::ReceiverConfig;
pub use dsp::{Demodulator, PacketConfig};
pub use errors::{ReceiverError, Result};
pub use events::{ChannelSink, EventSink, LoggingSink, WeatherEvent};
pub use frame::CandidateFrame;
pub use hop::{HopController, HopState};
pub use receiver::SamplePath;
