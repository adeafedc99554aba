//! Frame extraction: CRC-validated, deduplicated candidate frames.

pub mod crc16;
pub mod slicer;

pub use crc16::Crc16Ccitt;
pub use slicer::{slice_candidates, CandidateFrame, FrameOutcome};
