//! Slices DSP candidate indices into validated 10-byte frames.
use std::collections::HashSet;

use num_complex::Complex64;

use crate::dsp::{Demodulator, PacketConfig};
use crate::utils::{bit_reverse_u8, pack_bits_msb};

use super::crc16::Crc16Ccitt;

/// A validated, CRC-clean 10-byte packet plus the channel metrics measured
/// around it.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFrame {
    pub data: [u8; 10],
    pub rssi_db: f64,
    pub snr_db: f64,
    pub freq_err_hz: f64,
}

/// Per-block tally of what happened to each candidate index. Recoverable
/// drops (CRC mismatch, duplicate) are counted here rather than raised as
/// errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    pub accepted: usize,
    pub crc_failed: usize,
    pub duplicate: usize,
    pub out_of_range: usize,
}

/// Validate every candidate index against the demodulator's current
/// buffers, returning the accepted frames and updating `outcome`.
pub fn slice_candidates(
    demod: &Demodulator,
    candidates: &[usize],
    outcome: &mut FrameOutcome,
) -> Vec<CandidateFrame> {
    let crc = Crc16Ccitt::new();
    let mut seen = HashSet::new();
    let mut accepted = Vec::new();

    for &q in candidates {
        match build_frame(demod, q) {
            Some(data) => {
                if !seen.insert(data) {
                    outcome.duplicate += 1;
                    continue;
                }
                if crc.checksum(&data[2..10]) != 0 {
                    outcome.crc_failed += 1;
                    continue;
                }
                let (rssi_db, snr_db) = measure_rssi_snr(demod.config, &demod.filtered, q);
                let freq_err_hz = measure_freq_err(demod.config, &demod.discriminated, q);
                accepted.push(CandidateFrame {
                    data,
                    rssi_db,
                    snr_db,
                    freq_err_hz,
                });
                outcome.accepted += 1;
            }
            None => outcome.out_of_range += 1,
        }
    }

    accepted
}

fn build_frame(demod: &Demodulator, q: usize) -> Option<[u8; 10]> {
    let l = demod.config.symbol_length;
    let last_needed = q + (demod.config.packet_symbols - 1) * l;
    if last_needed >= demod.quantized.len() {
        return None;
    }

    let bits: Vec<u8> = (0..demod.config.packet_symbols)
        .map(|i| demod.quantized[q + i * l])
        .collect();
    let bytes = pack_bits_msb(&bits);
    debug_assert_eq!(bytes.len(), 10);

    let mut frame = [0u8; 10];
    for (i, &b) in bytes.iter().enumerate() {
        frame[i] = bit_reverse_u8(b);
    }
    Some(frame)
}

fn measure_rssi_snr(config: PacketConfig, filtered: &[Complex64], q: usize) -> (f64, f64) {
    let preamble_len = config.preamble_length;

    let signal_end = (q + preamble_len).min(filtered.len());
    let signal_power = mean_power(&filtered[q.min(filtered.len())..signal_end]);

    let noise_start = q.saturating_sub(preamble_len);
    let noise_power = mean_power(&filtered[noise_start..q.min(filtered.len())]);

    let rssi_db = if signal_power > 0.0 {
        10.0 * signal_power.log10()
    } else {
        -120.0
    };
    let snr_db = if noise_power > 0.0 {
        10.0 * (signal_power / noise_power).log10()
    } else {
        50.0
    };
    (rssi_db, snr_db)
}

fn mean_power(samples: &[Complex64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| s.norm_sqr()).sum::<f64>() / samples.len() as f64
}

fn measure_freq_err(config: PacketConfig, discriminated: &[f64], q: usize) -> f64 {
    use std::f64::consts::TAU;
    let end = (q + config.preamble_length).min(discriminated.len());
    let start = q.min(discriminated.len());
    if start >= end {
        return 0.0;
    }
    let window = &discriminated[start..end];
    let mean: f64 = window.iter().sum::<f64>() / window.len() as f64;
    -(mean * config.sample_rate as f64 / TAU).round()
}
