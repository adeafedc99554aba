//! Sliding preamble search across sub-sample phases.
use rayon::prelude::*;
use std::collections::BTreeSet;

/// The 16-bit Davis ISS preamble, MSB-first: `1100 1011 1000 1001`.
pub const PREAMBLE_BITS: [u8; 16] = [1, 1, 0, 0, 1, 0, 1, 1, 1, 0, 0, 0, 1, 0, 0, 1];

/// Search every sub-sample offset `0..symbol_length` for the preamble
/// pattern. Offsets are evaluated independently and in parallel; the
/// returned candidate sample indices (each marking the first sample of the
/// frame that follows the preamble) are deduplicated and sorted.
pub fn search(quantized: &[u8], symbol_length: usize) -> Vec<usize> {
    if symbol_length == 0 {
        return Vec::new();
    }

    let found: Vec<usize> = (0..symbol_length)
        .into_par_iter()
        .flat_map_iter(|offset| search_offset(quantized, symbol_length, offset).into_iter())
        .collect();

    found.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

fn search_offset(quantized: &[u8], symbol_length: usize, offset: usize) -> Vec<usize> {
    if offset >= quantized.len() {
        return Vec::new();
    }
    let decimated: Vec<u8> = quantized[offset..].iter().step_by(symbol_length).copied().collect();

    let mut matches = Vec::new();
    if decimated.len() < PREAMBLE_BITS.len() {
        return matches;
    }
    for start in 0..=decimated.len() - PREAMBLE_BITS.len() {
        if decimated[start..start + PREAMBLE_BITS.len()] == PREAMBLE_BITS {
            let frame_start_decimated = start + PREAMBLE_BITS.len();
            let sample_idx = frame_start_decimated * symbol_length + offset;
            matches.push(sample_idx);
        }
    }
    matches
}
