use proptest::prelude::*;

use davis_iss_core::config::HopTuning;
use davis_iss_core::dsp::preamble::{self, PREAMBLE_BITS};
use davis_iss_core::frame::Crc16Ccitt;
use davis_iss_core::hop::channel_plan::NUM_CHANNELS;
use davis_iss_core::hop::freq_memory::FreqMemory;
use davis_iss_core::hop::{HopController, PacketEvent};
use davis_iss_core::utils::bit_reverse_u8;

fn build_quantized_with_preamble_at(symbol_length: usize, offset: usize, preamble_decimated_pos: usize) -> Vec<u8> {
    let total_decimated = preamble_decimated_pos + PREAMBLE_BITS.len() + 4;
    let len = offset + (total_decimated - 1) * symbol_length + 1;
    let mut q = vec![0u8; len];
    for (i, &bit) in PREAMBLE_BITS.iter().enumerate() {
        q[offset + (preamble_decimated_pos + i) * symbol_length] = bit;
    }
    q
}

fn tuning() -> HopTuning {
    HopTuning {
        dwell_base_secs: 2.0,
        dwell_slope_secs: 0.0,
        deadline_slack_secs: 0.3,
        max_missed: 3,
        duplicate_drift_secs: -0.5,
    }
}

proptest! {
    #[test]
    fn crc16_is_deterministic(data in prop::collection::vec(any::<u8>(), 0..64)) {
        let crc = Crc16Ccitt::new();
        prop_assert_eq!(crc.checksum(&data), crc.checksum(&data));
    }

    #[test]
    fn crc16_detects_single_bit_flips(
        data in prop::collection::vec(any::<u8>(), 1..64),
        idx in 0usize..64,
        bit in 0u8..8,
    ) {
        prop_assume!(idx < data.len());
        let crc = Crc16Ccitt::new();
        let original = crc.checksum(&data);

        let mut flipped = data.clone();
        flipped[idx] ^= 1 << bit;

        prop_assert_ne!(original, crc.checksum(&flipped));
    }

    #[test]
    fn bit_reverse_u8_is_an_involution(byte in any::<u8>()) {
        prop_assert_eq!(bit_reverse_u8(bit_reverse_u8(byte)), byte);
    }

    #[test]
    fn bit_reverse_u8_preserves_popcount(byte in any::<u8>()) {
        prop_assert_eq!(bit_reverse_u8(byte).count_ones(), byte.count_ones());
    }

    /// Property 1: appending a payload's own checksum always leaves a
    /// zero residue, for any payload, not just a single hard-coded frame.
    #[test]
    fn crc16_residue_is_zero_after_appending_own_checksum(data in prop::collection::vec(any::<u8>(), 0..64)) {
        let crc = Crc16Ccitt::new();
        let check = crc.checksum(&data);
        let mut with_crc = data.clone();
        with_crc.push((check >> 8) as u8);
        with_crc.push((check & 0xFF) as u8);
        prop_assert_eq!(crc.checksum(&with_crc), 0);
    }

    /// Property 5: the preamble is found regardless of which sub-sample
    /// phase it lands on and where in the buffer it starts.
    #[test]
    fn preamble_search_finds_preamble_at_any_offset(
        symbol_length in 1usize..9,
        offset in 0usize..9,
        preamble_decimated_pos in 0usize..20,
    ) {
        prop_assume!(offset < symbol_length);
        let q = build_quantized_with_preamble_at(symbol_length, offset, preamble_decimated_pos);
        let hits = preamble::search(&q, symbol_length);
        prop_assert!(!hits.is_empty());
    }

    /// Property 6: while locked, every accepted (non-duplicate) packet
    /// advances `hop_idx` by exactly one step, mod NUM_CHANNELS, for any
    /// run length and any starting channel.
    #[test]
    fn hop_idx_advances_monotonically_for_any_run_length(
        scan_idx in 0usize..NUM_CHANNELS,
        steps in 1usize..50,
    ) {
        let mut hc = HopController::new(tuning());
        hc.start_scan(0.0, scan_idx);
        hc.on_packet_accepted(PacketEvent { transmitter_id: 0, freq_err_hz: 0 }, 0.0);
        let start_idx = hc.state().hop_idx;

        let mut t = 2.0;
        for _ in 0..steps {
            hc.on_packet_accepted(PacketEvent { transmitter_id: 0, freq_err_hz: 0 }, t);
            t += 2.0;
        }
        prop_assert_eq!(hc.state().hop_idx, (start_idx + steps) % NUM_CHANNELS);
    }

    /// Property 7: once the ring holds nothing but a single repeated
    /// value, the weighted correction reports that value exactly (unit
    /// gain at steady state), for any frequency-error magnitude.
    #[test]
    fn freq_memory_unit_gain_at_steady_state(freq_err_hz in -50_000i32..50_000) {
        let mut mem = FreqMemory::new();
        for _ in 0..10 {
            mem.record(3, 9, freq_err_hz);
        }
        prop_assert_eq!(mem.correction_hz(3, 9), freq_err_hz);
    }
}
