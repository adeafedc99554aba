//! The 51-channel US-ISM plan and the station's fixed hop pattern.

pub const NUM_CHANNELS: usize = 51;
const FIRST_CHANNEL_HZ: f64 = 902_419_338.0;
const LAST_CHANNEL_HZ: f64 = 927_506_862.0;

/// Channel centre frequencies in Hz, evenly spaced across the US-ISM band.
pub fn channel_plan() -> [u32; NUM_CHANNELS] {
    let mut channels = [0u32; NUM_CHANNELS];
    let step = (LAST_CHANNEL_HZ - FIRST_CHANNEL_HZ) / (NUM_CHANNELS - 1) as f64;
    for (i, slot) in channels.iter_mut().enumerate() {
        *slot = (FIRST_CHANNEL_HZ + i as f64 * step).round() as u32;
    }
    channels
}

/// Fixed permutation of `0..51` describing the order in which the station
/// visits channels.
pub const HOP_PATTERN: [usize; NUM_CHANNELS] = [
    0, 19, 41, 25, 8, 47, 32, 13, 36, 22, 3, 29, 44, 16, 5, 27, 38, 10, 49, 21, 2, 30, 42, 14, 48,
    7, 24, 34, 45, 1, 17, 39, 26, 9, 31, 50, 37, 12, 20, 33, 4, 43, 28, 15, 35, 6, 40, 11, 23, 46,
    18,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_plan_has_expected_endpoints() {
        let channels = channel_plan();
        assert_eq!(channels[0], 902_419_338);
        assert_eq!(channels[NUM_CHANNELS - 1], 927_506_862);
    }

    #[test]
    fn channel_plan_is_monotonically_increasing() {
        let channels = channel_plan();
        for w in channels.windows(2) {
            assert!(w[1] > w[0]);
        }
    }

    #[test]
    fn hop_pattern_is_a_permutation_of_0_to_50() {
        let mut sorted = HOP_PATTERN.to_vec();
        sorted.sort_unstable();
        let expected: Vec<usize> = (0..NUM_CHANNELS).collect();
        assert_eq!(sorted, expected);
    }
}
