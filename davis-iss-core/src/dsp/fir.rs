//! 9-tap symmetric FIR low-pass filter, applied to the de-rotated baseband.
use num_complex::Complex64;

const TAPS: [f64; 9] = [
    0.017682261285,
    0.048171339939,
    0.122424706672,
    0.197408519126,
    0.228626345955,
    0.197408519126,
    0.122424706672,
    0.048171339939,
    0.017682261285,
];

/// Stateful FIR: retains the tail of the previous block so the sliding
/// window can be applied continuously across block boundaries.
pub struct Fir9 {
    history: [Complex64; 8],
}

impl Fir9 {
    pub fn new() -> Self {
        Self {
            history: [Complex64::new(0.0, 0.0); 8],
        }
    }

    /// Filter one block, producing one output sample per input sample.
    pub fn apply(&mut self, block: &[Complex64]) -> Vec<Complex64> {
        let mut extended = Vec::with_capacity(block.len() + 8);
        extended.extend_from_slice(&self.history);
        extended.extend_from_slice(block);

        let mut output = Vec::with_capacity(block.len());
        for i in 0..block.len() {
            let window = &extended[i..i + 9];
            let mut acc = Complex64::new(0.0, 0.0);
            for (tap, sample) in TAPS.iter().zip(window.iter()) {
                acc += sample * *tap;
            }
            output.push(acc);
        }

        let tail = &extended[extended.len() - 8..];
        self.history.copy_from_slice(tail);

        output
    }

    pub fn reset(&mut self) {
        self.history = [Complex64::new(0.0, 0.0); 8];
    }
}

impl Default for Fir9 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn taps_sum_to_approximately_unity_gain() {
        let sum: f64 = TAPS.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn dc_input_passes_through_at_unity_gain() {
        let mut fir = Fir9::new();
        let block = vec![Complex64::new(1.0, 0.0); 64];
        fir.apply(&block);
        let steady = fir.apply(&block);
        for sample in &steady[16..] {
            assert_relative_eq!(sample.re, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn output_length_matches_input_length() {
        let mut fir = Fir9::new();
        let block = vec![Complex64::new(0.0, 0.0); 37];
        assert_eq!(fir.apply(&block).len(), 37);
    }
}
