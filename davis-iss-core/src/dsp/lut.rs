//! Byte-to-complex conversion lookup table.
use num_complex::Complex64;

/// Maps raw 8-bit I/Q samples, as delivered by the tuner, to centered
/// floating point values via a precomputed 256-entry table.
pub struct ByteToComplexLut {
    table: [f64; 256],
}

impl ByteToComplexLut {
    pub fn new() -> Self {
        let mut table = [0.0f64; 256];
        for (b, slot) in table.iter_mut().enumerate() {
            *slot = (b as f64 - 127.4) / 127.6;
        }
        Self { table }
    }

    #[inline]
    pub fn value(&self, byte: u8) -> f64 {
        self.table[byte as usize]
    }

    /// Convert an interleaved I/Q byte stream into complex samples.
    pub fn convert(&self, raw: &[u8]) -> Vec<Complex64> {
        raw.chunks_exact(2)
            .map(|pair| Complex64::new(self.value(pair[0]), self.value(pair[1])))
            .collect()
    }
}

impl Default for ByteToComplexLut {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_byte_is_near_zero() {
        let lut = ByteToComplexLut::new();
        assert!(lut.value(127).abs() < 0.01);
    }

    #[test]
    fn extremes_are_symmetric_in_magnitude() {
        let lut = ByteToComplexLut::new();
        assert!((lut.value(0).abs() - lut.value(255).abs()).abs() < 0.02);
        assert!(lut.value(0) < 0.0);
        assert!(lut.value(255) > 0.0);
    }

    #[test]
    fn convert_pairs_bytes_into_complex_samples() {
        let lut = ByteToComplexLut::new();
        let raw = [127, 127, 0, 255];
        let samples = lut.convert(&raw);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].re, lut.value(0));
        assert_eq!(samples[1].im, lut.value(255));
    }
}
