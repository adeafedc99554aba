//! Hard-decision bit quantizer.

/// A negative discriminator output quantizes to a `1` bit, non-negative to
/// `0`. One byte per bit, matching the sliding buffer layout used
/// throughout the DSP pipeline.
pub fn quantize(discriminated: &[f64]) -> Vec<u8> {
    discriminated
        .iter()
        .map(|&v| if v < 0.0 { 1u8 } else { 0u8 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_values_quantize_to_one() {
        assert_eq!(quantize(&[-0.5, -1e-12]), vec![1, 1]);
    }

    #[test]
    fn non_negative_values_quantize_to_zero() {
        assert_eq!(quantize(&[0.0, 0.5, 1.0]), vec![0, 0, 0]);
    }
}
