//! Fs/4 de-rotation: shifts a signal centered at -Fs/4 to DC.
use num_complex::Complex64;

/// Multiply sample `n` by `j^n`, in place. The four-sample cycle collapses
/// to a sign/swap on the I and Q lanes rather than a full complex multiply.
pub fn rotate_fs4(samples: &mut [Complex64], start_phase: usize) {
    for (n, s) in samples.iter_mut().enumerate() {
        match (start_phase + n) % 4 {
            0 => {}
            1 => *s = Complex64::new(-s.im, s.re),
            2 => *s = Complex64::new(-s.re, -s.im),
            3 => *s = Complex64::new(s.im, -s.re),
            _ => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_cycle_returns_to_identity_every_four_samples() {
        let mut samples = vec![Complex64::new(1.0, 0.0); 8];
        rotate_fs4(&mut samples, 0);
        assert_eq!(samples[0], Complex64::new(1.0, 0.0));
        assert_eq!(samples[4], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn rotation_preserves_magnitude() {
        let mut samples = vec![Complex64::new(0.6, 0.8); 16];
        let original_norm = samples[0].norm();
        rotate_fs4(&mut samples, 0);
        for s in &samples {
            assert!((s.norm() - original_norm).abs() < 1e-12);
        }
    }

    #[test]
    fn start_phase_offsets_the_cycle() {
        let mut a = vec![Complex64::new(1.0, 0.0); 4];
        let mut b = vec![Complex64::new(1.0, 0.0); 4];
        rotate_fs4(&mut a, 0);
        rotate_fs4(&mut b, 1);
        assert_ne!(a[0], b[0]);
    }
}
