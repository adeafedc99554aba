//! FM discriminator: complex baseband -> instantaneous frequency deviation.
use num_complex::Complex64;

const EPS: f64 = 1e-10;

/// Stateful discriminator: needs the last sample of the previous block to
/// produce a value for the first sample of the next one.
pub struct Discriminator {
    last: Complex64,
}

impl Discriminator {
    pub fn new() -> Self {
        Self {
            last: Complex64::new(0.0, 0.0),
        }
    }

    pub fn process(&mut self, block: &[Complex64]) -> Vec<f64> {
        let mut out = Vec::with_capacity(block.len());
        let mut prev = self.last;
        for &z in block {
            out.push(discriminate_pair(prev, z));
            prev = z;
        }
        if let Some(&last) = block.last() {
            self.last = last;
        }
        out
    }

    pub fn reset(&mut self) {
        self.last = Complex64::new(0.0, 0.0);
    }
}

impl Default for Discriminator {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn discriminate_pair(prev: Complex64, cur: Complex64) -> f64 {
    let (a, b) = (prev.re, prev.im);
    let (c, d) = (cur.re, cur.im);
    (b * c - a * d) / (a * a + b * b + EPS)
}
