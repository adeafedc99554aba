//! DSP front end: raw bytes in, candidate frame boundaries out.
//!
//! `Demodulator` owns every sliding buffer on the sample path and processes
//! one fixed-size block per call. Buffers are rotated left by `block_size`
//! samples on every call so that downstream code (the frame slicer) can
//! always look a little way backward and forward of a candidate index.

pub mod discriminator;
pub mod fir;
pub mod lut;
pub mod preamble;
pub mod quantizer;
pub mod rotate;

use discriminator::Discriminator;
use fir::Fir9;
use lut::ByteToComplexLut;
use num_complex::Complex64;

use crate::errors::{DspError, Result};

/// Immutable packet geometry, derived once from the receiver's symbol
/// length (samples per transmitted bit).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacketConfig {
    pub bit_rate: usize,
    pub symbol_length: usize,
    pub sample_rate: usize,
    pub preamble_symbols: usize,
    pub packet_symbols: usize,
    pub preamble_length: usize,
    pub packet_length: usize,
    pub block_size: usize,
    pub buffer_length: usize,
}

impl PacketConfig {
    pub fn new(symbol_length: usize) -> Result<Self> {
        if symbol_length == 0 {
            return Err(DspError::InvalidSymbolLength(symbol_length).into());
        }
        let bit_rate = 19_200;
        let sample_rate = bit_rate * symbol_length;
        let preamble_symbols = 16;
        let packet_symbols = 80;
        let preamble_length = preamble_symbols * symbol_length;
        let packet_length = packet_symbols * symbol_length;
        let block_size = 512;
        let blocks_needed = (packet_length as f64 / block_size as f64).ceil() as usize + 2;
        let buffer_length = blocks_needed * block_size;

        Ok(Self {
            bit_rate,
            symbol_length,
            sample_rate,
            preamble_symbols,
            packet_symbols,
            preamble_length,
            packet_length,
            block_size,
            buffer_length,
        })
    }
}

/// Owns the DSP sample path's sliding buffers and stateful filters.
pub struct Demodulator {
    pub config: PacketConfig,
    lut: ByteToComplexLut,
    fir: Fir9,
    discriminator: Discriminator,
    samples_seen: usize,

    pub raw_iq: Vec<Complex64>,
    pub filtered: Vec<Complex64>,
    pub discriminated: Vec<f64>,
    pub quantized: Vec<u8>,
}

impl Demodulator {
    pub fn new(config: PacketConfig) -> Self {
        let n = config.buffer_length;
        Self {
            config,
            lut: ByteToComplexLut::new(),
            fir: Fir9::new(),
            discriminator: Discriminator::new(),
            samples_seen: 0,
            raw_iq: vec![Complex64::new(0.0, 0.0); n],
            filtered: vec![Complex64::new(0.0, 0.0); n],
            discriminated: vec![0.0; n],
            quantized: vec![0u8; n],
        }
    }

    /// Process one block of raw interleaved I/Q bytes (`2 * block_size`
    /// bytes) and return the candidate frame-start indices found within
    /// the block that was just decoded.
    pub fn process_block(&mut self, raw: &[u8]) -> Result<Vec<usize>> {
        let block_size = self.config.block_size;
        if raw.len() != block_size * 2 {
            return Err(DspError::BufferUnderrun {
                requested: block_size * 2,
                available: raw.len(),
            }
            .into());
        }

        let mut block = self.lut.convert(raw);
        rotate::rotate_fs4(&mut block, self.samples_seen);
        self.samples_seen = self.samples_seen.wrapping_add(block.len());

        shift_in(&mut self.raw_iq, &block, block_size);

        let filtered_block = self.fir.apply(&block);
        shift_in(&mut self.filtered, &filtered_block, block_size);

        let disc_block = self.discriminator.process(&filtered_block);
        shift_in(&mut self.discriminated, &disc_block, block_size);

        let quant_block = quantizer::quantize(&disc_block);
        shift_in(&mut self.quantized, &quant_block, block_size);

        let candidates = preamble::search(&self.quantized, self.config.symbol_length);
        Ok(candidates
            .into_iter()
            .filter(|&idx| idx <= block_size)
            .collect())
    }

    pub fn reset(&mut self) {
        self.fir.reset();
        self.discriminator.reset();
        self.samples_seen = 0;
        self.raw_iq.iter_mut().for_each(|s| *s = Complex64::new(0.0, 0.0));
        self.filtered.iter_mut().for_each(|s| *s = Complex64::new(0.0, 0.0));
        self.discriminated.iter_mut().for_each(|s| *s = 0.0);
        self.quantized.iter_mut().for_each(|s| *s = 0);
    }
}

/// Rotate `buffer` left by `block_size` elements and write `block` (which
/// must have length `block_size`) into the freed tail.
fn shift_in<T: Copy>(buffer: &mut [T], block: &[T], block_size: usize) {
    debug_assert_eq!(block.len(), block_size);
    let len = buffer.len();
    buffer.copy_within(block_size..len, 0);
    buffer[len - block_size..].copy_from_slice(block);
}
