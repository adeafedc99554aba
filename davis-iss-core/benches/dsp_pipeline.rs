use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use davis_iss_core::dsp::preamble;
use davis_iss_core::{Demodulator, PacketConfig};

fn silent_block(config: &PacketConfig) -> Vec<u8> {
    vec![127u8; config.block_size * 2]
}

fn benchmark_process_block(c: &mut Criterion) {
    let config = PacketConfig::new(8).unwrap();
    let raw = silent_block(&config);

    c.bench_function("process_block_symbol_length_8", |b| {
        let mut demod = Demodulator::new(config);
        b.iter(|| demod.process_block(black_box(&raw)).unwrap())
    });
}

fn benchmark_process_block_symbol_lengths(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_block_by_symbol_length");

    for &symbol_length in &[2usize, 4, 8, 16] {
        let config = PacketConfig::new(symbol_length).unwrap();
        let raw = silent_block(&config);

        group.bench_with_input(BenchmarkId::from_parameter(symbol_length), &symbol_length, |b, _| {
            let mut demod = Demodulator::new(config);
            b.iter(|| demod.process_block(black_box(&raw)).unwrap())
        });
    }

    group.finish();
}

fn benchmark_preamble_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("preamble_search");

    for &symbol_length in &[2usize, 4, 8, 16] {
        // A buffer with no preamble present is the worst case: every
        // sub-sample phase is scanned to completion before coming up empty.
        let quantized = vec![0u8; 4096 * symbol_length];

        group.bench_with_input(BenchmarkId::from_parameter(symbol_length), &symbol_length, |b, &sl| {
            b.iter(|| preamble::search(black_box(&quantized), black_box(sl)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_process_block,
    benchmark_process_block_symbol_lengths,
    benchmark_preamble_search
);
criterion_main!(benches);
