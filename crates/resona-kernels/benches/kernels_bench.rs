//! Criterion benchmarks for the hot render paths.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use resona_core::{BlockIo, Kernel, ParamBlocks, RenderContext};
use resona_kernels::{EnvelopeGenerator, FdnReverb, StageSet, StateVariableFilter};

const SR: f32 = 48000.0;
const FRAMES: usize = 128;

fn bench_block(kernel: &mut dyn Kernel, inputs: &[Vec<f32>], params: &[Vec<f32>], outs: usize) {
    let mut outputs = vec![vec![0.0; FRAMES]; outs];
    let ctx = RenderContext {
        sample_rate: SR,
        frames: FRAMES,
    };
    let mut io = BlockIo {
        inputs,
        outputs: &mut outputs,
    };
    kernel.render(&ctx, &mut io, &ParamBlocks::new(params));
    black_box(&outputs);
}

fn svf_bench(c: &mut Criterion) {
    let mut svf = StateVariableFilter::new(SR);
    let inputs = vec![vec![0.5; FRAMES]];
    let params = vec![vec![2500.0], vec![1.5]];
    c.bench_function("svf_block", |b| {
        b.iter(|| bench_block(&mut svf, &inputs, &params, 3));
    });
}

fn envelope_bench(c: &mut Criterion) {
    let mut env = EnvelopeGenerator::new(SR, StageSet::Adsr);
    let inputs = vec![vec![1.0; FRAMES]];
    let params = vec![vec![5.0], vec![80.0], vec![0.6], vec![200.0], vec![0.5]];
    c.bench_function("envelope_block", |b| {
        b.iter(|| bench_block(&mut env, &inputs, &params, 1));
    });
}

fn reverb_bench(c: &mut Criterion) {
    let mut reverb = FdnReverb::new(SR);
    let inputs = vec![vec![0.25; FRAMES]];
    let params: Vec<Vec<f32>> = FdnReverb::PARAMS.iter().map(|d| vec![d.default]).collect();
    c.bench_function("fdn_reverb_block", |b| {
        b.iter(|| bench_block(&mut reverb, &inputs, &params, 2));
    });
}

criterion_group!(benches, svf_bench, envelope_bench, reverb_bench);
criterion_main!(benches);
