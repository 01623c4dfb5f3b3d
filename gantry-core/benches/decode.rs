//! Decoder benchmarks: batch bodies per second
//!
//! Measures text and binary batch decoding over in-memory bodies, so only
//! framing and copy cost is timed.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use futures::executor::block_on;
use futures::io::Cursor;
use gantry_core::decode::{read_batch, BatchFormat, SizeLimits};
use gantry_core::pool::BufferPool;

const MESSAGE_SIZES: &[usize] = &[64, 256, 1024, 4096];
const BATCH_LEN: usize = 256;

fn text_body(size: usize) -> Vec<u8> {
    let mut raw = Vec::with_capacity((size + 1) * BATCH_LEN);
    for _ in 0..BATCH_LEN {
        raw.extend(std::iter::repeat(b'm').take(size));
        raw.push(b'\n');
    }
    raw
}

fn binary_body(size: usize) -> Vec<u8> {
    let mut raw = (BATCH_LEN as u32).to_be_bytes().to_vec();
    for _ in 0..BATCH_LEN {
        raw.extend_from_slice(&(size as u32).to_be_bytes());
        raw.extend(std::iter::repeat(b'm').take(size));
    }
    raw
}

fn decode_batches(c: &mut Criterion) {
    let pool = BufferPool::default();
    let limits = SizeLimits::new(1024 * 1024, 16 * 1024 * 1024);

    for (name, format, build) in [
        ("text", BatchFormat::Text, text_body as fn(usize) -> Vec<u8>),
        ("binary", BatchFormat::Binary, binary_body as fn(usize) -> Vec<u8>),
    ] {
        let mut group = c.benchmark_group(format!("decode/{name}"));
        for &size in MESSAGE_SIZES {
            let raw = build(size);
            group.throughput(Throughput::Bytes(raw.len() as u64));
            group.bench_with_input(BenchmarkId::from_parameter(size), &raw, |b, raw| {
                b.iter(|| {
                    let mut body = Cursor::new(raw.as_slice());
                    let batch = block_on(read_batch(format, &mut body, &limits, &pool)).unwrap();
                    black_box(batch.len())
                });
            });
        }
        group.finish();
    }
}

criterion_group!(benches, decode_batches);
criterion_main!(benches);
