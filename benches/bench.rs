use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use jfif_inspect::{
    analyze,
    dct::{dct, idct, Block},
};

/// SOI, a comment, a scan header followed by `scan_len` bytes of data with stuffed `0xFF`s, EOI.
fn synthetic_jpeg(scan_len: usize) -> Vec<u8> {
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xFE, 0x00, 0x06, b't', b'e', b's', b't'];
    jpeg.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
    let mut rng = fastrand::Rng::with_seed(0);
    while jpeg.len() < scan_len {
        match rng.u8(..) {
            0xFF => jpeg.extend_from_slice(&[0xFF, 0x00]),
            b => jpeg.push(b),
        }
    }
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

fn bench_analyze(c: &mut Criterion) {
    let jpeg = synthetic_jpeg(1 << 20);
    let mut group = c.benchmark_group("analyze");
    group.throughput(Throughput::Bytes(jpeg.len() as u64));
    group.bench_function("scan", |b| b.iter(|| analyze(black_box(&jpeg)).unwrap()));
    group.finish();
}

fn bench_dct(c: &mut Criterion) {
    let mut block: Block = [[0; 8]; 8];
    for (i, v) in block.iter_mut().flatten().enumerate() {
        *v = (i * 4) as i32;
    }
    c.bench_function("dct", |b| b.iter(|| dct(black_box(&block))));
    let coeffs = dct(&block);
    c.bench_function("idct", |b| b.iter(|| idct(black_box(&coeffs))));
}

criterion_group!(benches, bench_analyze, bench_dct);
criterion_main!(benches);
