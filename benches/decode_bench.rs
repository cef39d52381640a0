use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fbchunks::{checksum, BitCursor, SaveFile, CHECKSUM_SEED};

/// Packs `(value, width)` fields least significant bit first
fn pack(fields: &[(u64, u32)]) -> Vec<u8> {
    let mut data = Vec::new();
    let mut len = 0usize;
    for &(value, width) in fields {
        for k in 0..width {
            if len % 8 == 0 {
                data.push(0u8);
            }
            let last = data.len() - 1;
            data[last] |= (((value >> k) & 1) as u8) << (len % 8);
            len += 1;
        }
    }
    data
}

// Small well formed little endian container: empty header values and a
// record without the optional block
fn sample() -> Vec<u8> {
    let mut header = b"FBHEADER".to_vec();
    header.extend_from_slice(&1u16.to_le_bytes());
    header.extend_from_slice(&19u32.to_le_bytes());
    for i in 0..19u32 {
        header.extend_from_slice(&i.to_le_bytes());
        header.extend_from_slice(&0u16.to_le_bytes());
    }

    let data = pack(&[
        (fbchunks::RECORD_MAGIC.swap_bytes(), 64),
        (0, 1),
        (0, 64),
        (0, 16),
        (u64::from(3u16.swap_bytes()), 16),
        (u64::from(21u16.swap_bytes()), 16),
        (0, 16),
        (0, 16),
        (0, 32),
        (0, 16),
        (0, 32),
        (0, 16),
    ]);

    let mut out = b"FBCHUNKS".to_vec();
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&(header.len() as u32 + 4).to_le_bytes());
    out.extend_from_slice(&(data.len() as u32 + 4).to_le_bytes());
    out.extend_from_slice(&checksum(CHECKSUM_SEED, &header).to_le_bytes());
    out.extend_from_slice(&header);
    out.extend_from_slice(&checksum(CHECKSUM_SEED, &data).to_le_bytes());
    out.extend_from_slice(&data);
    out
}

pub fn checksum_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("checksum");
    for size in [64, 1024, 16 * 1024].iter() {
        let data = vec![0xa5u8; *size];
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &_size| {
            b.iter(|| checksum(CHECKSUM_SEED, black_box(&data)))
        });
    }
    group.finish();
}

pub fn bit_cursor_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("bit_cursor");
    let data = vec![0x5au8; 4096];
    group.throughput(Throughput::Bytes(data.len() as u64));
    for width in [1u32, 13, 32].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(width), width, |b, &width| {
            b.iter(|| {
                let mut cursor = BitCursor::new(black_box(&data));
                let mut acc = 0u64;
                while let Ok(x) = cursor.read_bits(width) {
                    acc ^= x;
                }
                acc
            })
        });
    }
    group.finish();
}

pub fn container_benchmark(c: &mut Criterion) {
    let data = sample();
    let mut group = c.benchmark_group("container");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("decode", |b| {
        b.iter(|| SaveFile::from_slice(black_box(&data)).unwrap())
    });
    group.finish();
}

criterion_group!(
    benches,
    checksum_benchmark,
    bit_cursor_benchmark,
    container_benchmark
);
criterion_main!(benches);
