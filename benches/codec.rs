use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use serial_ota::protocol::{Command, FrameDecoder, crc16, decode, encode};

const SIZES: [(&str, usize); 3] = [("64b", 64), ("512b", 512), ("1kb", 1024)];

fn bench_crc(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc16");

    for (label, size) in SIZES {
        let data = vec![0xA5u8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(label, |b| {
            b.iter(|| black_box(crc16(black_box(&data))));
        });
    }

    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    for (label, size) in SIZES {
        let payload = vec![0u8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("encode_{label}"), |b| {
            b.iter(|| black_box(encode(Command::Data, &payload).unwrap()));
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    for (label, size) in SIZES {
        let encoded = encode(Command::Data, &vec![0u8; size]).unwrap();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("decode_{label}"), |b| {
            b.iter(|| black_box(decode(&encoded).unwrap()));
        });
    }

    group.finish();
}

fn bench_stream_decoder(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    // Three DATA frames back to back, as a device sees a 1.5 KiB image
    let stream: Vec<u8> = (0..3)
        .flat_map(|_| encode(Command::Data, &[0x5Au8; 512]).unwrap())
        .collect();
    group.throughput(Throughput::Bytes(stream.len() as u64));
    group.bench_function("stream_decoder_3x512b", |b| {
        b.iter(|| {
            let mut decoder = FrameDecoder::new();
            black_box(decoder.feed(&stream));
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_crc,
    bench_encode,
    bench_decode,
    bench_stream_decoder
);
criterion_main!(benches);
