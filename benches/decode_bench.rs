use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vnunpack::formats::nscripter_spb::decode_pixels;
use vnunpack::{BitReader, ByteStream};

fn bench_bit_reader(c: &mut Criterion) {
    let data: Vec<u8> = (0..1024 * 1024u32).map(|i| (i * 31) as u8).collect();

    c.bench_function("bits_get_5_buffered_1mb", |b| {
        b.iter(|| {
            let mut bits = BitReader::new(black_box(&data));
            let mut acc = 0u32;
            while let Ok(v) = bits.get(5) {
                acc = acc.wrapping_add(v);
            }
            acc
        })
    });

    c.bench_function("bits_get_5_stream_1mb", |b| {
        b.iter(|| {
            let mut stream = ByteStream::from_slice(black_box(&data));
            let mut bits = BitReader::from_stream(&mut stream);
            let mut acc = 0u32;
            while let Ok(v) = bits.get(5) {
                acc = acc.wrapping_add(v);
            }
            acc
        })
    });
}

fn bench_spb(c: &mut Criterion) {
    // Any byte sequence is a valid pixel stream; the worst case needs
    // 35 bits per four values, so four bytes per pixel always suffice.
    let (width, height) = (512usize, 512usize);
    let data: Vec<u8> = (0..width * height * 4).map(|i| (i * 131 + 7) as u8).collect();

    c.bench_function("spb_decode_512x512", |b| {
        b.iter(|| {
            let mut bits = BitReader::new(black_box(&data));
            decode_pixels(width, height, &mut bits).unwrap()
        })
    });
}

criterion_group!(benches, bench_bit_reader, bench_spb);
criterion_main!(benches);
