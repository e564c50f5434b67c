use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use wire_io::core::codec::{Input, Output};
use wire_io::core::options::{OptionInput, OptionOutput};
use wire_io::core::stream::Stream;
use wire_io::io;

#[allow(clippy::unwrap_used)]
fn bench_primitive_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitive_codec");
    let counts = [16usize, 256, 4096];

    for &count in &counts {
        let values: Vec<i64> = (0..count as i64).collect();
        group.throughput(Throughput::Bytes((count * 8) as u64));

        for inverted in [false, true] {
            let mode = if inverted { "le" } else { "be" };
            group.bench_function(format!("write_longs_{mode}_{count}"), |b| {
                b.iter_batched(
                    || {
                        let mut out = io::array_output(count * 8);
                        out.set_inverted(inverted);
                        out
                    },
                    |mut out| {
                        out.write_longs(black_box(&values)).unwrap();
                        out
                    },
                    BatchSize::SmallInput,
                )
            });

            let mut out = io::array_output(count * 8);
            out.set_inverted(inverted);
            out.write_longs(&values).unwrap();
            let encoded = out.into_bytes();
            group.bench_function(format!("read_longs_{mode}_{count}"), |b| {
                b.iter(|| {
                    let mut input = io::array_input(encoded.clone());
                    input.set_inverted(inverted);
                    black_box(input.read_longs(count).unwrap())
                })
            });
        }
    }

    group.finish();
}

#[allow(clippy::unwrap_used)]
fn bench_strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("strings");
    let text = "wire".repeat(60);
    let mut lines = Vec::new();
    for i in 0..64 {
        lines.extend_from_slice(format!("line number {i}\n").as_bytes());
    }

    group.bench_function("write_read_string_240", |b| {
        b.iter(|| {
            let mut out = io::array_output(256);
            out.write_string(black_box(&text)).unwrap();
            let mut input = io::array_input(out.into_written());
            black_box(input.read_string().unwrap())
        })
    });

    group.throughput(Throughput::Bytes(lines.len() as u64));
    group.bench_function("read_lines_64", |b| {
        b.iter(|| {
            let mut input = io::array_input(lines.clone());
            let mut count = 0;
            while input.has_remaining().unwrap() {
                black_box(input.read_line().unwrap());
                count += 1;
            }
            count
        })
    });

    group.finish();
}

#[allow(clippy::unwrap_used)]
fn bench_options(c: &mut Criterion) {
    let mut group = c.benchmark_group("options");

    let mut writer = OptionOutput::new(io::array_output(4096));
    for i in 0..100 {
        writer.write_int(&format!("key{i}"), i).unwrap();
        writer.write_string(&format!("name{i}"), "value").unwrap();
    }
    let encoded = writer.into_inner().into_written();

    group.throughput(Throughput::Bytes(encoded.len() as u64));
    group.bench_function("decode_200_entries", |b| {
        b.iter(|| {
            let mut input = io::array_input(encoded.clone());
            black_box(OptionInput::read(&mut input).unwrap())
        })
    });

    let options = {
        let mut input = io::array_input(encoded.clone());
        OptionInput::read(&mut input).unwrap()
    };
    group.bench_function("lookup_last_entry", |b| {
        b.iter(|| black_box(options.get_string(black_box("name99"), "")))
    });

    group.finish();
}

criterion_group!(benches, bench_primitive_codec, bench_strings, bench_options);
criterion_main!(benches);
