//! Extraction and profiling performance benchmarks.
//!
//! Measures pipeline throughput across input sizes and shapes.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tabula::{SourceKind, extract_from_text, profile, select_best};

/// Generate synthetic CSV data with the specified number of rows.
fn generate_csv_data(rows: usize, cols: usize) -> String {
    let mut data = String::new();

    for i in 0..cols {
        if i > 0 {
            data.push(',');
        }
        data.push_str(&format!("column_{}", i + 1));
    }
    data.push('\n');

    for row in 0..rows {
        for col in 0..cols {
            if col > 0 {
                data.push(',');
            }
            match col % 4 {
                0 => data.push_str(&format!("2023-{:02}-{:02}", (row % 12) + 1, (row % 28) + 1)),
                1 => data.push_str(&format!("group_{}", row % 8)),
                2 => data.push_str(&format!("{:.2}", row as f64 * 1.5)),
                3 => data.push_str(&format!("{}", row * 3)),
                _ => unreachable!(),
            }
        }
        data.push('\n');
    }

    data
}

/// Benchmark candidate extraction from CSV text of various sizes.
fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_from_text");

    for rows in [100, 1_000, 5_000].iter() {
        let data = generate_csv_data(*rows, 8);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            b.iter(|| extract_from_text(black_box(data), SourceKind::Csv));
        });
    }

    group.finish();
}

/// Benchmark profiling the chosen candidate.
fn bench_profile(c: &mut Criterion) {
    let mut group = c.benchmark_group("profile");

    for rows in [100, 1_000, 5_000].iter() {
        let data = generate_csv_data(*rows, 8);
        let candidates = extract_from_text(&data, SourceKind::Csv);
        let table = select_best(&candidates).unwrap().clone();
        group.bench_with_input(BenchmarkId::new("rows", rows), &table, |b, table| {
            b.iter(|| profile(black_box(table)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_extract, bench_profile);
criterion_main!(benches);
