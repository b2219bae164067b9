//! ヒストグラム構築とフィルタカーネルのベンチマーク
//!
//! 逐次実行と rayon による分割実行の比較

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use image_filters::core::RasterBuffer;
use image_filters::kernels::{build_histogram, compute_threshold, negative, sobel, ExecutionPolicy};
use std::time::Duration;

fn gray_image(width: u32, height: u32) -> RasterBuffer {
    let data = (0..width * height)
        .map(|i| (i.wrapping_mul(2654435761) >> 24) as u8)
        .collect();
    RasterBuffer::new(data, width, height, 1).unwrap()
}

fn policies() -> Vec<(String, ExecutionPolicy)> {
    let cpus = num_cpus::get().max(2);
    vec![
        ("serial".to_string(), ExecutionPolicy::Serial),
        ("parallel_2".to_string(), ExecutionPolicy::Parallel { partitions: 2 }),
        (
            format!("parallel_{cpus}"),
            ExecutionPolicy::Parallel { partitions: cpus },
        ),
    ]
}

/// ヒストグラム構築 + 大津法の閾値算出
fn benchmark_histogram(c: &mut Criterion) {
    let mut group = c.benchmark_group("Histogram Reduction");
    group.measurement_time(Duration::from_secs(10));

    for (width, height) in [(256, 256), (1920, 1080)] {
        let image = gray_image(width, height);
        for (name, policy) in policies() {
            group.bench_with_input(
                BenchmarkId::new(name, format!("{width}x{height}")),
                &image,
                |b, image| {
                    b.iter(|| {
                        let histogram = build_histogram(image, policy).unwrap();
                        std::hint::black_box(compute_threshold(&histogram, image.pixel_count() as u64))
                    })
                },
            );
        }
    }

    group.finish();
}

/// 画素単位カーネルの比較
fn benchmark_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("Pixel Kernels");
    let image = gray_image(1920, 1080);

    for (name, policy) in policies() {
        group.bench_function(BenchmarkId::new("negative", &name), |b| {
            b.iter(|| std::hint::black_box(negative(&image, policy)))
        });
        group.bench_function(BenchmarkId::new("sobel", &name), |b| {
            b.iter(|| std::hint::black_box(sobel(&image, policy).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_histogram, benchmark_kernels);
criterion_main!(benches);
