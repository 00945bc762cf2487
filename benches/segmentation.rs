// benches/segmentation.rs
//
// HSVセグメンテーションのホットパス計測。
// 合成フレームに対する segment / composite のスループットをサイズ別に測る。

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use IroScope::domain::config::ColorTargetConfig;
use IroScope::domain::types::{ColorTarget, Frame};
use IroScope::infrastructure::color_segment::{composite, segment};

const SIZES: [(u32, u32); 3] = [(320, 240), (640, 480), (1280, 720)];

fn gradient_frame(width: u32, height: u32) -> Frame {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            data.push((x % 256) as u8);
            data.push((y % 256) as u8);
            data.push(((x + y) % 256) as u8);
        }
    }
    Frame::new(data, width, height)
}

fn bench_segment(c: &mut Criterion) {
    let blue: ColorTarget = (&ColorTargetConfig::preset_blue()).into();
    let red: ColorTarget = (&ColorTargetConfig::preset_red()).into();

    let mut group = c.benchmark_group("Segment");
    for &(width, height) in SIZES.iter() {
        let frame = gradient_frame(width, height);
        let size_str = format!("{}x{}", width, height);

        group.bench_with_input(BenchmarkId::new("blue", &size_str), &size_str, |b, _| {
            b.iter(|| segment(black_box(&frame), black_box(&blue.range)).unwrap())
        });

        // 循環レンジは2回のin_rangeとORが走る
        group.bench_with_input(
            BenchmarkId::new("red_wraparound", &size_str),
            &size_str,
            |b, _| b.iter(|| segment(black_box(&frame), black_box(&red.range)).unwrap()),
        );
    }
    group.finish();
}

fn bench_composite(c: &mut Criterion) {
    let blue: ColorTarget = (&ColorTargetConfig::preset_blue()).into();

    let mut group = c.benchmark_group("Composite");
    for &(width, height) in SIZES.iter() {
        let frame = gradient_frame(width, height);
        let mask = segment(&frame, &blue.range).unwrap();
        let size_str = format!("{}x{}", width, height);

        group.bench_with_input(BenchmarkId::new("masked", &size_str), &size_str, |b, _| {
            b.iter(|| composite(black_box(&frame), black_box(&mask)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_segment, bench_composite);
criterion_main!(benches);
