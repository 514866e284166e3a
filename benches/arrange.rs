// SPDX-License-Identifier: MPL-2.0
use collage_lens::application::scene::Scene;
use collage_lens::domain::collage::{FrameStyle, ItemKind, WorkspaceArea};
use collage_lens::domain::media::RawImage;
use collage_lens::media::compose;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

fn scene_with(count: usize) -> Scene {
    let mut scene = Scene::new();
    for i in 0..count {
        // Alternate landscape and portrait sources.
        let (w, h) = if i % 2 == 0 { (400, 300) } else { (300, 400) };
        let kind = if i % 3 == 0 {
            ItemKind::Object
        } else {
            ItemKind::Photo {
                frame: FrameStyle::default(),
            }
        };
        scene.add(RawImage::filled(w, h, [120, 80, 40, 255]), kind, 0.1);
    }
    scene
}

fn arrange_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("arrange");
    let area = WorkspaceArea::new(1152.0, 719.0);

    for count in [4, 25, 100] {
        let mut scene = scene_with(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| scene.arrange(black_box(area)));
        });
    }

    group.finish();
}

fn render_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let area = WorkspaceArea::new(1152.0, 719.0);
    let mut scene = scene_with(9);
    scene.arrange(area);

    group.bench_function("nine_items_at_1x", |b| {
        b.iter(|| {
            let _ = black_box(compose::render(
                scene.items(),
                area,
                collage_lens::domain::collage::Color::SLATE,
                1.0,
            ));
        });
    });

    group.finish();
}

criterion_group!(benches, arrange_benchmark, render_benchmark);
criterion_main!(benches);
