use criterion::{criterion_group, criterion_main, Criterion};
use dogsift::{build_descriptors, Detector, GaussianPyramid, GrayImage, PyramidConfig, SiftConfig};
use std::hint::black_box;

fn make_image(width: usize, height: usize) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let value = ((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF;
        value as f32 / 255.0
    })
}

fn bench_detector(c: &mut Criterion) {
    let image = make_image(320, 240);

    let cfg = PyramidConfig::default();
    c.bench_function("gaussian_pyramid_4x3", |b| {
        b.iter(|| black_box(GaussianPyramid::build(&image, &cfg).unwrap()));
    });

    let detector = Detector::new(SiftConfig::default());
    c.bench_function("detect_default", |b| {
        b.iter(|| black_box(detector.detect_image(&image).unwrap()));
    });

    let detection = detector.detect_image(&image).unwrap();
    c.bench_function("build_descriptors", |b| {
        b.iter(|| black_box(build_descriptors(&detection.patches)));
    });

    if cfg!(feature = "rayon") {
        let detector_par = Detector::new(SiftConfig {
            parallel: true,
            ..SiftConfig::default()
        });
        c.bench_function("detect_default_parallel", |b| {
            b.iter(|| black_box(detector_par.detect_image(&image).unwrap()));
        });
    }
}

criterion_group!(benches, bench_detector);
criterion_main!(benches);
