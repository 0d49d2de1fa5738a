use dogsift::{
    build_descriptors, descriptor_len, detect, Detector, GrayImage, ImageView, SiftConfig,
};

/// Single radially symmetric Gaussian blob on a flat background.
fn blob_image(width: usize, height: usize, cx: f32, cy: f32, sigma: f32) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let r2 = (dx * dx + dy * dy) / (2.0 * sigma * sigma);
            data.push(0.1 + 0.8 * (-r2).exp());
        }
    }
    data
}

#[test]
fn single_blob_yields_one_oriented_keypoint() {
    let (width, height) = (48, 48);
    let data = blob_image(width, height, 24.0, 24.0, 2.5);
    let view = ImageView::from_slice(&data, width, height).unwrap();

    let detection = detect(view, 1, 3).unwrap();
    assert_eq!(detection.keypoints.len(), 1, "{:?}", detection.keypoints);

    let kp = detection.keypoints[0];
    assert!((kp.x as i64 - 24).abs() <= 1);
    assert!((kp.y as i64 - 24).abs() <= 1);
    assert_eq!(kp.octave, 0);
    assert!((1..=3).contains(&kp.interval));
    assert!(kp.response > 0.0);

    let angle = kp.orientation.expect("centered blob has a full window");
    assert!((0.0..360.0).contains(&angle));

    assert_eq!(detection.patches.len(), 1);
    assert_eq!(detection.patches[0].keypoint_index(), 0);
    assert_eq!(detection.stats.accepted(), 1);
    assert_eq!(detection.stats.without_patch, 0);
}

#[test]
fn off_center_blob_is_found_where_it_is() {
    let (width, height) = (41, 37);
    let data = blob_image(width, height, 21.0, 18.0, 2.5);
    let view = ImageView::from_slice(&data, width, height).unwrap();

    let detection = detect(view, 1, 3).unwrap();
    assert_eq!(detection.keypoints.len(), 1);
    let kp = detection.keypoints[0];
    assert!((kp.x as i64 - 21).abs() <= 1);
    assert!((kp.y as i64 - 18).abs() <= 1);
}

#[test]
fn blob_near_edge_keeps_keypoint_without_patch() {
    // Far enough from the edge for the extremum scan (border 5) but inside
    // the orientation half window (8).
    let (width, height) = (48, 48);
    let data = blob_image(width, height, 7.0, 24.0, 2.5);
    let view = ImageView::from_slice(&data, width, height).unwrap();

    let detection = detect(view, 1, 3).unwrap();
    let near_edge: Vec<_> = detection
        .keypoints
        .iter()
        .enumerate()
        .filter(|(_, kp)| kp.x < 9)
        .collect();
    assert!(!near_edge.is_empty(), "{:?}", detection.keypoints);
    for (idx, kp) in near_edge {
        assert!(kp.orientation.is_none());
        assert!(detection.patches.iter().all(|p| p.keypoint_index() != idx));
    }
    assert_eq!(
        detection.stats.without_patch,
        detection.keypoints.len() - detection.patches.len()
    );
}

#[test]
fn zero_image_detects_nothing() {
    let data = vec![0.0f32; 64 * 64];
    let view = ImageView::from_slice(&data, 64, 64).unwrap();
    let detection = detect(view, 3, 3).unwrap();
    assert!(detection.keypoints.is_empty());
    assert_eq!(detection.stats.extrema, 0);
}

#[test]
fn descriptors_align_with_patches() {
    let (width, height) = (96, 80);
    let mut data = vec![0.1f32; width * height];
    for (cx, cy) in [(24.0f32, 24.0f32), (70.0, 30.0), (40.0, 56.0)] {
        for y in 0..height {
            for x in 0..width {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                data[y * width + x] += 0.6 * (-(dx * dx + dy * dy) / 12.5).exp();
            }
        }
    }
    let image = GrayImage::new(data, width, height).unwrap();
    let detector = Detector::new(SiftConfig::with_scales(2, 3));
    let detection = detector.detect_image(&image).unwrap();
    assert!(!detection.patches.is_empty());

    let descriptors = build_descriptors(&detection.patches);
    assert_eq!(descriptors.len(), detection.patches.len());
    let expected_len = descriptor_len(detector.config().orientation.patch_side());
    for (desc, patch) in descriptors.iter().zip(&detection.patches) {
        assert_eq!(desc.len(), expected_len);
        assert_eq!(desc.keypoint_index(), patch.keypoint_index());
        let kp = detection.keypoints[desc.keypoint_index()];
        assert!(kp.orientation.is_some());
        let total: f64 = desc.values().iter().sum();
        assert_eq!(total, (patch.side() * patch.side()) as f64);
    }

    // Descriptors are a pure function of the stored patches.
    let again = detector.build_descriptors(&detection.patches);
    assert_eq!(descriptors, again);
    assert_eq!(detection.described().count(), detection.patches.len());
}

#[test]
fn strided_views_match_contiguous_input() {
    let (width, height, stride) = (40, 40, 45);
    let data = blob_image(width, height, 20.0, 20.0, 2.5);
    let mut padded = vec![0.0f32; stride * height];
    for y in 0..height {
        padded[y * stride..y * stride + width].copy_from_slice(&data[y * width..(y + 1) * width]);
    }
    let contiguous = detect(ImageView::from_slice(&data, width, height).unwrap(), 1, 3).unwrap();
    let strided = detect(ImageView::new(&padded, width, height, stride).unwrap(), 1, 3).unwrap();
    assert_eq!(contiguous.keypoints, strided.keypoints);
}
