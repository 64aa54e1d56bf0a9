#![allow(dead_code)]

use image::{Rgb, RgbImage};
use platescan::detection::preprocessing::FixedThresholdPreprocessor;
use platescan::{BoundingRect, CharacterCandidate, CharacterClassifier, PlateDetector};
use std::sync::Arc;

pub const SCENE_WIDTH: u32 = 400;
pub const SCENE_HEIGHT: u32 = 200;

/// Half extents of a rendered blob: 13x41 pixels when upright.
pub const BLOB_HALF_WIDTH: f64 = 6.0;
pub const BLOB_HALF_HEIGHT: f64 = 20.0;

/// Integer steps between neighbouring blob centres, roughly 0, 10 and 20
/// degrees. Integer steps keep every blob's rasterisation identical.
pub const STEP_0_DEG: (i32, i32) = (40, 0);
pub const STEP_10_DEG: (i32, i32) = (57, 10);
pub const STEP_20_DEG: (i32, i32) = (47, 17);

/// White scene with `count` black blobs whose centres advance by `step`
/// around the scene centre. Each blob is rotated to follow the line.
pub fn blob_scene(step: (i32, i32), count: usize) -> RgbImage {
    let (dx, dy) = step;
    let theta = (dy as f64).atan2(dx as f64);
    let (sin, cos) = theta.sin_cos();
    let mid = (count as i32 - 1) / 2;
    let centers: Vec<(f64, f64)> = (0..count as i32)
        .map(|i| {
            (
                (SCENE_WIDTH as i32 / 2 + (i - mid) * dx) as f64,
                (SCENE_HEIGHT as i32 / 2 + (i - mid) * dy) as f64,
            )
        })
        .collect();

    RgbImage::from_fn(SCENE_WIDTH, SCENE_HEIGHT, |x, y| {
        let inside = centers.iter().any(|&(cx, cy)| {
            let (px, py) = (x as f64 - cx, y as f64 - cy);
            let along = px * cos + py * sin;
            let across = -px * sin + py * cos;
            along.abs() <= BLOB_HALF_WIDTH && across.abs() <= BLOB_HALF_HEIGHT
        });
        if inside { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
    })
}

/// Candidate with the given bounding box.
pub fn rect_candidate(x: i32, y: i32, width: u32, height: u32) -> CharacterCandidate {
    CharacterCandidate::from_rect(BoundingRect::new(x, y, width, height))
}

/// Candidate of the given size whose centre is at (`center_x`, `center_y`).
pub fn centered_candidate(
    center_x: i32,
    center_y: i32,
    width: u32,
    height: u32,
) -> CharacterCandidate {
    let x = center_x - width as i32 / 2;
    let y = center_y - height as i32 / 2;
    rect_candidate(x, y, width, height)
}

/// Returns the same character for every sample.
pub struct ConstantClassifier(pub char);

impl CharacterClassifier for ConstantClassifier {
    fn classify(&self, _sample: &[f32]) -> u32 {
        self.0 as u32
    }
}

/// Labels a sample by its mean intensity: 100 -> 'A', 150 -> 'B', 200 -> 'C'.
pub struct MeanClassifier;

impl CharacterClassifier for MeanClassifier {
    fn classify(&self, sample: &[f32]) -> u32 {
        let mean = sample.iter().sum::<f32>() / sample.len() as f32;
        let step = ((mean - 100.0) / 50.0).round().max(0.0) as u32;
        'A' as u32 + step
    }
}

/// Detector reading every character as `ch`, with the global threshold
/// preprocessor suited to the synthetic scenes.
pub fn synthetic_detector(ch: char) -> PlateDetector {
    PlateDetector::new(Arc::new(ConstantClassifier(ch)))
        .with_preprocessor(Arc::new(FixedThresholdPreprocessor::default()))
}
