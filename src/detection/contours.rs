use image::GrayImage;
use imageproc::contours::find_contours;
use imageproc::point::Point;

use crate::models::CharacterCandidate;

/// Trace the borders of every foreground region (outer borders and holes)
/// in a binary image, in raster order of their starting pixel.
pub fn trace_contours(binary: &GrayImage) -> Vec<Vec<Point<i32>>> {
    if binary.width() == 0 || binary.height() == 0 {
        return Vec::new();
    }

    find_contours::<i32>(binary)
        .into_iter()
        .map(|contour| contour.points)
        .filter(|points| !points.is_empty())
        .collect()
}

/// Every traced contour as an unfiltered candidate.
pub fn find_candidates(binary: &GrayImage) -> Vec<CharacterCandidate> {
    trace_contours(binary)
        .into_iter()
        .filter_map(CharacterCandidate::from_contour)
        .collect()
}
