use image::GrayImage;

use crate::config::CharacterLimits;
use crate::detection::contours;
use crate::models::CharacterCandidate;

/// Rough check on a contour to see if it could be a character. All bounds
/// are strict.
pub fn is_plausible_character(candidate: &CharacterCandidate, limits: &CharacterLimits) -> bool {
    let aspect = candidate.aspect_ratio();
    candidate.area() > limits.min_area
        && candidate.width() > limits.min_width
        && candidate.height() > limits.min_height
        && aspect > limits.min_aspect_ratio
        && aspect < limits.max_aspect_ratio
}

/// Keep only plausible characters, preserving input order.
pub fn filter_characters(
    candidates: Vec<CharacterCandidate>,
    limits: &CharacterLimits,
) -> Vec<CharacterCandidate> {
    candidates
        .into_iter()
        .filter(|c| is_plausible_character(c, limits))
        .collect()
}

/// Trace a binary image and keep the contours that could be characters.
pub fn find_possible_characters(
    binary: &GrayImage,
    limits: &CharacterLimits,
) -> Vec<CharacterCandidate> {
    filter_characters(contours::find_candidates(binary), limits)
}
