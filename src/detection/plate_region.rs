use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};

use crate::config::PlateGeometry;
use crate::detection::chains::{CharacterChain, distance_between};
use crate::models::{PlateCandidate, RotatedRect};

/// Oriented region covering a chain, padded around its outermost characters.
///
/// Returns `None` when the first and last characters share a centre, since
/// the correction angle is undefined then.
pub fn plate_geometry(chain: &CharacterChain<'_>, geometry: &PlateGeometry) -> Option<RotatedRect> {
    let sorted = chain.sorted_left_to_right();
    let (first, last) = (*sorted.first()?, *sorted.last()?);

    let hypotenuse = distance_between(first, last);
    if hypotenuse == 0.0 {
        return None;
    }
    let opposite = (last.center_y() - first.center_y()) as f64;
    let angle_deg = (opposite / hypotenuse).asin().to_degrees();

    let span = (last.rect().right() - first.rect().x).abs() as f64;
    let mean_height = sorted.iter().map(|c| c.height() as f64).sum::<f64>() / sorted.len() as f64;

    Some(RotatedRect {
        center_x: (first.center_x() + last.center_x()) as f64 / 2.0,
        center_y: (first.center_y() + last.center_y()) as f64 / 2.0,
        width: (span * geometry.width_padding).trunc(),
        height: (mean_height * geometry.height_padding).abs().trunc(),
        angle_deg,
    })
}

/// Cut the plate for `chain` out of the scene, rotated so that the characters
/// run horizontally. The crop may be empty; callers drop those.
pub fn extract_plate(
    scene: &RgbImage,
    chain: &CharacterChain<'_>,
    geometry: &PlateGeometry,
) -> Option<PlateCandidate> {
    let location = plate_geometry(chain, geometry)?;
    let plate = rotate_and_crop(scene, &location);
    Some(PlateCandidate::new(plate, location))
}

/// Sample the `rect.width` x `rect.height` window centred on the rect,
/// undoing its rotation. Pixels outside the scene are black.
pub fn rotate_and_crop(image: &RgbImage, rect: &RotatedRect) -> RgbImage {
    let width = rect.width.round().max(0.0) as u32;
    let height = rect.height.round().max(0.0) as u32;
    let mut out = RgbImage::new(width, height);
    if width == 0 || height == 0 || image.width() == 0 || image.height() == 0 {
        return out;
    }

    // scene -> crop: move the centre to the origin, undo the rotation, then
    // move it to the middle of the crop
    let projection = Projection::translate((width as f32 - 1.0) / 2.0, (height as f32 - 1.0) / 2.0)
        * Projection::rotate(-(rect.angle_deg as f32).to_radians())
        * Projection::translate(-rect.center_x as f32, -rect.center_y as f32);

    warp_into(image, &projection, Interpolation::Bilinear, Rgb([0, 0, 0]), &mut out);
    out
}
