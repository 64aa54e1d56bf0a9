use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbImage};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{Mask, grayscale_close, grayscale_open};

use crate::config::PreprocessParams;

/// Turns a colour image into a grayscale image and an inverted binary map of
/// the same size, where likely character pixels are 255.
pub trait Preprocess: Send + Sync {
    fn preprocess(&self, image: &RgbImage) -> (GrayImage, GrayImage);
}

/// Value channel, top-hat/black-hat contrast boost, Gaussian smoothing and an
/// inverted Gaussian-weighted adaptive threshold.
#[derive(Debug, Clone, Default)]
pub struct AdaptivePreprocessor {
    pub params: PreprocessParams,
}

impl AdaptivePreprocessor {
    pub fn new(params: PreprocessParams) -> Self {
        Self { params }
    }
}

impl Preprocess for AdaptivePreprocessor {
    fn preprocess(&self, image: &RgbImage) -> (GrayImage, GrayImage) {
        let value = extract_value(image);
        let contrasted = maximize_contrast(&value);
        let blurred = apply_blur(&contrasted, self.params.blur_kernel);
        let thresh = adaptive_threshold_inv(&blurred, self.params.block_size, self.params.weight);
        (contrasted, thresh)
    }
}

/// Value channel with a single global inverted threshold. Suited to clean
/// inputs with dark glyphs on a light background.
#[derive(Debug, Clone)]
pub struct FixedThresholdPreprocessor {
    /// Pixels at or below this level become foreground.
    pub level: u8,
}

impl Default for FixedThresholdPreprocessor {
    fn default() -> Self {
        Self { level: 127 }
    }
}

impl Preprocess for FixedThresholdPreprocessor {
    fn preprocess(&self, image: &RgbImage) -> (GrayImage, GrayImage) {
        let value = extract_value(image);
        let thresh = threshold(&value, self.level, ThresholdType::BinaryInverted);
        (value, thresh)
    }
}

/// HSV value channel: the brightest of the three colour channels.
pub fn extract_value(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        Luma([r.max(g).max(b)])
    })
}

/// Adds the top-hat and subtracts the black-hat (3x3 square element) so
/// that small bright and dark details stand out.
pub fn maximize_contrast(gray: &GrayImage) -> GrayImage {
    let element = Mask::square(1);
    let opened = grayscale_open(gray, &element);
    let closed = grayscale_close(gray, &element);

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y)[0];
        let top_hat = v.saturating_sub(opened.get_pixel(x, y)[0]);
        let black_hat = closed.get_pixel(x, y)[0].saturating_sub(v);
        Luma([v.saturating_add(top_hat).saturating_sub(black_hat)])
    })
}

/// Gaussian blur for a square kernel of side `kernel`.
pub fn apply_blur(gray: &GrayImage, kernel: u32) -> GrayImage {
    if gray.width() == 0 || gray.height() == 0 {
        return gray.clone();
    }
    gaussian_blur_f32(gray, sigma_for_kernel(kernel))
}

/// Inverted adaptive threshold: a pixel becomes 255 when it is at least
/// `weight` darker than the Gaussian-weighted mean of its `block_size`
/// neighbourhood.
pub fn adaptive_threshold_inv(gray: &GrayImage, block_size: u32, weight: i32) -> GrayImage {
    if gray.width() == 0 || gray.height() == 0 {
        return gray.clone();
    }
    let local_mean = gaussian_blur_f32(gray, sigma_for_kernel(block_size));

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y)[0] as i32;
        let t = local_mean.get_pixel(x, y)[0] as i32 - weight;
        if v > t { Luma([0u8]) } else { Luma([255u8]) }
    })
}

/// Global Otsu binarisation; pixels above the level become 255.
pub fn otsu_binarize(gray: &GrayImage) -> GrayImage {
    if gray.width() == 0 || gray.height() == 0 {
        return gray.clone();
    }
    threshold(gray, otsu_level(gray), ThresholdType::Binary)
}

/// Scale both sides by `factor` with bilinear interpolation.
pub fn upscale(gray: &GrayImage, factor: f64) -> GrayImage {
    let (width, height) = gray.dimensions();
    let scaled_w = (width as f64 * factor).round() as u32;
    let scaled_h = (height as f64 * factor).round() as u32;
    if scaled_w == 0 || scaled_h == 0 {
        return gray.clone();
    }
    imageops::resize(gray, scaled_w, scaled_h, FilterType::Triangle)
}

/// Standard deviation matching a Gaussian kernel of the given side, using the
/// usual `0.3 * ((k - 1) / 2 - 1) + 0.8` rule.
fn sigma_for_kernel(kernel: u32) -> f32 {
    let k = kernel.max(1) as f32;
    0.3 * ((k - 1.0) * 0.5 - 1.0) + 0.8
}
