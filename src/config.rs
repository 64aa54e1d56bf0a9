use serde::{Deserialize, Serialize};
use std::path::Path;

// Limits for a single contour to count as a possible character
pub const MIN_PIXEL_WIDTH: u32 = 2;
pub const MIN_PIXEL_HEIGHT: u32 = 8;
pub const MIN_ASPECT_RATIO: f64 = 0.25;
pub const MAX_ASPECT_RATIO: f64 = 1.0;
pub const MIN_PIXEL_AREA: u32 = 80;

// Limits for comparing two possible characters
pub const MAX_DIAG_SIZE_MULTIPLE_AWAY: f64 = 5.0;
pub const MAX_CHANGE_IN_AREA: f64 = 0.5;
pub const MAX_CHANGE_IN_WIDTH: f64 = 0.8;
pub const MAX_CHANGE_IN_HEIGHT: f64 = 0.2;
pub const MAX_ANGLE_BETWEEN_CHARS: f64 = 12.0;
pub const MIN_NUMBER_OF_MATCHING_CHARS: usize = 3;

// Plate region padding around the outermost characters
pub const PLATE_WIDTH_PADDING_FACTOR: f64 = 1.3;
pub const PLATE_HEIGHT_PADDING_FACTOR: f64 = 1.5;

/// Plate threshold images are enlarged by this factor before the
/// character pass.
pub const PLATE_UPSCALE_FACTOR: f64 = 1.6;

pub const RESIZED_CHAR_IMAGE_WIDTH: u32 = 20;
pub const RESIZED_CHAR_IMAGE_HEIGHT: u32 = 30;

// Preprocessing: 5x5 Gaussian smoothing, 19x19 adaptive threshold block
pub const GAUSSIAN_SMOOTH_FILTER_SIZE: u32 = 5;
pub const ADAPTIVE_THRESH_BLOCK_SIZE: u32 = 19;
pub const ADAPTIVE_THRESH_WEIGHT: i32 = 9;

/// Scenes larger than this on either side are scaled down before detection.
pub const MAX_SCENE_DIMENSION: u32 = 1024;

/// Geometric limits for a single possible character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterLimits {
    pub min_area: u32,
    pub min_width: u32,
    pub min_height: u32,
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
}

impl Default for CharacterLimits {
    fn default() -> Self {
        Self {
            min_area: MIN_PIXEL_AREA,
            min_width: MIN_PIXEL_WIDTH,
            min_height: MIN_PIXEL_HEIGHT,
            min_aspect_ratio: MIN_ASPECT_RATIO,
            max_aspect_ratio: MAX_ASPECT_RATIO,
        }
    }
}

/// Tolerances used when grouping characters into chains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainLimits {
    pub max_diag_multiple_away: f64,
    pub max_angle_deg: f64,
    pub max_change_in_area: f64,
    pub max_change_in_width: f64,
    pub max_change_in_height: f64,
    pub min_chain_len: usize,
}

impl Default for ChainLimits {
    fn default() -> Self {
        Self {
            max_diag_multiple_away: MAX_DIAG_SIZE_MULTIPLE_AWAY,
            max_angle_deg: MAX_ANGLE_BETWEEN_CHARS,
            max_change_in_area: MAX_CHANGE_IN_AREA,
            max_change_in_width: MAX_CHANGE_IN_WIDTH,
            max_change_in_height: MAX_CHANGE_IN_HEIGHT,
            min_chain_len: MIN_NUMBER_OF_MATCHING_CHARS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateGeometry {
    pub width_padding: f64,
    pub height_padding: f64,
}

impl Default for PlateGeometry {
    fn default() -> Self {
        Self {
            width_padding: PLATE_WIDTH_PADDING_FACTOR,
            height_padding: PLATE_HEIGHT_PADDING_FACTOR,
        }
    }
}

/// Parameters of the adaptive preprocessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessParams {
    /// Side of the Gaussian smoothing kernel (odd).
    pub blur_kernel: u32,
    /// Side of the adaptive threshold neighbourhood (odd).
    pub block_size: u32,
    /// Constant subtracted from the weighted local mean.
    pub weight: i32,
}

impl Default for PreprocessParams {
    fn default() -> Self {
        Self {
            blur_kernel: GAUSSIAN_SMOOTH_FILTER_SIZE,
            block_size: ADAPTIVE_THRESH_BLOCK_SIZE,
            weight: ADAPTIVE_THRESH_WEIGHT,
        }
    }
}

/// Every tunable of the detector. The same character and chain limits are
/// used at scene scale and at plate scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    pub characters: CharacterLimits,
    pub chains: ChainLimits,
    pub plate: PlateGeometry,
    pub preprocess: PreprocessParams,
    pub plate_upscale: f64,
    pub char_sample_width: u32,
    pub char_sample_height: u32,
    pub max_scene_dimension: u32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            characters: CharacterLimits::default(),
            chains: ChainLimits::default(),
            plate: PlateGeometry::default(),
            preprocess: PreprocessParams::default(),
            plate_upscale: PLATE_UPSCALE_FACTOR,
            char_sample_width: RESIZED_CHAR_IMAGE_WIDTH,
            char_sample_height: RESIZED_CHAR_IMAGE_HEIGHT,
            max_scene_dimension: MAX_SCENE_DIMENSION,
        }
    }
}

impl DetectionParams {
    /// Load parameters from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read params {}: {}", path.display(), e))?;
        Self::from_json_str(&text)
            .map_err(|e| anyhow::anyhow!("Invalid params {}: {}", path.display(), e))
    }

    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Length of the flattened feature vector fed to the classifier.
    pub fn sample_len(&self) -> usize {
        (self.char_sample_width * self.char_sample_height) as usize
    }
}
