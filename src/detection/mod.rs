pub mod preprocessing;
pub mod contours;
pub mod candidates;
pub mod chains;
pub mod plate_region;
pub mod ocr;

use anyhow::Result;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, RgbImage};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::DetectionParams;
use crate::debug::DebugConfig;
use crate::models::{PlateCandidate, PlateReading};
use ocr::{CharacterClassifier, ClassifierError};
use preprocessing::{AdaptivePreprocessor, Preprocess};

/// Finds plates in a scene and reads them.
///
/// Scene-level and plate-level passes share the same candidate filter and
/// chain clustering; only the input image differs.
pub struct PlateDetector {
    pub params: DetectionParams,
    classifier: Arc<dyn CharacterClassifier>,
    preprocessor: Option<Arc<dyn Preprocess>>,
    debug: Option<DebugConfig>,
    parallel_plates: bool,
}

impl PlateDetector {
    /// A detector with default parameters and the adaptive preprocessor.
    pub fn new(classifier: Arc<dyn CharacterClassifier>) -> Self {
        Self {
            params: DetectionParams::default(),
            classifier,
            preprocessor: None,
            debug: None,
            parallel_plates: false,
        }
    }

    pub fn with_params(mut self, params: DetectionParams) -> Self {
        self.params = params;
        self
    }

    /// Replace the adaptive preprocessor built from `params.preprocess`.
    pub fn with_preprocessor(mut self, preprocessor: Arc<dyn Preprocess>) -> Self {
        self.preprocessor = Some(preprocessor);
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        self.debug = Some(DebugConfig::new(output_dir)?);
        Ok(self)
    }

    /// Read plates on scoped worker threads instead of one after another.
    pub fn with_parallel_plates(mut self, parallel: bool) -> Self {
        self.parallel_plates = parallel;
        self
    }

    /// Fails when the classifier was trained on samples of a different size
    /// than the one `params` crops characters to.
    pub fn check_classifier(&self) -> Result<(), ClassifierError> {
        let actual = self.params.sample_len();
        match self.classifier.expected_sample_len() {
            Some(expected) if expected != actual => {
                Err(ClassifierError::SampleLength { expected, actual })
            }
            _ => Ok(()),
        }
    }

    fn preprocess(&self, image: &RgbImage) -> (GrayImage, GrayImage) {
        match &self.preprocessor {
            Some(preprocessor) => preprocessor.preprocess(image),
            None => AdaptivePreprocessor::new(self.params.preprocess.clone()).preprocess(image),
        }
    }

    /// Convert to RGB and scale down so neither side exceeds
    /// `params.max_scene_dimension`.
    pub fn prepare_scene(&self, image: &DynamicImage) -> RgbImage {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        let limit = self.params.max_scene_dimension;
        if limit == 0 || (width <= limit && height <= limit) {
            return rgb;
        }

        let scale = limit as f64 / width.max(height) as f64;
        let scaled_w = ((width as f64 * scale).round() as u32).max(1);
        let scaled_h = ((height as f64 * scale).round() as u32).max(1);
        debug!("scaling scene {}x{} -> {}x{}", width, height, scaled_w, scaled_h);
        imageops::resize(&rgb, scaled_w, scaled_h, FilterType::Triangle)
    }

    /// Locate plate regions in a scene. Chains that give no usable region are
    /// skipped.
    pub fn detect_plates_in_scene(&self, scene: &RgbImage) -> Vec<PlateCandidate> {
        self.scene_pass(scene).1
    }

    fn scene_pass(&self, scene: &RgbImage) -> (GrayImage, Vec<PlateCandidate>) {
        let (_, thresh) = self.preprocess(scene);

        let candidates = candidates::find_possible_characters(&thresh, &self.params.characters);
        let chains = chains::find_chains(&candidates, &self.params.chains);
        debug!(
            "scene: {} possible characters, {} chains",
            candidates.len(),
            chains.len()
        );

        let mut plates = Vec::new();
        for chain in &chains {
            match plate_region::extract_plate(scene, chain, &self.params.plate) {
                Some(plate) if !plate.is_empty() => plates.push(plate),
                Some(_) => debug!("chain of {} gave an empty crop", chain.len()),
                None => warn!(
                    "chain of {} has coincident end centres, skipping",
                    chain.len()
                ),
            }
        }

        info!("{} possible plates in scene", plates.len());
        (thresh, plates)
    }

    /// Read the characters of every plate. Plates without a qualifying chain
    /// get an empty string.
    pub fn detect_characters_in_plates(
        &self,
        mut plates: Vec<PlateCandidate>,
    ) -> Vec<PlateCandidate> {
        if self.parallel_plates && plates.len() > 1 {
            std::thread::scope(|scope| {
                for plate in plates.iter_mut() {
                    scope.spawn(move || self.read_plate(plate));
                }
            });
        } else {
            for plate in plates.iter_mut() {
                self.read_plate(plate);
            }
        }
        plates
    }

    /// Run the plate-scale pass on one plate, filling its grayscale and
    /// threshold images and its characters.
    pub fn read_plate(&self, plate: &mut PlateCandidate) {
        let (gray, thresh) = self.preprocess(&plate.plate);
        let thresh = preprocessing::upscale(&thresh, self.params.plate_upscale);
        plate.grayscale = gray;
        plate.threshold = preprocessing::otsu_binarize(&thresh);

        let candidates =
            candidates::find_possible_characters(&plate.threshold, &self.params.characters);
        let chains = chains::find_chains(&candidates, &self.params.chains);

        let text = match chains::longest_chain(&chains) {
            Some(chain) => ocr::recognize_characters(
                &plate.threshold,
                chain,
                self.classifier.as_ref(),
                self.params.char_sample_width,
                self.params.char_sample_height,
            ),
            None => String::new(),
        };

        debug!(
            "plate at ({:.0}, {:.0}): {} possible characters, {} chains, read {:?}",
            plate.location.center_x,
            plate.location.center_y,
            candidates.len(),
            chains.len(),
            text
        );
        plate.set_chars(text);
    }

    /// Whole flow: prepare the scene, find plates, read them and pick the
    /// best. Debug images are written when enabled. A classifier that does
    /// not fit `params` is rejected before any image work.
    pub fn recognize(&self, image: &DynamicImage) -> Result<(Vec<PlateCandidate>, PlateReading)> {
        self.check_classifier()?;
        let scene = self.prepare_scene(image);
        let (scene_thresh, plates) = self.scene_pass(&scene);
        let plates = self.detect_characters_in_plates(plates);

        if let Some(debug) = &self.debug {
            debug.save_gray("00_scene_threshold", 1, &scene_thresh)?;
            for (i, plate) in plates.iter().enumerate() {
                debug.save_rgb("01_plates", i + 1, &plate.plate)?;
                debug.save_gray("02_plate_thresholds", i + 1, &plate.threshold)?;
            }
        }

        let reading = select_best_plate(&plates);
        Ok((plates, reading))
    }
}

/// Pick the plate with the most characters; ties go to the earliest plate.
/// Plates with no characters never win.
pub fn select_best_plate(plates: &[PlateCandidate]) -> PlateReading {
    if plates.is_empty() {
        return PlateReading::NoPlates;
    }

    let best = plates
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.chars().is_empty())
        .reduce(|best, current| {
            if current.1.chars().chars().count() > best.1.chars().chars().count() {
                current
            } else {
                best
            }
        });

    match best {
        Some((index, plate)) => PlateReading::Plate {
            text: plate.display_text(),
            index,
        },
        None => PlateReading::NoCharacters {
            plates: plates.len(),
        },
    }
}
