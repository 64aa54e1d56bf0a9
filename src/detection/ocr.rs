use image::imageops::{self, FilterType};
use image::GrayImage;
use std::path::{Path, PathBuf};

use crate::detection::chains::CharacterChain;
use crate::models::BoundingRect;

/// Maps one flattened character sample to a label, read as a Unicode code
/// point.
pub trait CharacterClassifier: Send + Sync {
    fn classify(&self, sample: &[f32]) -> u32;

    /// Number of values every sample must have, when the classifier is tied
    /// to one.
    fn expected_sample_len(&self) -> Option<usize> {
        None
    }
}

/// Problems with classifier training data. These are reported when the
/// classifier is built, before any image is processed.
#[derive(thiserror::Error, Debug)]
pub enum ClassifierError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{source_name}:{line}: invalid value {value:?}")]
    Parse {
        source_name: String,
        line: usize,
        value: String,
    },
    #[error("{values} sample values do not fit {labels} labels of length {sample_len}")]
    ShapeMismatch {
        values: usize,
        labels: usize,
        sample_len: usize,
    },
    #[error("classifier expects samples of {expected} values, detector produces {actual}")]
    SampleLength { expected: usize, actual: usize },
    #[error("training set is empty")]
    Empty,
    #[error("k must be at least 1")]
    InvalidK,
}

/// Brute-force k-nearest-neighbour classifier over flattened samples,
/// Euclidean distance.
#[derive(Debug, Clone)]
pub struct KNearest {
    samples: Vec<f32>,
    labels: Vec<u32>,
    sample_len: usize,
    k: usize,
}

impl KNearest {
    /// `samples` holds one row of `sample_len` values per label. `k` starts at 1.
    pub fn train(
        samples: Vec<f32>,
        labels: Vec<u32>,
        sample_len: usize,
    ) -> Result<Self, ClassifierError> {
        if labels.is_empty() || sample_len == 0 {
            return Err(ClassifierError::Empty);
        }
        if samples.len() != labels.len() * sample_len {
            return Err(ClassifierError::ShapeMismatch {
                values: samples.len(),
                labels: labels.len(),
                sample_len,
            });
        }

        Ok(Self {
            samples,
            labels,
            sample_len,
            k: 1,
        })
    }

    pub fn with_k(mut self, k: usize) -> Result<Self, ClassifierError> {
        if k == 0 {
            return Err(ClassifierError::InvalidK);
        }
        self.k = k;
        Ok(self)
    }

    /// Load a classifications file (one label per line) and a samples file
    /// (whitespace-separated values, `sample_len` per label).
    pub fn from_files(
        classifications: impl AsRef<Path>,
        samples: impl AsRef<Path>,
        sample_len: usize,
    ) -> Result<Self, ClassifierError> {
        let classifications = classifications.as_ref();
        let samples = samples.as_ref();

        let labels =
            parse_classifications(&read(classifications)?, &classifications.display().to_string())?;
        let values = parse_samples(&read(samples)?, &samples.display().to_string())?;

        log::info!(
            "loaded {} training samples from {}",
            labels.len(),
            samples.display()
        );
        Self::train(values, labels, sample_len)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn sample_len(&self) -> usize {
        self.sample_len
    }

    pub fn k(&self) -> usize {
        self.k
    }

    fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.samples.chunks_exact(self.sample_len)
    }
}

impl CharacterClassifier for KNearest {
    fn classify(&self, sample: &[f32]) -> u32 {
        debug_assert_eq!(sample.len(), self.sample_len, "sample length");
        let mut nearest: Vec<(f32, usize)> = self
            .rows()
            .enumerate()
            .map(|(i, row)| (squared_distance(row, sample), i))
            .collect();
        nearest.sort_by(|a, b| a.0.total_cmp(&b.0));
        nearest.truncate(self.k);

        // majority vote, ties to the label seen first in distance order
        let mut best = self.labels[nearest[0].1];
        let mut best_votes = 0;
        for &(_, i) in &nearest {
            let label = self.labels[i];
            let votes = nearest.iter().filter(|&&(_, j)| self.labels[j] == label).count();
            if votes > best_votes {
                best = label;
                best_votes = votes;
            }
        }
        best
    }

    fn expected_sample_len(&self) -> Option<usize> {
        Some(self.sample_len)
    }
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn read(path: &Path) -> Result<String, ClassifierError> {
    std::fs::read_to_string(path).map_err(|source| ClassifierError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// One non-negative integral label per non-blank line. Values written as
/// floats (`65.0`) are accepted.
pub fn parse_classifications(text: &str, source_name: &str) -> Result<Vec<u32>, ClassifierError> {
    let mut labels = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let label = line
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0 && *v <= u32::MAX as f64)
            .ok_or_else(|| ClassifierError::Parse {
                source_name: source_name.to_string(),
                line: line_no + 1,
                value: line.to_string(),
            })?;
        labels.push(label as u32);
    }
    Ok(labels)
}

/// Every whitespace-separated value in the file, row boundaries ignored.
pub fn parse_samples(text: &str, source_name: &str) -> Result<Vec<f32>, ClassifierError> {
    let mut values = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        for token in line.split_whitespace() {
            let value = token.parse::<f32>().map_err(|_| ClassifierError::Parse {
                source_name: source_name.to_string(),
                line: line_no + 1,
                value: token.to_string(),
            })?;
            values.push(value);
        }
    }
    Ok(values)
}

/// Crop `rect` out of the threshold image, resize it to the canonical sample
/// size and flatten it row by row.
pub fn character_sample(
    threshold: &GrayImage,
    rect: BoundingRect,
    width: u32,
    height: u32,
) -> Vec<f32> {
    let x0 = rect.x.max(0) as u32;
    let y0 = rect.y.max(0) as u32;
    let x1 = (rect.right().max(0) as u32).min(threshold.width());
    let y1 = ((rect.y + rect.height as i32).max(0) as u32).min(threshold.height());

    let resized = if x1 > x0 && y1 > y0 {
        let roi = imageops::crop_imm(threshold, x0, y0, x1 - x0, y1 - y0).to_image();
        imageops::resize(&roi, width, height, FilterType::Triangle)
    } else {
        GrayImage::new(width, height)
    };

    resized.pixels().map(|p| p[0] as f32).collect()
}

/// Read a chain of characters from a plate threshold image.
///
/// Characters are visited right to left; every one contributes exactly one
/// character, with no confidence cut-off.
pub fn recognize_characters(
    threshold: &GrayImage,
    chain: &CharacterChain<'_>,
    classifier: &dyn CharacterClassifier,
    sample_width: u32,
    sample_height: u32,
) -> String {
    chain
        .sorted_right_to_left()
        .into_iter()
        .map(|c| {
            let sample = character_sample(threshold, c.rect(), sample_width, sample_height);
            let label = classifier.classify(&sample);
            char::from_u32(label).unwrap_or(char::REPLACEMENT_CHARACTER)
        })
        .collect()
}
