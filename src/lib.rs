pub mod config;
pub mod debug;
pub mod detection;
pub mod models;

pub use config::DetectionParams;
pub use detection::{PlateDetector, select_best_plate};
pub use detection::ocr::{CharacterClassifier, ClassifierError, KNearest};
pub use models::{BoundingRect, CharacterCandidate, PlateCandidate, PlateReading, RotatedRect};
