mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from platescan for tests
pub use platescan::{
    BoundingRect, CharacterCandidate, CharacterClassifier, DetectionParams, PlateCandidate,
    PlateDetector, PlateReading, RotatedRect,
};
