use image::{GrayImage, RgbImage};
use imageproc::point::Point;

/// Axis-aligned bounding box, inclusive of both edge pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingRect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Smallest box containing every point, or `None` for an empty slice.
    pub fn enclosing(points: &[Point<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);

        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Some(Self {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }

    pub fn area(&self) -> u32 {
        self.width * self.height
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }
}

/// A traced contour considered as a possible character.
///
/// Geometry is derived once in the constructor and never changes afterwards,
/// so every accessor is a plain read.
#[derive(Debug, Clone)]
pub struct CharacterCandidate {
    contour: Vec<Point<i32>>,
    rect: BoundingRect,
    center_x: i32,
    center_y: i32,
    diagonal: f64,
    aspect_ratio: f64,
}

impl CharacterCandidate {
    /// Build a candidate from a traced contour. Returns `None` for an empty
    /// point list.
    pub fn from_contour(contour: Vec<Point<i32>>) -> Option<Self> {
        let rect = BoundingRect::enclosing(&contour)?;
        Some(Self::with_rect(contour, rect))
    }

    /// Build a candidate straight from a bounding box; the contour is the
    /// box outline corners.
    pub fn from_rect(rect: BoundingRect) -> Self {
        let right = rect.x + rect.width as i32 - 1;
        let bottom = rect.y + rect.height as i32 - 1;
        let contour = vec![
            Point::new(rect.x, rect.y),
            Point::new(right, rect.y),
            Point::new(right, bottom),
            Point::new(rect.x, bottom),
        ];
        Self::with_rect(contour, rect)
    }

    fn with_rect(contour: Vec<Point<i32>>, rect: BoundingRect) -> Self {
        let w = rect.width as f64;
        let h = rect.height as f64;
        Self {
            contour,
            rect,
            center_x: (rect.x + rect.x + rect.width as i32) / 2,
            center_y: (rect.y + rect.y + rect.height as i32) / 2,
            diagonal: (w * w + h * h).sqrt(),
            aspect_ratio: if h == 0.0 { 0.0 } else { w / h },
        }
    }

    pub fn contour(&self) -> &[Point<i32>] {
        &self.contour
    }

    pub fn rect(&self) -> BoundingRect {
        self.rect
    }

    pub fn width(&self) -> u32 {
        self.rect.width
    }

    pub fn height(&self) -> u32 {
        self.rect.height
    }

    pub fn area(&self) -> u32 {
        self.rect.area()
    }

    pub fn center(&self) -> (i32, i32) {
        (self.center_x, self.center_y)
    }

    pub fn center_x(&self) -> i32 {
        self.center_x
    }

    pub fn center_y(&self) -> i32 {
        self.center_y
    }

    /// Length of the bounding-box diagonal, the scale unit for distances.
    pub fn diagonal(&self) -> f64 {
        self.diagonal
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }
}

/// Oriented rectangle locating a plate in the scene. The angle is in degrees;
/// positive values mean the characters descend from left to right in image
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotatedRect {
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
    pub angle_deg: f64,
}

/// A detected plate region together with its derived images and reading.
#[derive(Debug, Clone)]
pub struct PlateCandidate {
    /// Deskewed crop of the scene.
    pub plate: RgbImage,
    /// Contrast-maximised single-channel version of `plate`.
    pub grayscale: GrayImage,
    /// Binarised, upscaled image the characters are read from.
    pub threshold: GrayImage,
    pub location: RotatedRect,
    chars: String,
}

impl PlateCandidate {
    pub fn new(plate: RgbImage, location: RotatedRect) -> Self {
        Self {
            plate,
            grayscale: GrayImage::new(0, 0),
            threshold: GrayImage::new(0, 0),
            location,
            chars: String::new(),
        }
    }

    /// True when the crop has no pixels and cannot be a plate.
    pub fn is_empty(&self) -> bool {
        self.plate.width() == 0 || self.plate.height() == 0
    }

    /// Characters in recognition order (right to left).
    pub fn chars(&self) -> &str {
        &self.chars
    }

    pub fn set_chars(&mut self, chars: impl Into<String>) {
        self.chars = chars.into();
    }

    /// Characters as they read on the plate, left to right.
    pub fn display_text(&self) -> String {
        self.chars.chars().rev().collect()
    }
}

/// Final outcome of reading a scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlateReading {
    /// No plate region survived scene-level detection.
    NoPlates,
    /// Plates were found but none yielded any characters.
    NoCharacters { plates: usize },
    /// The best plate, `index` into the detected plate list.
    Plate { text: String, index: usize },
}

impl PlateReading {
    pub fn text(&self) -> Option<&str> {
        match self {
            PlateReading::Plate { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }
}
