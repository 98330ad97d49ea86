use std::fmt;

/// Labels whose boxes get a license-plate blur.
pub const VEHICLE_LABELS: [&str; 4] = ["car", "truck", "bus", "train"];

/// Label whose boxes get a face (or whole-person) blur.
pub const PERSON_LABEL: &str = "person";

/// Axis-aligned box in absolute pixel coordinates.
///
/// `right` and `bottom` are exclusive, like slice bounds. Values are not
/// validated against the image; see [`crate::pipeline::geometry::clamp_to_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BBox {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// One object reported by the detector.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
    pub bbox: BBox,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32, bbox: BBox) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox,
        }
    }
}

/// Face rectangle relative to the person region it was found in.
///
/// Rows span `top..bottom`, columns span `left..right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceRect {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl FaceRect {
    pub fn as_bbox(&self) -> BBox {
        BBox::new(self.left, self.top, self.right, self.bottom)
    }
}

/// What the dispatcher does with a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlurAction {
    Person,
    Plate,
    Ignore,
}

impl BlurAction {
    pub fn for_label(label: &str) -> Self {
        if label == PERSON_LABEL {
            BlurAction::Person
        } else if VEHICLE_LABELS.contains(&label) {
            BlurAction::Plate
        } else {
            BlurAction::Ignore
        }
    }
}

/// Outcome of blurring a single person region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonBlur {
    /// A face was found and only the face was blurred.
    Face,
    /// No face was found; the whole person region was blurred.
    WholePerson,
    /// Nothing was blurred: the box, or the face found in it, fell outside the image.
    Empty,
}

/// Counts of what happened to one image's detections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlurSummary {
    pub faces: usize,
    pub persons: usize,
    pub plates: usize,
    pub ignored: usize,
}

impl BlurSummary {
    /// Number of regions that went through the blur filter.
    pub fn actions(&self) -> usize {
        self.faces + self.persons + self.plates
    }
}

/// Counters for a whole directory walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub processed: usize,
    pub skipped: usize,
    pub written: usize,
    pub write_failures: usize,
    pub inference_failures: usize,
}

/// How the driver reacts when the detector or face locator fails on a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum InferencePolicy {
    /// Stop the whole batch with the error.
    #[default]
    Abort,
    /// Log the error, leave the file unwritten and keep walking.
    Skip,
}
