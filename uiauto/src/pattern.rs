use {
    anyhow::Context as _,
    image::GrayImage,
    std::path::Path,
};

/// Similarity floor for patterns loaded without an explicit one.
pub const DEFAULT_SIMILARITY: f32 = 0.7;
/// Score floor for exact-mode patterns.
const EXACT_SIMILARITY: f32 = 0.999;

/// Match-confidence mode of a pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Confidence {
    /// The reference must match near pixel-perfectly.
    Exact,
    /// The reference matches if the correlation score clears the given floor.
    Similar(f32),
}

impl Confidence {
    pub fn threshold(self) -> f32 {
        match self {
            Confidence::Exact => EXACT_SIMILARITY,
            Confidence::Similar(value) => value,
        }
    }
}

/// A reference image to locate on screen.
pub struct Pattern {
    name: String,
    image: GrayImage,
    confidence: Confidence,
}

impl Pattern {
    /// Loads a reference screenshot. The file stem becomes the pattern's
    /// display name.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = fs_err::read(path)?;
        let image = image::load_from_memory(&bytes)
            .with_context(|| format!("failed to decode image {:?}", path))?
            .into_luma8();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_image(name, image))
    }

    pub fn from_image(name: impl Into<String>, image: GrayImage) -> Self {
        Self {
            name: name.into(),
            image,
            confidence: Confidence::Similar(DEFAULT_SIMILARITY),
        }
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn exact(self) -> Self {
        self.with_confidence(Confidence::Exact)
    }

    pub fn with_similarity(self, value: f32) -> Self {
        self.with_confidence(Confidence::Similar(value))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }
}

/// A located occurrence of a pattern, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    /// Top-left corner of the matched region.
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub score: f32,
}

impl Match {
    /// Click target: the center of the matched region.
    pub fn center(&self) -> (i32, i32) {
        (
            (self.x + self.width / 2) as i32,
            (self.y + self.height / 2) as i32,
        )
    }
}

#[cfg(test)]
mod tests {
    use {super::*, image::Luma};

    #[test]
    fn loads_pattern_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marker.png");
        GrayImage::from_pixel(4, 3, Luma([128])).save(&path).unwrap();

        let pattern = Pattern::from_file(&path).unwrap();
        assert_eq!(pattern.name(), "marker");
        assert_eq!(pattern.image().dimensions(), (4, 3));
        assert_eq!(pattern.confidence(), Confidence::Similar(DEFAULT_SIMILARITY));
    }

    #[test]
    fn missing_pattern_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Pattern::from_file(dir.path().join("nope.png")).is_err());
    }

    #[test]
    fn undecodable_pattern_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs_err::write(&path, b"not a png").unwrap();
        let err = Pattern::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.png"));
    }

    #[test]
    fn confidence_thresholds() {
        assert_eq!(Confidence::Similar(0.69).threshold(), 0.69);
        assert!(Confidence::Exact.threshold() > 0.99);
    }

    #[test]
    fn confidence_builders() {
        let image = GrayImage::from_pixel(2, 2, Luma([0]));
        let pattern = Pattern::from_image("p", image).with_similarity(0.5);
        assert_eq!(pattern.confidence(), Confidence::Similar(0.5));
        assert_eq!(pattern.exact().confidence(), Confidence::Exact);
    }

    #[test]
    fn match_center() {
        let found = Match {
            x: 20,
            y: 10,
            width: 8,
            height: 6,
            score: 1.0,
        };
        assert_eq!(found.center(), (24, 13));
    }
}
