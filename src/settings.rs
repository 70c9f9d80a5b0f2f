//! Fixed run settings for the demo pipeline.

use std::path::PathBuf;

/// Test patterns the synthetic video source can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TestPattern {
    /// SMPTE color bars.
    Smpte,
    /// Random noise.
    #[default]
    Snow,
    /// Solid black.
    Black,
    /// Solid white.
    White,
    /// A moving ball.
    Ball,
}

impl TestPattern {
    /// The pattern nick understood by the source stage.
    pub fn as_str(self) -> &'static str {
        match self {
            TestPattern::Smpte => "smpte",
            TestPattern::Snow => "snow",
            TestPattern::Black => "black",
            TestPattern::White => "white",
            TestPattern::Ball => "ball",
        }
    }
}

/// Settings for one run of the pipeline.
///
/// There is no CLI or environment surface; the demo runs with the defaults.
/// The struct exists so the library API and the tests are not hard-wired
/// to constants.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Pattern generated by the video test source.
    pub pattern: TestPattern,
    /// Destination path for the file branch.
    ///
    /// Not validated here: an unwritable path surfaces later as a runtime
    /// error from the file sink, not as a build-time failure.
    pub output: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pattern: TestPattern::default(),
            output: PathBuf::from("output.mp4"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo() {
        let settings = Settings::default();
        assert_eq!(settings.pattern, TestPattern::Snow);
        assert_eq!(settings.output, PathBuf::from("output.mp4"));
    }

    #[test]
    fn pattern_nicks() {
        assert_eq!(TestPattern::Snow.as_str(), "snow");
        assert_eq!(TestPattern::Smpte.as_str(), "smpte");
    }
}
