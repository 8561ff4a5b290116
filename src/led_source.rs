use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, LedSourceError};
use crate::panel::{Panel, PANEL_COUNT};

pub const SEGMENT_COUNT: usize = 4;

/// Supplies the intensity bytes shown on each segment of one panel.
pub trait LedSource {
    /// Intensity bytes for `segment`. Stable across calls for one source.
    fn segment_data(&self, segment: usize) -> &[u8];
}

/// One source per panel, indexed by `Panel::index`.
pub struct LedSources {
    sources: [Box<dyn LedSource + Send>; PANEL_COUNT],
}

impl LedSources {
    pub fn new(sources: [Box<dyn LedSource + Send>; PANEL_COUNT]) -> Self {
        Self { sources }
    }

    /// Load one file per panel, each rotated to match its panel's LED ring.
    pub fn from_files<P: AsRef<Path>>(paths: &[P; PANEL_COUNT]) -> Result<Self, Error> {
        let load = |panel: Panel| -> Result<Box<dyn LedSource + Send>, Error> {
            let path = &paths[panel.index()];
            Ok(Box::new(FileLedSource::from_file(path, panel.rotation_degrees())?))
        };

        Ok(Self::new([
            load(Panel::Left)?,
            load(Panel::Down)?,
            load(Panel::Up)?,
            load(Panel::Right)?,
        ]))
    }

    pub fn get(&self, panel: Panel) -> &dyn LedSource {
        self.sources[panel.index()].as_ref()
    }
}

#[derive(Debug, Deserialize)]
struct SegmentFile {
    segments: Vec<Vec<u8>>,
}

/// LED segment data loaded from a YAML file.
///
/// ```yaml
/// segments:
///   - [255, 0, 0, 255, 0, 0]
///   - [0, 255, 0, 0, 255, 0]
///   - [0, 0, 255, 0, 0, 255]
///   - [255, 255, 255, 0, 0, 0]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLedSource {
    segments: [Vec<u8>; SEGMENT_COUNT],
}

impl FileLedSource {
    pub fn from_file(path: impl AsRef<Path>, rotation_degrees: u16) -> Result<Self, Error> {
        let path = path.as_ref();
        Self::load(path, rotation_degrees).map_err(|source| Error::LedSource {
            path: PathBuf::from(path),
            source,
        })
    }

    fn load(path: &Path, rotation_degrees: u16) -> Result<Self, LedSourceError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents, rotation_degrees)
    }

    pub fn from_yaml(contents: &str, rotation_degrees: u16) -> Result<Self, LedSourceError> {
        let file: SegmentFile = serde_yaml::from_str(contents)?;
        let segments: [Vec<u8>; SEGMENT_COUNT] =
            file.segments
                .try_into()
                .map_err(|segments: Vec<Vec<u8>>| LedSourceError::SegmentCount {
                    found: segments.len(),
                    expected: SEGMENT_COUNT,
                })?;
        Self::rotated(segments, rotation_degrees)
    }

    /// Rotate the panel's segments by whole quarter turns: with a rotation of
    /// 90 degrees, segment `n` shows what the file stores for segment `n + 1`.
    pub fn rotated(
        mut segments: [Vec<u8>; SEGMENT_COUNT],
        rotation_degrees: u16,
    ) -> Result<Self, LedSourceError> {
        if rotation_degrees % 90 != 0 {
            return Err(LedSourceError::Rotation(rotation_degrees));
        }
        let quarter_turns = usize::from(rotation_degrees / 90) % SEGMENT_COUNT;
        segments.rotate_left(quarter_turns);
        Ok(Self { segments })
    }
}

impl LedSource for FileLedSource {
    fn segment_data(&self, segment: usize) -> &[u8] {
        self.segments
            .get(segment)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = "segments:\n  - [1, 2]\n  - [3]\n  - [4, 5, 6]\n  - []\n";

    #[test]
    fn loads_segments_without_rotation() {
        let source = FileLedSource::from_yaml(YAML, 0).unwrap();
        assert_eq!(source.segment_data(0), &[1, 2]);
        assert_eq!(source.segment_data(1), &[3]);
        assert_eq!(source.segment_data(2), &[4, 5, 6]);
        assert!(source.segment_data(3).is_empty());
        assert!(source.segment_data(4).is_empty());
    }

    #[test]
    fn rotation_shifts_segment_order() {
        let source = FileLedSource::from_yaml(YAML, 90).unwrap();
        assert_eq!(source.segment_data(0), &[3]);
        assert_eq!(source.segment_data(3), &[1, 2]);

        let source = FileLedSource::from_yaml(YAML, 270).unwrap();
        assert!(source.segment_data(0).is_empty());
        assert_eq!(source.segment_data(1), &[1, 2]);

        let full_turn = FileLedSource::from_yaml(YAML, 360).unwrap();
        assert_eq!(full_turn, FileLedSource::from_yaml(YAML, 0).unwrap());
    }

    #[test]
    fn rejects_bad_files() {
        assert!(matches!(
            FileLedSource::from_yaml("segments:\n  - [1]\n", 0),
            Err(LedSourceError::SegmentCount { found: 1, .. })
        ));
        assert!(matches!(
            FileLedSource::from_yaml(YAML, 45),
            Err(LedSourceError::Rotation(45))
        ));
        assert!(matches!(
            FileLedSource::from_yaml("segments:\n  - [256]\n  - []\n  - []\n  - []\n", 0),
            Err(LedSourceError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_names_its_path() {
        let err = FileLedSource::from_file("/nonexistent/pad-lights/left.yml", 90).unwrap_err();
        match err {
            Error::LedSource { path, source } => {
                assert_eq!(path, PathBuf::from("/nonexistent/pad-lights/left.yml"));
                assert!(matches!(source, LedSourceError::Io(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
