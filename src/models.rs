// Core data models for the NeuroSphere application

use serde::{Deserialize, Serialize};

/// Represents a single video frame with RGB data
#[derive(Clone, Debug)]
pub struct Frame {
    /// Raw RGB pixel data (width * height * 3 bytes)
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
}

impl Frame {
    /// Creates a new Frame with the given parameters
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }
}

/// Axis-aligned rectangle around a detected face, in frame coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceRegion {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FaceRegion {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// The closed set of emotion labels the classifier can report.
///
/// `Unknown` is the sentinel for classification failure and for any model
/// output that falls outside the known set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Surprised,
    Neutral,
    Fear,
    Disgust,
    Unknown,
}

impl Emotion {
    /// The known labels, excluding the `Unknown` sentinel
    pub const KNOWN: [Emotion; 7] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Surprised,
        Emotion::Neutral,
        Emotion::Fear,
        Emotion::Disgust,
    ];

    /// Returns the lowercase tag used for display, overlay and the CSV log
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Surprised => "surprised",
            Emotion::Neutral => "neutral",
            Emotion::Fear => "fear",
            Emotion::Disgust => "disgust",
            Emotion::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the session log, flushed to `face_emotions.csv`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Second-resolution wall-clock time, `YYYY-MM-DD HH:MM:SS`
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    /// Emotion tag, a catalog key or "unknown"
    #[serde(rename = "Emotion")]
    pub emotion: String,
    /// Path of the image written by the same save action
    #[serde(rename = "File Path")]
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emotion_tags_are_lowercase_and_distinct() {
        let mut seen = std::collections::HashSet::new();
        for emotion in Emotion::KNOWN {
            let tag = emotion.as_str();
            assert_eq!(tag, tag.to_lowercase());
            assert!(seen.insert(tag), "duplicate tag: {tag}");
        }
        assert!(!seen.contains("unknown"));
        assert_eq!(Emotion::Unknown.as_str(), "unknown");
    }

    #[test]
    fn emotion_display_matches_tag() {
        assert_eq!(Emotion::Happy.to_string(), "happy");
        assert_eq!(Emotion::Fear.to_string(), "fear");
        assert_eq!(Emotion::Unknown.to_string(), "unknown");
    }
}
