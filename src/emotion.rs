// Face detection and emotion classification

use crate::error::{NeuroSphereError, Result};
use crate::models::{Emotion, FaceRegion, Frame};
use opencv::core::{Mat, Rect, Size, Vector};
use opencv::imgproc;
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use ort::session::Session;
use ort::value::Value;
use tracing::{debug, error, warn};

/// Side length of the classifier's square input
const MODEL_INPUT_SIZE: i32 = 260;

/// Face detector using OpenCV Haar Cascade
pub struct FaceDetector {
    classifier: CascadeClassifier,
}

impl FaceDetector {
    /// Creates a new FaceDetector by loading the Haar Cascade classifier
    pub fn new(cascade_path: &str) -> Result<Self> {
        let classifier = CascadeClassifier::new(cascade_path).map_err(|e| {
            error!("Failed to load Haar Cascade: {}", e);
            NeuroSphereError::ModelLoad(format!("Haar Cascade load failed: {e}"))
        })?;

        if classifier.empty()? {
            return Err(NeuroSphereError::ModelLoad(
                "Haar Cascade classifier is empty".to_string(),
            ));
        }

        Ok(Self { classifier })
    }

    /// Detects faces in the given frame and returns their regions
    pub fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceRegion>> {
        // Convert frame data to OpenCV Mat
        let mat = Mat::from_slice(&frame.data).map_err(|e| {
            NeuroSphereError::FaceDetection(format!("Failed to create Mat: {e}"))
        })?;

        let mat = mat.reshape(3, frame.height as i32).map_err(|e| {
            NeuroSphereError::FaceDetection(format!("Failed to reshape Mat: {e}"))
        })?;

        // Convert to grayscale for face detection
        let mut gray = Mat::default();
        imgproc::cvt_color(&mat, &mut gray, imgproc::COLOR_RGB2GRAY, 0)
            .map_err(|e| {
            NeuroSphereError::FaceDetection(format!("Failed to convert to grayscale: {e}"))
        })?;

        let mut faces = Vector::<Rect>::new();
        self.classifier
            .detect_multi_scale(
                &gray,
                &mut faces,
                1.1,             // scale factor
                4,               // min neighbors
                0,               // flags
                Size::new(0, 0), // min size (unconstrained)
                Size::new(0, 0), // max size (unconstrained)
            )
            .map_err(|e| {
                NeuroSphereError::FaceDetection(format!("Face detection failed: {e}"))
            })?;

        Ok(faces
            .iter()
            .map(|rect| FaceRegion::new(rect.x, rect.y, rect.width, rect.height))
            .collect())
    }
}

/// Crops a face region out of the RGB frame and scales it to the
/// classifier's input size, normalized to [0, 1] in HWC order
fn preprocess_face(frame: &Frame, region: &FaceRegion) -> Result<Vec<f32>> {
    let mat = Mat::from_slice(&frame.data).map_err(|e| {
        NeuroSphereError::FrameProcessing(format!("Failed to create face Mat: {e}"))
    })?;

    let mat = mat.reshape(3, frame.height as i32).map_err(|e| {
        NeuroSphereError::FrameProcessing(format!("Failed to reshape face Mat: {e}"))
    })?;

    let rect = Rect::new(region.x, region.y, region.width, region.height);
    let face_roi = Mat::roi(&mat, rect).map_err(|e| {
        NeuroSphereError::FrameProcessing(format!("Failed to crop face region: {e}"))
    })?;

    // Clone the ROI to ensure the Mat is continuous in memory
    let face = face_roi.try_clone().map_err(|e| {
        NeuroSphereError::FrameProcessing(format!("Failed to clone face ROI: {e}"))
    })?;

    let mut resized = Mat::default();
    imgproc::resize(
        &face,
        &mut resized,
        Size::new(MODEL_INPUT_SIZE, MODEL_INPUT_SIZE),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )
    .map_err(|e| NeuroSphereError::FrameProcessing(format!("Failed to resize face: {e}")))?;

    // Convert to float and normalize to [0, 1]
    let data = resized.data_bytes().map_err(|e| {
        NeuroSphereError::FrameProcessing(format!("Failed to get resized data: {e}"))
    })?;

    let normalized: Vec<f32> = data.iter().map(|&pixel| pixel as f32 / 255.0).collect();
    Ok(normalized)
}

/// Emotion classifier using ONNX Runtime
pub struct EmotionClassifier {
    session: Session,
}

impl EmotionClassifier {
    /// Creates a new EmotionClassifier by loading the ONNX model
    pub fn new(model_path: &str) -> Result<Self> {
        let session = Session::builder()
            .map_err(|e| {
                NeuroSphereError::ModelLoad(format!("Failed to create session builder: {e}"))
            })?
            .commit_from_file(model_path)
            .map_err(|e| {
                error!("Failed to load ONNX model: {}", e);
                NeuroSphereError::ModelLoad(format!("ONNX model load failed: {e}"))
            })?;

        Ok(Self { session })
    }

    /// Classifies emotion from preprocessed face data, returning the
    /// dominant label and its probability
    pub fn classify(&mut self, preprocessed_face: &[f32]) -> Result<(Emotion, f32)> {
        // The model expects [1, 3, H, W] in CHW order; preprocessed data is HWC
        let height = MODEL_INPUT_SIZE as usize;
        let width = MODEL_INPUT_SIZE as usize;
        let channels = 3;

        let mut chw_data = vec![0.0f32; channels * height * width];
        for h in 0..height {
            for w in 0..width {
                for c in 0..channels {
                    let hwc_idx = (h * width + w) * channels + c;
                    let chw_idx = c * (height * width) + h * width + w;
                    chw_data[chw_idx] = preprocessed_face[hwc_idx];
                }
            }
        }

        let input_array = ndarray::Array4::from_shape_vec((1, 3, height, width), chw_data)
            .map_err(|e| {
                error!("Failed to create input array: {}", e);
                NeuroSphereError::OnnxRuntime(format!("Failed to create input array: {e}"))
            })?;

        let input_tensor = Value::from_array(input_array).map_err(|e| {
            NeuroSphereError::OnnxRuntime(format!("Failed to create input tensor: {e}"))
        })?;

        // Run inference
        let inputs = ort::inputs![input_tensor];
        let outputs = self.session.run(inputs).map_err(|e| {
            error!("ONNX inference failed: {}", e);
            NeuroSphereError::OnnxRuntime(format!("Inference failed: {e}"))
        })?;

        let (_, output_value) = outputs
            .iter()
            .next()
            .ok_or_else(|| NeuroSphereError::OnnxRuntime("No output from model".to_string()))?;

        let tensor = output_value.try_extract_tensor::<f32>().map_err(|e| {
            NeuroSphereError::OnnxRuntime(format!("Failed to extract output tensor: {e}"))
        })?;

        let logits = tensor.1;

        // Apply softmax to convert logits to probabilities
        let max_logit = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let exp_sum: f32 = logits.iter().map(|&x| (x - max_logit).exp()).sum();
        let probabilities: Vec<f32> = logits
            .iter()
            .map(|&x| (x - max_logit).exp() / exp_sum)
            .collect();

        let (max_idx, max_prob) = probabilities
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or_else(|| {
                NeuroSphereError::OnnxRuntime("No probabilities in output".to_string())
            })?;

        Ok((index_to_emotion(max_idx), *max_prob))
    }
}

/// Maps model output index to Emotion
/// HSEmotion mapping: 0=Angry, 1=Disgust, 2=Fear, 3=Happy, 4=Sad, 5=Surprise, 6=Neutral, 7=Contempt
fn index_to_emotion(index: usize) -> Emotion {
    match index {
        0 => Emotion::Angry,
        1 => Emotion::Disgust,
        2 => Emotion::Fear,
        3 => Emotion::Happy,
        4 => Emotion::Sad,
        5 => Emotion::Surprised,
        6 => Emotion::Neutral,
        7 => Emotion::Disgust, // Contempt -> map to Disgust
        _ => {
            warn!("Unknown emotion index: {}", index);
            Emotion::Unknown
        }
    }
}

/// Everything the capture loop needs from one frame
#[derive(Clone, Debug)]
pub struct FrameAnalysis {
    /// Detected face rectangles, possibly empty
    pub faces: Vec<FaceRegion>,
    /// Dominant emotion, `Unknown` when classification failed
    pub emotion: Emotion,
    /// Probability of the dominant emotion (0 when classification failed)
    pub confidence: f32,
    /// User-visible description of a classification failure, if any
    pub failure: Option<String>,
}

/// Combines face detection and classification for the capture loop
pub struct EmotionAnalyzer {
    face_detector: FaceDetector,
    classifier: EmotionClassifier,
}

impl EmotionAnalyzer {
    /// Creates a new EmotionAnalyzer from the cascade and model paths
    pub fn new(cascade_path: &str, model_path: &str) -> Result<Self> {
        let face_detector = FaceDetector::new(cascade_path)?;
        let classifier = EmotionClassifier::new(model_path)?;

        Ok(Self {
            face_detector,
            classifier,
        })
    }

    /// Runs detection and classification on one frame.
    ///
    /// Never fails: a detector error degrades to an empty face set, and a
    /// classifier error (including "no face in frame") degrades to
    /// `Emotion::Unknown` with the failure recorded for display. The capture
    /// loop always proceeds to the next frame.
    pub fn process_frame(&mut self, frame: &Frame) -> FrameAnalysis {
        let faces = match self.face_detector.detect(frame) {
            Ok(faces) => faces,
            Err(e) => {
                warn!("Face detection failed: {}", e);
                Vec::new()
            }
        };

        let Some(first) = faces.first().copied() else {
            return FrameAnalysis {
                faces,
                emotion: Emotion::Unknown,
                confidence: 0.0,
                failure: Some("No face detected in frame".to_string()),
            };
        };

        match preprocess_face(frame, &first).and_then(|input| self.classifier.classify(&input)) {
            Ok((emotion, confidence)) => {
                debug!("Classified {} ({:.0}%)", emotion, confidence * 100.0);
                FrameAnalysis {
                    faces,
                    emotion,
                    confidence,
                    failure: None,
                }
            }
            Err(e) => {
                error!("Emotion classification failed: {}", e);
                FrameAnalysis {
                    faces,
                    emotion: Emotion::Unknown,
                    confidence: 0.0,
                    failure: Some(format!("Error analyzing frame: {e}")),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_index_mapping_is_fixed() {
        assert_eq!(index_to_emotion(0), Emotion::Angry);
        assert_eq!(index_to_emotion(1), Emotion::Disgust);
        assert_eq!(index_to_emotion(2), Emotion::Fear);
        assert_eq!(index_to_emotion(3), Emotion::Happy);
        assert_eq!(index_to_emotion(4), Emotion::Sad);
        assert_eq!(index_to_emotion(5), Emotion::Surprised);
        assert_eq!(index_to_emotion(6), Emotion::Neutral);
        assert_eq!(index_to_emotion(7), Emotion::Disgust);
    }

    #[test]
    fn out_of_range_index_is_unknown() {
        assert_eq!(index_to_emotion(8), Emotion::Unknown);
        assert_eq!(index_to_emotion(99), Emotion::Unknown);
    }
}
