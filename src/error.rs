// Error types for the NeuroSphere application

use thiserror::Error;

/// Main error type for NeuroSphere
#[derive(Debug, Error)]
pub enum NeuroSphereError {
    #[error("Camera initialization failed: {0}")]
    CameraInit(String),

    #[error("Frame processing failed: {0}")]
    FrameProcessing(String),

    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Face detection failed: {0}")]
    FaceDetection(String),

    #[error("ONNX Runtime error: {0}")]
    OnnxRuntime(String),

    #[error("OpenCV error: {0}")]
    OpenCV(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type alias for NeuroSphere operations
pub type Result<T> = std::result::Result<T, NeuroSphereError>;

// Conversion from nokhwa errors
impl From<nokhwa::NokhwaError> for NeuroSphereError {
    fn from(err: nokhwa::NokhwaError) -> Self {
        match err {
            nokhwa::NokhwaError::StructureError { structure, error } => {
                NeuroSphereError::CameraInit(format!("{structure}: {error}"))
            }
            nokhwa::NokhwaError::OpenDeviceError(device, error) => {
                NeuroSphereError::CameraInit(format!("Device {device}: {error}"))
            }
            nokhwa::NokhwaError::GetPropertyError { property, error } => {
                NeuroSphereError::CameraInit(format!("Property {property}: {error}"))
            }
            _ => NeuroSphereError::CameraInit(err.to_string()),
        }
    }
}

// Conversion from OpenCV errors
impl From<opencv::Error> for NeuroSphereError {
    fn from(err: opencv::Error) -> Self {
        NeuroSphereError::OpenCV(err.to_string())
    }
}

// Conversion from ONNX Runtime errors
impl From<ort::Error> for NeuroSphereError {
    fn from(err: ort::Error) -> Self {
        NeuroSphereError::OnnxRuntime(err.to_string())
    }
}
