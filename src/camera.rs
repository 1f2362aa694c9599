// Camera module for webcam capture

use crate::error::{NeuroSphereError, Result};
use crate::models::Frame;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use tracing::error;

/// Exclusive handle on the system camera for the duration of one session.
///
/// The stream is opened by `open()` and stopped when the manager is dropped,
/// so every exit path out of the capture loop releases the device.
pub struct CameraManager {
    camera: Camera,
}

impl CameraManager {
    /// Opens the default camera and verifies the stream delivers frames
    pub fn open() -> Result<Self> {
        // Request 640x480 at 30 FPS for better performance
        let requested_format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            nokhwa::utils::CameraFormat::new(
                nokhwa::utils::Resolution::new(640, 480),
                nokhwa::utils::FrameFormat::YUYV,
                30,
            ),
        ));

        // Try different camera indices (some systems start at 0, others at 1)
        let camera = Self::try_open_camera(0, requested_format)
            .or_else(|_| Self::try_open_camera(1, requested_format))
            .map_err(|e| {
                error!(
                    "Failed to initialize camera after trying multiple indices: {}",
                    e
                );
                NeuroSphereError::CameraInit(format!(
                    "Could not open camera. Make sure:\n\
                    1. A camera is connected\n\
                    2. No other app is using it\n\
                    3. Camera permissions are granted\n\
                    Error: {e}"
                ))
            })?;

        let mut manager = Self { camera };
        manager.ensure_stream_open()?;
        Ok(manager)
    }

    /// Helper to try opening a camera at a specific index
    fn try_open_camera(index: u32, requested_format: RequestedFormat) -> Result<Camera> {
        Camera::new(CameraIndex::Index(index), requested_format)
            .map_err(|e| NeuroSphereError::CameraInit(e.to_string()))
    }

    /// Returns the camera's human-readable name
    pub fn name(&self) -> String {
        self.camera.info().human_name().to_string()
    }

    /// Opens the camera stream and verifies it is delivering frames
    fn ensure_stream_open(&mut self) -> Result<()> {
        // Idempotent if the stream is already open
        let _ = self.camera.open_stream();

        // Wait a moment for the camera to initialize
        std::thread::sleep(std::time::Duration::from_millis(200));

        match self.camera.frame() {
            Ok(_) => Ok(()),
            Err(e) => {
                error!("Camera stream not working: {}", e);
                Err(NeuroSphereError::CameraInit(format!(
                    "Camera stream not working: {e}. Make sure camera permissions are granted."
                )))
            }
        }
    }

    /// Gets the most recent frame (blocking).
    ///
    /// An error here means the stream has ended; the caller treats it as
    /// end-of-stream rather than a failure.
    pub fn current_frame(&mut self) -> Result<Frame> {
        let frame_data = self.camera.frame().map_err(|e| {
            NeuroSphereError::FrameProcessing(format!("Failed to capture frame: {e}"))
        })?;

        let buffer = frame_data.decode_image::<RgbFormat>().map_err(|e| {
            NeuroSphereError::FrameProcessing(format!("Failed to decode frame: {e}"))
        })?;

        let (width, height) = (buffer.width(), buffer.height());
        let data = buffer.into_raw();

        Ok(Frame::new(data, width, height))
    }
}

impl Drop for CameraManager {
    fn drop(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            error!("Error stopping camera stream: {}", e);
        }
    }
}
