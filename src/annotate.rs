// In-place frame annotation: face rectangles and the emotion label

use crate::error::{NeuroSphereError, Result};
use crate::models::{FaceRegion, Frame};
use opencv::core::{Mat, Point, Rect, Scalar};
use opencv::imgproc;
use opencv::prelude::*;

/// Rectangle color, green in RGB order
const FACE_COLOR: (f64, f64, f64) = (0.0, 255.0, 0.0);
/// Label color, red in RGB order
const LABEL_COLOR: (f64, f64, f64) = (255.0, 0.0, 0.0);
/// Where the emotion label is anchored on the frame
const LABEL_ORIGIN: (i32, i32) = (50, 50);

/// Draws every face rectangle and the emotion label into the frame.
///
/// The frame is mutated in place; the annotated pixels are what the UI
/// displays and what a save action persists.
pub fn annotate(frame: &mut Frame, faces: &[FaceRegion], label: &str) -> Result<()> {
    let mut canvas = {
        let mat = Mat::from_slice(&frame.data).map_err(|e| {
            NeuroSphereError::FrameProcessing(format!("Failed to create Mat: {e}"))
        })?;
        let mat = mat.reshape(3, frame.height as i32).map_err(|e| {
            NeuroSphereError::FrameProcessing(format!("Failed to reshape Mat: {e}"))
        })?;
        mat.try_clone().map_err(|e| {
            NeuroSphereError::FrameProcessing(format!("Failed to clone frame Mat: {e}"))
        })?
    };

    let face_color = Scalar::new(FACE_COLOR.0, FACE_COLOR.1, FACE_COLOR.2, 0.0);
    for face in faces {
        imgproc::rectangle(
            &mut canvas,
            Rect::new(face.x, face.y, face.width, face.height),
            face_color,
            2,
            imgproc::LINE_8,
            0,
        )?;
    }

    imgproc::put_text(
        &mut canvas,
        label,
        Point::new(LABEL_ORIGIN.0, LABEL_ORIGIN.1),
        imgproc::FONT_HERSHEY_SIMPLEX,
        1.0,
        Scalar::new(LABEL_COLOR.0, LABEL_COLOR.1, LABEL_COLOR.2, 0.0),
        2,
        imgproc::LINE_4,
        false,
    )?;

    let bytes = canvas.data_bytes()?;
    if bytes.len() != frame.data.len() {
        return Err(NeuroSphereError::FrameProcessing(format!(
            "Annotated buffer size {} does not match frame size {}",
            bytes.len(),
            frame.data.len()
        )));
    }
    frame.data.copy_from_slice(bytes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_frame(width: u32, height: u32) -> Frame {
        Frame::new(vec![0; (width * height * 3) as usize], width, height)
    }

    fn pixel(frame: &Frame, x: u32, y: u32) -> (u8, u8, u8) {
        let idx = ((y * frame.width + x) * 3) as usize;
        (
            frame.data[idx],
            frame.data[idx + 1],
            frame.data[idx + 2],
        )
    }

    #[test]
    fn rectangle_is_drawn_at_region_corner() {
        let mut frame = black_frame(120, 120);
        annotate(&mut frame, &[FaceRegion::new(10, 10, 50, 50)], "happy").unwrap();

        assert_eq!(pixel(&frame, 10, 10), (0, 255, 0));
        // Hollow rectangle: interior pixels stay untouched
        assert_eq!(pixel(&frame, 35, 35), (0, 0, 0));
    }

    #[test]
    fn label_text_leaves_red_pixels() {
        let mut frame = black_frame(120, 120);
        annotate(&mut frame, &[], "happy").unwrap();

        let red_pixels = frame
            .data
            .chunks_exact(3)
            .filter(|px| px[0] == 255 && px[1] == 0 && px[2] == 0)
            .count();
        assert!(red_pixels > 0, "no red label pixels found");
    }

    #[test]
    fn no_faces_means_no_green() {
        let mut frame = black_frame(120, 120);
        annotate(&mut frame, &[], "neutral").unwrap();

        let green_pixels = frame
            .data
            .chunks_exact(3)
            .filter(|px| px[0] == 0 && px[1] == 255 && px[2] == 0)
            .count();
        assert_eq!(green_pixels, 0);
    }
}
