// UI module for the NeuroSphere application

use crate::annotate::annotate;
use crate::camera::CameraManager;
use crate::catalog;
use crate::emotion::{EmotionAnalyzer, FrameAnalysis};
use crate::models::{Emotion, Frame};
use crate::session::{self, SessionLog, TableState};
use tracing::{error, info, warn};

/// Product list surfaced for one frame: a classification failure shows no
/// products, anything else shows the catalog entry for the label
fn products_for_analysis(analysis: &FrameAnalysis) -> &'static [&'static str] {
    if analysis.failure.is_some() {
        &[]
    } else {
        catalog::products_for(analysis.emotion)
    }
}

/// Explicit lifecycle of the capture loop, driven by button events
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectionState {
    /// No session has run yet
    Idle,
    /// Camera held, one capture-detect-annotate step per repaint
    Running,
    /// A session ran and was finalized
    Stopped,
}

/// Main application UI
pub struct NeuroSphereApp {
    analyzer: EmotionAnalyzer,
    camera: Option<CameraManager>,
    session: Option<SessionLog>,
    state: DetectionState,
    camera_texture: Option<egui::TextureHandle>,
    /// The most recently displayed (annotated) frame; what a save persists
    current_frame: Option<Frame>,
    current_emotion: Emotion,
    current_confidence: f32,
    current_products: &'static [&'static str],
    last_error: Option<String>,
    status: Option<String>,
    table: TableState,
}

impl NeuroSphereApp {
    /// Creates a new NeuroSphereApp around a loaded analyzer
    pub fn new(analyzer: EmotionAnalyzer) -> Self {
        Self {
            analyzer,
            camera: None,
            session: None,
            state: DetectionState::Idle,
            camera_texture: None,
            current_frame: None,
            current_emotion: Emotion::Unknown,
            current_confidence: 0.0,
            current_products: &[],
            last_error: None,
            status: None,
            table: session::read_table(session::TABLE_PATH),
        }
    }

    /// Acquires the camera and enters `Running`; on failure the error is
    /// surfaced and the state machine stays where it was
    fn start_detection(&mut self) {
        match CameraManager::open() {
            Ok(camera) => {
                info!("Detection started on {}", camera.name());
                self.camera = Some(camera);
                self.session = Some(SessionLog::new());
                self.state = DetectionState::Running;
                self.last_error = None;
                self.status = None;
            }
            Err(e) => {
                error!("Cannot open webcam: {}", e);
                self.last_error = Some(format!("Cannot open webcam! {e}"));
            }
        }
    }

    /// One capture-detect-annotate iteration
    fn step(&mut self, ctx: &egui::Context) {
        let Some(camera) = self.camera.as_mut() else {
            return;
        };

        match camera.current_frame() {
            Ok(mut frame) => {
                let analysis = self.analyzer.process_frame(&frame);

                if let Err(e) = annotate(&mut frame, &analysis.faces, analysis.emotion.as_str()) {
                    warn!("Failed to annotate frame: {}", e);
                }

                let color_image = egui::ColorImage::from_rgb(
                    [frame.width as usize, frame.height as usize],
                    &frame.data,
                );
                self.camera_texture =
                    Some(ctx.load_texture("camera", color_image, egui::TextureOptions::LINEAR));

                self.current_emotion = analysis.emotion;
                self.current_confidence = analysis.confidence;
                self.current_products = products_for_analysis(&analysis);
                self.last_error = analysis.failure;
                self.current_frame = Some(frame);
            }
            Err(e) => {
                // A failed read is end-of-stream, not an error
                info!("Camera stream ended: {}", e);
                self.finish_session();
            }
        }
    }

    /// Persists the currently displayed frame and logs a record
    fn save_current(&mut self) {
        let Some(frame) = self.current_frame.as_ref() else {
            return;
        };
        let Some(log) = self.session.as_mut() else {
            return;
        };

        match log.save_frame(frame, self.current_emotion) {
            Ok(path) => {
                self.status = Some(format!("Image saved and data logged: {}", path.display()));
            }
            Err(e) => {
                error!("Save failed: {}", e);
                self.last_error = Some(format!("Failed to save image: {e}"));
            }
        }
    }

    /// Releases the camera and flushes the session log to the CSV table
    fn finish_session(&mut self) {
        // Dropping the manager releases the device on every exit path
        self.camera = None;

        if let Some(log) = self.session.take() {
            match log.finalize() {
                Ok(path) => {
                    self.status = Some(format!("Data saved to {}", path.display()));
                }
                Err(e) => {
                    error!("Failed to write session log: {}", e);
                    self.last_error = Some(format!("Failed to write session log: {e}"));
                }
            }
        }

        self.state = DetectionState::Stopped;
        self.table = session::read_table(session::TABLE_PATH);
    }

    fn render_header(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading("Welcome To NeuroSphere!!");
            ui.label(
                "This app detects emotions from a live webcam feed and suggests products \
                 based on the detected emotion. To make your shopping experience happy and \
                 more reliable",
            );
        });
    }

    fn render_controls(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("controls")
            .resizable(true)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    match self.state {
                        DetectionState::Idle | DetectionState::Stopped => {
                            if ui.button("Start Detection").clicked() {
                                self.start_detection();
                            }
                        }
                        DetectionState::Running => {
                            if ui.button("Save Image").clicked() {
                                self.save_current();
                            }
                            // Checked once per iteration, after the frame is shown
                            if ui.button("Quit").clicked() {
                                self.finish_session();
                            }
                        }
                    }
                });

                if self.state == DetectionState::Running {
                    ui.label(format!("Emotion Detected: {}", self.current_emotion));
                    ui.label(format!(
                        "Recommended Products: {}",
                        catalog::recommendation_text(self.current_products)
                    ));
                    if let Some(camera) = &self.camera {
                        ui.weak(format!(
                            "{} ({:.0}% confidence)",
                            camera.name(),
                            self.current_confidence * 100.0
                        ));
                    }
                }

                if let Some(error) = &self.last_error {
                    ui.colored_label(egui::Color32::RED, error);
                }
                if let Some(status) = &self.status {
                    ui.colored_label(egui::Color32::from_rgb(0, 140, 0), status);
                }

                if self.state != DetectionState::Running {
                    ui.separator();
                    self.render_table(ui);
                }
                ui.add_space(4.0);
            });
    }

    /// Renders the persisted table, one distinct message per viewer state
    fn render_table(&self, ui: &mut egui::Ui) {
        ui.heading("Logged Emotions and Product Recommendations");
        match &self.table {
            TableState::NoData => {
                ui.label("No data available. Start detection to log emotions.");
            }
            TableState::Empty => {
                ui.label("The file is empty.");
            }
            TableState::Unreadable(_) => {
                ui.label("The file is empty or cannot be read.");
            }
            TableState::Rows(rows) => {
                egui::Grid::new("emotion_log").striped(true).show(ui, |ui| {
                    ui.strong("Timestamp");
                    ui.strong("Emotion");
                    ui.strong("File Path");
                    ui.end_row();
                    for row in rows {
                        ui.label(&row.timestamp);
                        ui.label(&row.emotion);
                        ui.label(&row.path);
                        ui.end_row();
                    }
                });
            }
        }
    }

    /// Renders the camera view, aspect-fit and centered
    fn render_camera_view(&self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let available_size = ui.available_size();

                if let Some(texture) = &self.camera_texture {
                    let texture_size = texture.size_vec2();
                    let aspect_ratio = texture_size.x / texture_size.y;

                    // Calculate size to fit while maintaining aspect ratio
                    let mut display_width = available_size.x;
                    let mut display_height = display_width / aspect_ratio;

                    if display_height > available_size.y {
                        display_height = available_size.y;
                        display_width = display_height * aspect_ratio;
                    }

                    // Center position
                    let x_offset = (available_size.x - display_width) / 2.0;
                    let y_offset = (available_size.y - display_height) / 2.0;

                    ui.put(
                        egui::Rect::from_min_size(
                            egui::pos2(x_offset, y_offset),
                            egui::vec2(display_width, display_height),
                        ),
                        egui::Image::new(texture)
                            .fit_to_exact_size(egui::vec2(display_width, display_height)),
                    );
                } else {
                    ui.centered_and_justified(|ui| {
                        ui.label("Press Start Detection to begin.");
                    });
                }
            });
    }
}

impl eframe::App for NeuroSphereApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint();

        if self.state == DetectionState::Running {
            self.step(ctx);
        }

        self.render_header(ctx);
        self.render_controls(ctx);
        self.render_camera_view(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FaceRegion;

    fn analysis(emotion: Emotion, failure: Option<&str>) -> FrameAnalysis {
        FrameAnalysis {
            faces: vec![FaceRegion::new(10, 10, 50, 50)],
            emotion,
            confidence: if failure.is_some() { 0.0 } else { 0.8 },
            failure: failure.map(str::to_string),
        }
    }

    #[test]
    fn successful_classification_surfaces_catalog_products() {
        let products = products_for_analysis(&analysis(Emotion::Happy, None));
        assert_eq!(products, catalog::products_for(Emotion::Happy));
        assert_eq!(
            catalog::recommendation_text(products),
            "Joyful Juice, Cheerful Chocolate, Happy Hoodie"
        );
    }

    #[test]
    fn classification_failure_surfaces_no_products() {
        let failed = analysis(Emotion::Unknown, Some("Error analyzing frame: model error"));
        assert_eq!(failed.emotion, Emotion::Unknown);
        assert!(products_for_analysis(&failed).is_empty());
    }
}
