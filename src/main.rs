use neurosphere::emotion::EmotionAnalyzer;
use neurosphere::error::{NeuroSphereError, Result};
use neurosphere::ui::NeuroSphereApp;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes the logging system (file only, no console output)
fn init_logging() -> Result<()> {
    // Create log file
    let log_file = std::fs::File::create("neurosphere.log").map_err(NeuroSphereError::Io)?;

    // Set up file layer only (no console output)
    let file_layer = fmt::layer()
        .with_writer(Arc::new(log_file))
        .with_ansi(false);

    // Initialize subscriber with file logging only
    tracing_subscriber::registry().with(file_layer).init();

    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;

    let analyzer = EmotionAnalyzer::new(
        "assets/models/haarcascade_frontalface_default.xml",
        "assets/models/emotion.onnx",
    )?;

    let result = eframe::run_native(
        "NeuroSphere",
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([1280.0, 960.0])
                .with_title("NeuroSphere"),
            ..Default::default()
        },
        Box::new(move |_cc| Ok(Box::new(NeuroSphereApp::new(analyzer)))),
    );

    if let Err(e) = result {
        error!("Application error: {}", e);
    }

    Ok(())
}
