// Library exports for NeuroSphere - emotion detection with product recommendations

pub mod annotate;
pub mod camera;
pub mod catalog;
pub mod emotion;
pub mod error;
pub mod models;
pub mod session;
pub mod ui;
