//! Input processing module
//! Handles file detection, text extraction, and document loading

pub mod file_detector;
pub mod text_extractor;
pub mod manager;

pub use manager::{DocumentBatch, InputManager, SkippedDocument};
