//! Core library for the Reactive Visualiser.
//!
//! The crate owns everything that happens to a frame between capture and
//! display: RGBA pixel buffers, keyboard-toggled image filters (threshold,
//! invert, posterize and Sobel edge detection), the audio analysis that
//! drives the reactive transform, and the per-frame pipeline tying them
//! together. Capture devices and the drawing surface stay outside.

pub mod analysis;
pub mod config;
pub mod error;
pub mod filters;
pub mod frame;
pub mod mapping;
pub mod pipeline;

pub use analysis::{AnalysisEngine, AnalysisFrame, AnalysisSummary};
pub use config::{AnalysisConfig, AppConfig, FilterConfig, ReactiveConfig};
pub use error::{Result, VisualiserError};
pub use filters::{detect_edges, detect_edges_with_border, EdgeBorder, FilterKind, FilterSet};
pub use frame::FrameBuffer;
pub use mapping::{reactive_scale, FrameTransform, ReactiveTransform, RotationDirection};
pub use pipeline::{FramePipeline, RenderedFrame};
