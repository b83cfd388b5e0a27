use std::borrow::Cow;

use crate::{
    mapping::{FrameTransform, ReactiveTransform, RotationDirection},
    AppConfig, FilterSet, FrameBuffer, Result,
};

/// A processed frame ready for display, together with its transform.
#[derive(Debug)]
pub struct RenderedFrame<'a> {
    pub image: Cow<'a, FrameBuffer>,
    pub transform: FrameTransform,
}

/// Per-frame processing: keyboard state, image filters and the
/// audio-reactive transform. The display surface itself lives outside the
/// crate; it feeds source frames in and draws what comes out.
#[derive(Debug, Default)]
pub struct FramePipeline {
    config: AppConfig,
    filters: FilterSet,
    transform: ReactiveTransform,
    last_transform: FrameTransform,
}

impl FramePipeline {
    /// Creates a pipeline after validating `config`.
    pub fn new(config: AppConfig) -> Result<Self> {
        config.validate()?;
        tracing::debug!(
            filters = ?config.filters,
            reactive = ?config.reactive,
            "frame pipeline configured"
        );
        Ok(Self {
            config,
            filters: FilterSet::new(),
            transform: ReactiveTransform::new(),
            last_transform: FrameTransform::default(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterSet {
        &mut self.filters
    }

    /// Routes a key press. Returns `true` when the key is bound.
    pub fn key_pressed(&mut self, key: char) -> bool {
        self.route_key(key, true)
    }

    /// Routes a key release. Returns `true` when the key is bound.
    pub fn key_released(&mut self, key: char) -> bool {
        self.route_key(key, false)
    }

    /// Processes one source frame at the given audio level.
    pub fn process<'a>(
        &mut self,
        source: &'a FrameBuffer,
        level: f32,
    ) -> Result<RenderedFrame<'a>> {
        let transform = self.transform.advance(level, &self.config.reactive);
        let image = self.filters.apply(source, &self.config.filters)?;
        self.last_transform = transform;

        tracing::trace!(
            width = source.width(),
            height = source.height(),
            scale = transform.scale,
            filtered = matches!(image, Cow::Owned(_)),
            "processed frame"
        );

        Ok(RenderedFrame { image, transform })
    }

    /// Clears held keys and rotation, as when playback stops.
    pub fn reset(&mut self) {
        self.filters.clear();
        self.transform.reset();
        self.last_transform = FrameTransform::default();
    }

    /// One-line status text: scale, rotation and active filters.
    pub fn status_line(&self) -> String {
        let mut status = format!(
            "scale: {:.2}x | rotation: {:.1}°",
            self.last_transform.scale,
            self.transform.rotation_degrees()
        );
        let labels = self.filters.labels();
        if !labels.is_empty() {
            status.push_str(" | ");
            status.push_str(&labels.join(" "));
        }
        status
    }

    fn route_key(&mut self, key: char, pressed: bool) -> bool {
        if let Some(direction) = RotationDirection::from_key(key) {
            self.transform.hold(direction, pressed);
            return true;
        }
        if pressed {
            self.filters.press(key)
        } else {
            self.filters.release(key)
        }
    }
}
