use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::{config::FilterConfig, FrameBuffer, Result};

pub mod color;
pub mod edges;

pub use edges::{detect_edges, detect_edges_with_border, EdgeBorder};

/// The image filters that can be toggled on a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Threshold,
    Invert,
    Posterize,
    Edges,
}

impl FilterKind {
    /// Every filter, in the order they are applied to a frame.
    pub const ALL: [FilterKind; 4] = [
        FilterKind::Threshold,
        FilterKind::Invert,
        FilterKind::Posterize,
        FilterKind::Edges,
    ];

    /// Maps a number key to its filter.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            '1' => Some(FilterKind::Threshold),
            '2' => Some(FilterKind::Invert),
            '3' => Some(FilterKind::Posterize),
            '4' => Some(FilterKind::Edges),
            _ => None,
        }
    }

    pub fn key(self) -> char {
        match self {
            FilterKind::Threshold => '1',
            FilterKind::Invert => '2',
            FilterKind::Posterize => '3',
            FilterKind::Edges => '4',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterKind::Threshold => "threshold",
            FilterKind::Invert => "invert",
            FilterKind::Posterize => "posterize",
            FilterKind::Edges => "edges",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Applies this filter to `frame` in place.
    pub fn apply(self, frame: &mut FrameBuffer, config: &FilterConfig) -> Result<()> {
        match self {
            FilterKind::Threshold => color::threshold(frame.as_raw_mut(), config.threshold_level),
            FilterKind::Invert => {
                color::invert(frame.as_raw_mut());
                Ok(())
            }
            FilterKind::Posterize => color::posterize(frame.as_raw_mut(), config.posterize_levels),
            FilterKind::Edges => {
                frame.detect_edges(config.edge_border);
                Ok(())
            }
        }
    }
}

/// Set of filters currently held down. Several filters can be active at
/// once; they always run in [`FilterKind::ALL`] order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterSet {
    active: [bool; 4],
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables the filter bound to `key`. Returns `false` for unbound keys.
    pub fn press(&mut self, key: char) -> bool {
        self.set_key(key, true)
    }

    /// Disables the filter bound to `key`. Returns `false` for unbound keys.
    pub fn release(&mut self, key: char) -> bool {
        self.set_key(key, false)
    }

    pub fn set(&mut self, kind: FilterKind, enabled: bool) {
        if self.active[kind.index()] != enabled {
            tracing::debug!(filter = kind.label(), enabled, "filter toggled");
        }
        self.active[kind.index()] = enabled;
    }

    pub fn is_active(&self, kind: FilterKind) -> bool {
        self.active[kind.index()]
    }

    pub fn any_active(&self) -> bool {
        self.active.iter().any(|&on| on)
    }

    pub fn clear(&mut self) {
        self.active = [false; 4];
    }

    /// Active filters in application order.
    pub fn active(&self) -> impl Iterator<Item = FilterKind> + '_ {
        FilterKind::ALL
            .into_iter()
            .filter(move |kind| self.is_active(*kind))
    }

    /// Human readable `[key] label` entries for the active filters.
    pub fn labels(&self) -> Vec<String> {
        self.active()
            .map(|kind| format!("[{}] {}", kind.key(), kind.label()))
            .collect()
    }

    /// Runs the active filters over `source`.
    ///
    /// The source is borrowed back untouched when nothing is active;
    /// otherwise a copy is filtered so the source frame stays intact.
    pub fn apply<'a>(
        &self,
        source: &'a FrameBuffer,
        config: &FilterConfig,
    ) -> Result<Cow<'a, FrameBuffer>> {
        if !self.any_active() {
            return Ok(Cow::Borrowed(source));
        }

        let mut frame = source.clone();
        for kind in self.active() {
            tracing::trace!(filter = kind.label(), "applying filter");
            kind.apply(&mut frame, config)?;
        }
        Ok(Cow::Owned(frame))
    }

    fn set_key(&mut self, key: char, enabled: bool) -> bool {
        match FilterKind::from_key(key) {
            Some(kind) => {
                self.set(kind, enabled);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_toggle_filters() {
        let mut set = FilterSet::new();
        assert!(set.press('4'));
        assert!(set.press('2'));
        assert!(!set.press('x'));

        let active: Vec<_> = set.active().collect();
        assert_eq!(active, vec![FilterKind::Invert, FilterKind::Edges]);
        assert_eq!(set.labels(), vec!["[2] invert", "[4] edges"]);

        assert!(set.release('2'));
        assert!(!set.is_active(FilterKind::Invert));
        assert!(set.is_active(FilterKind::Edges));
    }

    #[test]
    fn inactive_set_borrows_source() {
        let frame = FrameBuffer::solid(4, 4, [1, 2, 3, 4]);
        let set = FilterSet::new();
        let out = set.apply(&frame, &FilterConfig::default()).unwrap();
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn filters_run_in_fixed_order() {
        // Threshold then invert: a dark pixel becomes black, then white.
        let frame = FrameBuffer::solid(3, 3, [10, 10, 10, 200]);
        let mut set = FilterSet::new();
        set.press('2');
        set.press('1');

        let out = set.apply(&frame, &FilterConfig::default()).unwrap();
        assert_eq!(out.pixel(1, 1), Some([255, 255, 255, 200]));
        assert_eq!(frame.pixel(1, 1), Some([10, 10, 10, 200]));
    }

    #[test]
    fn invalid_config_surfaces_as_error() {
        let frame = FrameBuffer::solid(3, 3, [10, 10, 10, 255]);
        let mut set = FilterSet::new();
        set.set(FilterKind::Posterize, true);
        let config = FilterConfig {
            posterize_levels: 0,
            ..FilterConfig::default()
        };
        assert!(set.apply(&frame, &config).is_err());
    }
}
