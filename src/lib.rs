pub mod bbox;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod frame;
pub mod heatmap;
pub mod history;
pub mod math;
pub mod velocity;

mod circular_queue;
mod track;

pub use config::EngineConfig;
pub use engine::{BehaviorEngine, BehaviorSnapshot};
pub use frame::Frame;
pub use track::{Track, TrackId};

use error::Error;
use ndarray::{Array3, ArrayView3};
use std::collections::HashMap;

/// Behaviour analytics over any number of named video sources.
pub trait Analytics {
    fn update(&mut self, frames: &[Frame], src: &str, panic_threshold: f32) -> Result<(), Error>;
    fn snapshot(&self, src: &str) -> Option<BehaviorSnapshot>;
    fn heatmap_overlay(&self, src: &str, frame: ArrayView3<'_, u8>) -> Result<Array3<u8>, Error>;
}

/// Keeps one independent [`BehaviorEngine`] per source, created on the
/// first frame seen from that source.
pub struct CrowdMonitor {
    config: EngineConfig,
    engines: HashMap<String, BehaviorEngine>,
}

impl CrowdMonitor {
    pub fn new(config: EngineConfig) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            config,
            engines: HashMap::new(),
        })
    }

    #[inline]
    pub fn engine(&self, src: &str) -> Option<&BehaviorEngine> {
        self.engines.get(src)
    }

    /// Drops the state of a finished source.
    pub fn remove(&mut self, src: &str) -> Option<BehaviorEngine> {
        self.engines.remove(src)
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.engines.keys().map(String::as_str)
    }
}

impl Default for CrowdMonitor {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            engines: HashMap::new(),
        }
    }
}

impl crate::Analytics for CrowdMonitor {
    fn update(&mut self, frames: &[Frame], src: &str, panic_threshold: f32) -> Result<(), Error> {
        for frame in frames {
            let engine = if let Some(engine) = self.engines.get_mut(src) {
                engine
            } else {
                log::debug!("new source {}", src);

                let engine = BehaviorEngine::new(self.config.clone())?;
                self.engines.entry(src.to_string()).or_insert(engine)
            };

            engine.process(&frame.tracks, panic_threshold);
        }

        Ok(())
    }

    #[inline]
    fn snapshot(&self, src: &str) -> Option<BehaviorSnapshot> {
        self.engines.get(src).map(BehaviorEngine::snapshot)
    }

    fn heatmap_overlay(&self, src: &str, frame: ArrayView3<'_, u8>) -> Result<Array3<u8>, Error> {
        self.engines
            .get(src)
            .ok_or_else(|| Error::UnknownSource(src.to_string()))?
            .heatmap_overlay(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;

    fn frame(index: u64, id: TrackId, cy: f32) -> Frame {
        Frame::new(
            index,
            vec![Track::new(id, BBox::ltrb(100.0, cy - 20.0, 120.0, cy + 20.0))],
        )
    }

    #[test]
    fn sources_are_independent() {
        let mut monitor = CrowdMonitor::default();

        let fast = [frame(0, 1, 100.0), frame(1, 1, 130.0), frame(2, 1, 160.0)];
        let slow = [frame(0, 1, 100.0), frame(1, 1, 101.0), frame(2, 1, 102.0)];

        monitor.update(&fast, "north", 10.0).unwrap();
        monitor.update(&slow, "south", 10.0).unwrap();

        assert!(monitor.snapshot("north").unwrap().panic);
        assert!(!monitor.snapshot("south").unwrap().panic);
        assert!(monitor.snapshot("east").is_none());

        let mut sources: Vec<_> = monitor.sources().collect();
        sources.sort();
        assert_eq!(sources, vec!["north", "south"]);
    }

    #[test]
    fn overlay_for_unknown_source() {
        let monitor = CrowdMonitor::default();
        let img = Array3::<u8>::zeros((480, 640, 3));

        assert!(matches!(
            monitor.heatmap_overlay("nowhere", img.view()),
            Err(Error::UnknownSource(_))
        ));
    }

    #[test]
    fn removed_source_starts_over() {
        let mut monitor = CrowdMonitor::default();

        monitor.update(&[frame(0, 1, 100.0)], "cam", 10.0).unwrap();
        assert!(monitor.remove("cam").is_some());
        assert!(monitor.engine("cam").is_none());

        monitor.update(&[frame(1, 1, 100.0)], "cam", 10.0).unwrap();
        assert_eq!(monitor.engine("cam").unwrap().frames_processed(), 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(CrowdMonitor::new(EngineConfig::new(0, 10)).is_err());
    }
}
