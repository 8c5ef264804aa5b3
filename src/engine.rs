use crate::classifier;
use crate::config::EngineConfig;
use crate::error::Error;
use crate::heatmap::Heatmap;
use crate::history::MotionHistory;
use crate::track::Track;
use crate::velocity;

use ndarray::{Array3, ArrayView3};
use serde_derive::{Deserialize, Serialize};

/// Derived state after the most recent [`BehaviorEngine::process`] call.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct BehaviorSnapshot {
    pub occupancy: usize,
    // px per frame
    pub avg_velocity: f32,
    pub panic: bool,
}

/// Per-stream behaviour analytics: motion history, speed, panic decision
/// and the density heatmap.
///
/// Every call to `process` mutates the engine, feeding the same tracks twice
/// gives two different answers.
#[derive(Debug, Clone)]
pub struct BehaviorEngine {
    config: EngineConfig,
    history: MotionHistory,
    heatmap: Heatmap,
    snapshot: BehaviorSnapshot,
    frames_processed: u64,
}

impl BehaviorEngine {
    pub fn new(config: EngineConfig) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            history: MotionHistory::new(config.history_window),
            heatmap: Heatmap::from_config(&config),
            snapshot: BehaviorSnapshot::default(),
            frames_processed: 0,
            config,
        })
    }

    pub fn with_dims(width: usize, height: usize) -> Result<Self, Error> {
        Self::new(EngineConfig::new(width, height))
    }

    /// Consumes one frame of confirmed tracks and returns
    /// `(panic, avg_velocity)`.
    ///
    /// Tracks with a non-finite centroid still count towards occupancy but
    /// are kept out of the history and the heatmap.
    pub fn process(&mut self, tracks: &[Track], panic_threshold: f32) -> (bool, f32) {
        let frame = self.frames_processed;
        self.frames_processed += 1;

        self.heatmap.decay();

        let mut speeds = Vec::with_capacity(tracks.len());

        for track in tracks {
            let centroid = track.centroid();

            if !(centroid.x.is_finite() && centroid.y.is_finite()) {
                log::trace!(
                    "frame {}: track {} has degenerate box {:?}, skipped",
                    frame,
                    track.track_id,
                    track.bbox.as_slice()
                );
                continue;
            }

            let trail = self.history.record(track.track_id, centroid, frame);

            if let Some(speed) =
                velocity::instantaneous_speed(trail, self.config.min_history_points)
            {
                speeds.push(speed);
            }

            self.heatmap.deposit(centroid);
        }

        if let Some(horizon) = self.config.history_horizon {
            let evicted = self.history.evict_stale(frame, horizon);

            if evicted > 0 {
                log::debug!(
                    "frame {}: dropped {} identities unseen for more than {} frames",
                    frame,
                    evicted,
                    horizon
                );
            }
        }

        let decision = classifier::classify(&speeds, panic_threshold);

        if decision.panic != self.snapshot.panic {
            if decision.panic {
                log::info!(
                    "frame {}: panic raised, avg velocity {:.2} > {:.2}",
                    frame,
                    decision.avg_velocity,
                    panic_threshold
                );
            } else {
                log::info!(
                    "frame {}: panic cleared, avg velocity {:.2}",
                    frame,
                    decision.avg_velocity
                );
            }
        }

        self.snapshot = BehaviorSnapshot {
            occupancy: tracks.len(),
            avg_velocity: decision.avg_velocity,
            panic: decision.panic,
        };

        log::debug!(
            "frame {}: occupancy {}, samples {}, avg velocity {:.2}, panic {}",
            frame,
            self.snapshot.occupancy,
            speeds.len(),
            self.snapshot.avg_velocity,
            self.snapshot.panic
        );

        (decision.panic, decision.avg_velocity)
    }

    /// Heatmap blended over `frame`, see [`Heatmap::render_overlay`].
    #[inline]
    pub fn heatmap_overlay(&self, frame: ArrayView3<'_, u8>) -> Result<Array3<u8>, Error> {
        self.heatmap.render_overlay(frame)
    }

    #[inline]
    pub fn occupancy(&self) -> usize {
        self.snapshot.occupancy
    }

    #[inline]
    pub fn avg_velocity(&self) -> f32 {
        self.snapshot.avg_velocity
    }

    #[inline]
    pub fn is_panic(&self) -> bool {
        self.snapshot.panic
    }

    #[inline]
    pub fn snapshot(&self) -> BehaviorSnapshot {
        self.snapshot
    }

    #[inline]
    pub fn history(&self) -> &MotionHistory {
        &self.history
    }

    #[inline]
    pub fn heatmap(&self) -> &Heatmap {
        &self.heatmap
    }

    pub fn reset_heatmap(&mut self) {
        self.heatmap.reset();
    }

    #[inline]
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
