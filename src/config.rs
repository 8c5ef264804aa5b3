use crate::error::Error;
use crate::heatmap::{Normalization, Splash};
use crate::velocity::MIN_HISTORY_POINTS;
use serde_derive::{Deserialize, Serialize};
use std::path::Path;

/// Construction-time settings of a [`crate::engine::BehaviorEngine`].
///
/// Every field has a default, so a JSON document only needs the keys it
/// wants to change.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Frame width in pixels, the heatmap has one cell per pixel.
    #[serde(default = "default_width")]
    pub width: usize,

    #[serde(default = "default_height")]
    pub height: usize,

    /// Centroids kept per identity.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Centroids an identity needs before it contributes a speed sample.
    #[serde(default = "default_min_history_points")]
    pub min_history_points: usize,

    /// Frames an identity may stay unseen before its history is dropped.
    /// `None` keeps every identity for the engine's lifetime.
    #[serde(default = "default_history_horizon")]
    pub history_horizon: Option<u64>,

    /// Radius of the deposit disc in pixels.
    #[serde(default = "default_heat_radius")]
    pub heat_radius: f32,

    #[serde(default = "default_heat_increment")]
    pub heat_increment: f32,

    #[serde(default)]
    pub splash: Splash,

    /// Multiplier applied to the whole field once per processed frame.
    /// `1.0` accumulates forever.
    #[serde(default = "default_heat_decay")]
    pub heat_decay: f32,

    #[serde(default)]
    pub normalization: Normalization,

    /// Weight of the original frame in the overlay, heat gets the rest.
    #[serde(default = "default_frame_weight")]
    pub frame_weight: f32,

    /// Threshold used by drivers that do not pick their own.
    #[serde(default = "default_panic_threshold")]
    pub panic_threshold: f32,
}

fn default_width() -> usize {
    640
}

fn default_height() -> usize {
    480
}

fn default_history_window() -> usize {
    10
}

fn default_min_history_points() -> usize {
    MIN_HISTORY_POINTS
}

fn default_history_horizon() -> Option<u64> {
    // same as the upstream tracker's max_age
    Some(30)
}

fn default_heat_radius() -> f32 {
    15.0
}

fn default_heat_increment() -> f32 {
    0.5
}

fn default_heat_decay() -> f32 {
    1.0
}

fn default_frame_weight() -> f32 {
    0.6
}

fn default_panic_threshold() -> f32 {
    20.0
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            history_window: default_history_window(),
            min_history_points: default_min_history_points(),
            history_horizon: default_history_horizon(),
            heat_radius: default_heat_radius(),
            heat_increment: default_heat_increment(),
            splash: Splash::default(),
            heat_decay: default_heat_decay(),
            normalization: Normalization::default(),
            frame_weight: default_frame_weight(),
            panic_threshold: default_panic_threshold(),
        }
    }
}

impl EngineConfig {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn from_json(src: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(src)?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let src = std::fs::read_to_string(path)?;

        Self::from_json(&src)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |msg: String| Err(Error::InvalidConfig(msg));

        if self.width == 0 || self.height == 0 {
            return invalid(format!(
                "frame dimensions must be non-zero, got {}x{}",
                self.width, self.height
            ));
        }

        if self.history_window == 0 {
            return invalid("history_window must be at least 1".into());
        }

        if self.min_history_points < 2 {
            return invalid(format!(
                "min_history_points must be at least 2, got {}",
                self.min_history_points
            ));
        }

        if self.history_window < self.min_history_points {
            return invalid(format!(
                "history_window {} cannot hold min_history_points {}",
                self.history_window, self.min_history_points
            ));
        }

        if !(self.heat_radius.is_finite() && self.heat_radius > 0.0) {
            return invalid(format!("heat_radius must be positive, got {}", self.heat_radius));
        }

        if !(self.heat_increment.is_finite() && self.heat_increment > 0.0) {
            return invalid(format!(
                "heat_increment must be positive, got {}",
                self.heat_increment
            ));
        }

        if !(self.heat_decay > 0.0 && self.heat_decay <= 1.0) {
            return invalid(format!("heat_decay must be in (0, 1], got {}", self.heat_decay));
        }

        if !(0.0..=1.0).contains(&self.frame_weight) {
            return invalid(format!(
                "frame_weight must be in [0, 1], got {}",
                self.frame_weight
            ));
        }

        if let Splash::Gaussian { sigma } = self.splash {
            if !(sigma.is_finite() && sigma > 0.0) {
                return invalid(format!("gaussian sigma must be positive, got {}", sigma));
            }
        }

        if let Normalization::Fixed { ceiling } = self.normalization {
            if !(ceiling.is_finite() && ceiling > 0.0) {
                return invalid(format!("fixed ceiling must be positive, got {}", ceiling));
            }
        }

        Ok(())
    }
}
