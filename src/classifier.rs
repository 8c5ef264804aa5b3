use crate::math;
use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct PanicDecision {
    pub panic: bool,
    // px per frame
    pub avg_velocity: f32,
}

/// Crowd-level decision for one frame. Panic needs the mean speed to be
/// strictly above `threshold`; no samples means a calm frame.
///
/// Nothing is remembered between calls, so the result can flip every frame
/// around the threshold. Wrap with [`PanicDebounce`] to smooth it.
pub fn classify(speeds: &[f32], threshold: f32) -> PanicDecision {
    match math::mean(speeds) {
        Some(avg_velocity) => PanicDecision {
            panic: avg_velocity > threshold,
            avg_velocity,
        },
        None => PanicDecision::default(),
    }
}

/// Holds off a panic alert until it has been raised for `required`
/// consecutive frames, and drops it on the first calm frame.
#[derive(Debug, Clone)]
pub struct PanicDebounce {
    required: u32,
    streak: u32,
}

impl PanicDebounce {
    pub fn new(required: u32) -> Self {
        Self {
            required: required.max(1),
            streak: 0,
        }
    }

    pub fn update(&mut self, raw_panic: bool) -> bool {
        if raw_panic {
            self.streak = self.streak.saturating_add(1);
        } else {
            self.streak = 0;
        }

        self.is_active()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.streak >= self.required
    }

    #[inline]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn reset(&mut self) {
        self.streak = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn no_samples_is_calm() {
        assert_eq!(classify(&[], 0.0), PanicDecision { panic: false, avg_velocity: 0.0 });
        assert!(!classify(&[], -1.0).panic);
    }

    #[test]
    fn threshold_is_strict() {
        assert!(!classify(&[10.0, 20.0], 15.0).panic);
        assert!(classify(&[11.0, 21.0], 15.0).panic);
    }

    #[test]
    fn average_of_samples() {
        let d = classify(&[1.0, 2.0, 6.0], 100.0);

        assert_abs_diff_eq!(d.avg_velocity, 3.0);
        assert!(!d.panic);
    }

    #[test]
    fn debounce_needs_consecutive_frames() {
        let mut debounce = PanicDebounce::new(3);

        assert!(!debounce.update(true));
        assert!(!debounce.update(true));
        assert!(!debounce.update(false));
        assert!(!debounce.update(true));
        assert!(!debounce.update(true));
        assert!(debounce.update(true));
        assert!(debounce.update(true));
        assert!(!debounce.update(false));
        assert_eq!(debounce.streak(), 0);
    }

    #[test]
    fn debounce_of_one_passes_through() {
        let mut debounce = PanicDebounce::new(0);

        assert!(debounce.update(true));
        assert!(!debounce.update(false));
    }
}
