use crate::history::Trail;
use nalgebra as na;

/// Fewest centroids an identity needs before it yields a speed sample.
pub const MIN_HISTORY_POINTS: usize = 3;

/// Instantaneous speed in pixels per frame: the distance covered by the last
/// step only, so a sudden burst shows up in the very frame it happens.
///
/// Returns `None` while the trail is shorter than `min_points`.
pub fn instantaneous_speed(trail: &Trail, min_points: usize) -> Option<f32> {
    if trail.len() < min_points {
        return None;
    }

    let curr = trail.latest()?;
    let prev = trail.previous()?;

    Some(na::distance(prev, curr))
}
