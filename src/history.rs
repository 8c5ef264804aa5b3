use crate::circular_queue::CircularQueue;
use crate::track::TrackId;
use nalgebra as na;
use std::collections::HashMap;

/// Recent centroids of one identity and the frame it was last seen in.
#[derive(Debug, Clone)]
pub struct Trail {
    points: CircularQueue<na::Point2<f32>>,
    last_seen: u64,
}

impl Trail {
    pub fn new(window: usize) -> Self {
        Self {
            points: CircularQueue::with_capacity(window),
            last_seen: 0,
        }
    }

    /// Appends `centroid`, dropping the oldest one once the window is full.
    pub fn push(&mut self, centroid: na::Point2<f32>, frame: u64) {
        self.points.push(centroid);
        self.last_seen = frame;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn latest(&self) -> Option<&na::Point2<f32>> {
        self.points.latest()
    }

    /// The centroid recorded just before the latest one.
    #[inline]
    pub fn previous(&self) -> Option<&na::Point2<f32>> {
        self.points.previous()
    }
}

/// Per-identity window of the most recent centroids.
#[derive(Debug, Clone)]
pub struct MotionHistory {
    window: usize,
    trails: HashMap<TrackId, Trail>,
}

impl MotionHistory {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            trails: HashMap::with_capacity(64),
        }
    }

    /// Appends `centroid` to the trail of `id`, allocating the trail on first
    /// sight. `frame` stamps the identity as seen.
    pub fn record(&mut self, id: TrackId, centroid: na::Point2<f32>, frame: u64) -> &Trail {
        let window = self.window;
        let trail = self.trails.entry(id).or_insert_with(|| Trail::new(window));
        trail.push(centroid, frame);

        trail
    }

    /// Oldest to newest, empty for an identity never observed.
    pub fn history_of(&self, id: TrackId) -> Vec<na::Point2<f32>> {
        self.trails
            .get(&id)
            .map(|t| t.points.asc_iter().copied().collect())
            .unwrap_or_default()
    }

    #[inline]
    pub fn contains(&self, id: TrackId) -> bool {
        self.trails.contains_key(&id)
    }

    #[inline]
    pub fn forget(&mut self, id: TrackId) -> bool {
        self.trails.remove(&id).is_some()
    }

    /// Drops every identity not seen for more than `horizon` frames before
    /// `now`. Returns how many were dropped.
    pub fn evict_stale(&mut self, now: u64, horizon: u64) -> usize {
        let before = self.trails.len();

        self.trails
            .retain(|_, t| now.saturating_sub(t.last_seen) <= horizon);

        before - self.trails.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.trails.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }
}
