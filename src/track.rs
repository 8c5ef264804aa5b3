use crate::bbox::{BBox, Ltrb};
use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

pub type TrackId = u64;

/// A confirmed track handed over by the upstream tracker for one frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Track {
    #[serde(rename = "id")]
    pub track_id: TrackId,

    // in px, frame space
    #[serde(rename = "ltrb")]
    pub bbox: BBox<Ltrb>,
}

impl Track {
    #[inline]
    pub fn new(track_id: TrackId, bbox: BBox<Ltrb>) -> Self {
        Self { track_id, bbox }
    }

    #[inline]
    pub fn centroid(&self) -> na::Point2<f32> {
        self.bbox.centroid()
    }
}
