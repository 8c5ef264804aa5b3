use crate::bbox::{BBox, Ltrb};
use crate::error::Error;
use crate::track::{Track, TrackId};
use serde_derive::Deserialize;

/// All confirmed tracks observed in one video frame.
pub struct Frame {
    pub index: u64,
    pub tracks: Vec<Track>,
}

#[derive(Deserialize)]
struct TrackRecord {
    id: TrackId,
    ltrb: BBox<Ltrb>,
    #[serde(default = "confirmed_by_default")]
    confirmed: bool,
}

fn confirmed_by_default() -> bool {
    true
}

impl Frame {
    #[inline]
    pub fn new(index: u64, tracks: Vec<Track>) -> Self {
        Self { index, tracks }
    }

    /// Parses one line of a track dump, `<frame index>:<json array>`, where
    /// each element is `{"id": u64, "ltrb": [l, t, r, b], "confirmed": bool}`.
    /// Unconfirmed tracks are dropped, `confirmed` defaults to `true`.
    pub fn parse_line(line: &str) -> Result<Self, Error> {
        let idx = line
            .find(':')
            .ok_or_else(|| Error::Parse("wrong file format: expected `:`".into()))?;

        let (index, vector) = line.split_at(idx);
        let index = index
            .trim()
            .parse::<u64>()
            .map_err(|e| Error::Parse(format!("wrong file format: frame index: {}", e)))?;

        let records: Vec<TrackRecord> = serde_json::from_str(&vector[1..])?;
        let tracks = records
            .into_iter()
            .filter(|r| r.confirmed)
            .map(|r| Track::new(r.id, r.ltrb))
            .collect();

        Ok(Self::new(index, tracks))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
