//! Great-circle distance and nearest-candidate resolution.
//!
//! Everything here is pure and infallible. Distances are in metres on a
//! spherical Earth of radius [`EARTH_RADIUS_M`], which is plenty for the
//! venue-scale radii this crate deals with.
//!
//! ```rust
//! use locus::geo::{Coordinate, nearest_index};
//!
//! let venues = [Coordinate::new(6.5, 3.3), Coordinate::new(6.6, 3.4)];
//! let here = Coordinate::new(6.51, 3.31);
//! assert_eq!(nearest_index(here, &venues), Some(0));
//! ```

use itertools::Itertools;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    /// Latitude in decimal degrees (-90 to 90)
    pub lat: f64,
    /// Longitude in decimal degrees (-180 to 180)
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Haversine distance to `other`, in metres.
    pub fn distance_to(&self, other: &Self) -> f64 {
        distance(*self, *other)
    }
}

/// Anything that sits at a single coordinate and can be ranked by distance.
pub trait Located {
    fn coordinate(&self) -> Coordinate;
}

impl Located for Coordinate {
    fn coordinate(&self) -> Coordinate {
        *self
    }
}

impl<T: Located> Located for &T {
    fn coordinate(&self) -> Coordinate {
        (*self).coordinate()
    }
}

/// A selectable venue (cinema, restaurant branch, hotel) with a stable identifier.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub coordinate: Coordinate,
}

impl Venue {
    pub fn new(id: impl Into<String>, name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            coordinate,
        }
    }
}

impl Located for Venue {
    fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
}

/// Great-circle separation of `a` and `b` in metres, using the haversine formula.
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_phi = (b.lat - a.lat).to_radians();
    let delta_lambda = (b.lng - a.lng).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Index of the candidate closest to `origin`.
///
/// Returns `None` when `candidates` is empty. When two candidates are equally
/// close the earlier one wins.
pub fn nearest_index(origin: Coordinate, candidates: &[Coordinate]) -> Option<usize> {
    nearest(origin, candidates).map(|(idx, _)| idx)
}

/// Like [`nearest_index`], for any [`Located`] candidate type, also handing back the winner.
pub fn nearest<T: Located>(origin: Coordinate, candidates: &[T]) -> Option<(usize, &T)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in candidates.iter().enumerate() {
        let d = distance(origin, candidate.coordinate());
        // strict comparison keeps the first of equal minima
        if best.is_none_or(|(_, min)| d < min) {
            best = Some((idx, d));
        }
    }
    best.map(|(idx, _)| (idx, &candidates[idx]))
}

/// Candidate indices ordered nearest first, paired with their distance in metres.
///
/// Equal distances keep their input order.
pub fn by_distance<T: Located>(origin: Coordinate, candidates: &[T]) -> Vec<(usize, f64)> {
    candidates
        .iter()
        .enumerate()
        .map(|(idx, c)| (idx, distance(origin, c.coordinate())))
        .sorted_by(|a, b| a.1.total_cmp(&b.1))
        .collect()
}

/// Indices of the candidates no further than `radius_m` metres from `origin`, in input order.
pub fn within<T: Located>(origin: Coordinate, candidates: &[T], radius_m: f64) -> Vec<usize> {
    candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| distance(origin, c.coordinate()) <= radius_m)
        .map(|(idx, _)| idx)
        .collect()
}
