//! Nearest-point search over a sequence sorted by latitude, then longitude.
//!
//! The search binary-searches for the first point not less than the query,
//! then scans outward in both directions. Latitude is the primary sort key,
//! so each direction stops as soon as the latitude gap alone exceeds the
//! best distance found so far. Longitude is only a secondary key, so points
//! are filtered through a longitude corridor around the query whose width
//! shrinks every time the best distance improves. Only points that survive
//! both tests are measured.
//!
//! The distance metric and the seeding policy are supplied by a
//! [`SearchStrategy`]: [`Exact`] (great-circle distance) or [`Approximate`]
//! (planar distance scaled at the query latitude).
//!
//! ```rust
//! use geosort::{nearest, Exact, Point};
//!
//! let points = vec![
//!     Point::new(10.0, -120.0),
//!     Point::new(10.0, -119.0),
//!     Point::new(11.0, -120.5),
//! ];
//! let hit = nearest(&points, &Point::new(10.0, -119.9), 50.0, &Exact)?
//!     .expect("a point within 50 km");
//! assert_eq!(hit.index, 0);
//! # Ok::<(), geosort::GeoError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{GeoError, GeoResult};
use crate::geo_math::{self, KM_PER_DEGREE_LATITUDE, MAX_LOOKUP_LATITUDE};
use crate::point::{GeoFloat, Point};
use crate::points::{lower_bound, GeoPoints};

/// Added to the radius so a candidate exactly at the radius is still found.
pub const SEED_EPSILON_KM: f64 = 0.0001;

/// Result of a successful search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Index of the winning record in the searched sequence.
    pub index: usize,
    /// Distance from the query, in kilometers, under the strategy's metric.
    pub distance_km: f64,
}

/// How the running best distance is initialised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Seed {
    /// Only candidates strictly closer than this many kilometers count.
    Bound(f64),
    /// The first binary-search hit is accepted whatever its distance.
    FirstHit,
}

/// Whether the caller's radius limits the approximate search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RadiusCutoff {
    /// Nothing farther than the radius is ever returned.
    #[default]
    Hard,
    /// The first binary-search hit seeds the search regardless of the
    /// radius, so a result is returned whenever the sequence has a point at
    /// or after the query.
    Advisory,
}

/// Distance metric plus seeding policy for [`nearest`].
pub trait SearchStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Kilometers per degree of longitude at the query latitude. Sizes the
    /// corridor and is handed back to [`SearchStrategy::distance`].
    fn lon_km_per_degree(&self, query_lat: f64) -> GeoResult<f64>;

    /// Distance in kilometers from `query` to `candidate`.
    fn distance(&self, query: &Point<f64>, candidate: &Point<f64>, lon_km_per_degree: f64) -> f64;

    fn seed(&self, radius_km: f64) -> Seed;

    fn should_record(&self, candidate_km: f64, best_km: f64) -> bool {
        candidate_km < best_km
    }
}

/// Great-circle distance; only points within the radius are returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct Exact;

impl SearchStrategy for Exact {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn lon_km_per_degree(&self, query_lat: f64) -> GeoResult<f64> {
        Ok(geo_math::lon_kilos(query_lat))
    }

    #[inline]
    fn distance(&self, query: &Point<f64>, candidate: &Point<f64>, _lon_km_per_degree: f64) -> f64 {
        geo_math::exact_distance(query.lat, query.lon, candidate.lat, candidate.lon)
    }

    fn seed(&self, radius_km: f64) -> Seed {
        Seed::Bound(radius_km + SEED_EPSILON_KM)
    }
}

/// Planar distance with the longitude scale looked up once at the query
/// latitude. Meant for radii of a few tens of kilometers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Approximate {
    pub cutoff: RadiusCutoff,
}

impl Approximate {
    pub fn new(cutoff: RadiusCutoff) -> Self {
        Approximate { cutoff }
    }
}

impl SearchStrategy for Approximate {
    fn name(&self) -> &'static str {
        match self.cutoff {
            RadiusCutoff::Hard => "approximate",
            RadiusCutoff::Advisory => "approximate-advisory",
        }
    }

    fn lon_km_per_degree(&self, query_lat: f64) -> GeoResult<f64> {
        geo_math::lookup_lon_km_per_lat(query_lat)
    }

    #[inline]
    fn distance(&self, query: &Point<f64>, candidate: &Point<f64>, lon_km_per_degree: f64) -> f64 {
        geo_math::planar_distance(
            candidate.lat - query.lat,
            candidate.lon - query.lon,
            lon_km_per_degree,
        )
    }

    fn seed(&self, radius_km: f64) -> Seed {
        match self.cutoff {
            RadiusCutoff::Hard => Seed::Bound(radius_km + SEED_EPSILON_KM),
            RadiusCutoff::Advisory => Seed::FirstHit,
        }
    }
}

/// Longitude window `[lon - delta, lon + delta]` around the query.
struct Corridor {
    center: f64,
    lon_km_per_degree: f64,
    delta: f64,
}

impl Corridor {
    fn new(center: f64, best_km: f64, lon_km_per_degree: f64) -> Self {
        Corridor {
            center,
            lon_km_per_degree,
            delta: best_km / lon_km_per_degree,
        }
    }

    fn narrow(&mut self, best_km: f64) {
        self.delta = best_km / self.lon_km_per_degree;
    }

    #[inline]
    fn excludes(&self, lon: f64) -> bool {
        lon < self.center - self.delta || lon > self.center + self.delta
    }
}

/// Finds the point closest to `query` within `radius_km`.
///
/// Returns `Ok(None)` when the sequence is empty, when no point is at or
/// after the query in point order, or when nothing beats the seed. With a
/// [`Seed::Bound`] strategy a radius that is not strictly positive finds
/// nothing.
///
/// The sequence must be sorted under the point order; results on unsorted
/// input are meaningless.
pub fn nearest<T, G, S>(
    points: &G,
    query: &Point<T>,
    radius_km: f64,
    strategy: &S,
) -> GeoResult<Option<Neighbor>>
where
    T: GeoFloat,
    G: GeoPoints<T> + ?Sized,
    S: SearchStrategy + ?Sized,
{
    let len = points.len();
    if len == 0 {
        return Ok(None);
    }

    let q = query.widen();
    if !q.lat.is_finite() || q.lat.abs() > MAX_LOOKUP_LATITUDE {
        return Err(GeoError::LatitudeOutOfRange(q.lat));
    }

    let seed = strategy.seed(radius_km);
    if matches!(seed, Seed::Bound(_)) && !(radius_km > 0.0) {
        log::debug!("{} search with radius {} finds nothing", strategy.name(), radius_km);
        return Ok(None);
    }

    let x = lower_bound(points, query)?;
    if x == len {
        log::debug!("no point at or after {} in {} records", query, len);
        return Ok(None);
    }

    let lon_km = strategy.lon_km_per_degree(q.lat)?;

    let first = points.point_at(x)?.widen();
    let first_km = strategy.distance(&q, &first, lon_km);
    let (mut best_index, mut best_km) = match seed {
        Seed::Bound(bound) if strategy.should_record(first_km, bound) => (Some(x), first_km),
        Seed::Bound(bound) => (None, bound),
        Seed::FirstHit => (Some(x), first_km),
    };
    log::debug!(
        "first hit for {}: {} -- {}/{} ({:.4} km)",
        query,
        first,
        x,
        len,
        first_km
    );

    let mut corridor = Corridor::new(q.lon, best_km, lon_km);
    let mut examined = 1usize;

    // the first hit is at or past the query, so look behind it first
    // index 0 is part of the walk; the first record must stay reachable
    let mut min_lat = q.lat - best_km / KM_PER_DEGREE_LATITUDE;
    for i in (0..x).rev() {
        examined += 1;
        let candidate = points.point_at(i)?.widen();
        if candidate.lat < min_lat {
            break;
        }
        if corridor.excludes(candidate.lon) {
            continue;
        }
        let dist = strategy.distance(&q, &candidate, lon_km);
        if strategy.should_record(dist, best_km) {
            best_km = dist;
            best_index = Some(i);
            min_lat = q.lat - best_km / KM_PER_DEGREE_LATITUDE;
            corridor.narrow(best_km);
            log::trace!("closer below at {}: {} ({:.4} km)", i, candidate, dist);
        }
    }

    let mut max_lat = q.lat + best_km / KM_PER_DEGREE_LATITUDE;
    for i in (x + 1)..len {
        examined += 1;
        let candidate = points.point_at(i)?.widen();
        if candidate.lat > max_lat {
            break;
        }
        if corridor.excludes(candidate.lon) {
            continue;
        }
        let dist = strategy.distance(&q, &candidate, lon_km);
        if strategy.should_record(dist, best_km) {
            best_km = dist;
            best_index = Some(i);
            max_lat = q.lat + best_km / KM_PER_DEGREE_LATITUDE;
            corridor.narrow(best_km);
            log::trace!("closer above at {}: {} ({:.4} km)", i, candidate, dist);
        }
    }
    log::debug!(
        "{} search examined {} of {} records",
        strategy.name(),
        examined,
        len
    );

    Ok(best_index.map(|index| Neighbor {
        index,
        distance_km: best_km,
    }))
}

/// [`nearest`] with great-circle distances.
pub fn nearest_exact<T, G>(points: &G, query: &Point<T>, radius_km: f64) -> GeoResult<Option<Neighbor>>
where
    T: GeoFloat,
    G: GeoPoints<T> + ?Sized,
{
    nearest(points, query, radius_km, &Exact)
}

/// [`nearest`] with planar distances and a hard radius cutoff.
pub fn nearest_approximate<T, G>(
    points: &G,
    query: &Point<T>,
    radius_km: f64,
) -> GeoResult<Option<Neighbor>>
where
    T: GeoFloat,
    G: GeoPoints<T> + ?Sized,
{
    nearest(points, query, radius_km, &Approximate::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_math::{exact_distance, lookup_lon_km_per_lat, planar_distance};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::cell::Cell;

    fn scenario() -> Vec<Point<f64>> {
        vec![
            Point::new(10.0, -120.0),
            Point::new(10.0, -119.0),
            Point::new(11.0, -120.5),
            Point::new(12.0, -119.8),
        ]
    }

    /// Counts how many records a search touches.
    struct Counting<'a> {
        inner: &'a [Point<f64>],
        reads: Cell<usize>,
    }

    impl GeoPoints<f64> for Counting<'_> {
        fn len(&self) -> usize {
            self.inner.len()
        }

        fn point_at(&self, index: usize) -> GeoResult<Point<f64>> {
            self.reads.set(self.reads.get() + 1);
            GeoPoints::point_at(self.inner, index)
        }
    }

    fn random_sorted(rng: &mut StdRng, n: usize) -> Vec<Point<f64>> {
        let mut pts: Vec<Point<f64>> = (0..n)
            .map(|_| Point::new(rng.gen_range(30.0..40.0), rng.gen_range(-100.0..-90.0)))
            .collect();
        // keeps every query below the last point so the seed never falls off the end
        pts.push(Point::new(89.0, 0.0));
        pts.sort_by(|a, b| a.partial_cmp(b).unwrap());
        pts
    }

    #[test]
    fn test_empty_sequence_not_found() {
        let pts: Vec<Point<f64>> = Vec::new();
        let q = Point::new(10.0, 10.0);
        assert_eq!(nearest_exact(&pts, &q, 50.0).unwrap(), None);
        assert_eq!(nearest_approximate(&pts, &q, 50.0).unwrap(), None);
        let advisory = Approximate::new(RadiusCutoff::Advisory);
        assert_eq!(nearest(&pts, &q, 50.0, &advisory).unwrap(), None);
    }

    #[test]
    fn test_scenario_finds_closer_point_behind_seed() {
        let pts = scenario();
        let q = Point::new(10.0, -119.9);
        let hit = nearest_exact(&pts, &q, 50.0).unwrap().unwrap();

        // 0.1 degree of longitude at 10N is about 10.95 km; (10, -119) is ~98.6 km away
        let expected = exact_distance(10.0, -119.9, 10.0, -120.0);
        assert!((expected - 10.95).abs() < 0.01);
        assert_eq!(hit.index, 0);
        assert!((hit.distance_km - expected).abs() < 1e-9);
    }

    #[test]
    fn test_scenario_seed_point_wins_when_alone_in_range() {
        let pts = vec![
            Point::new(10.0, -119.0),
            Point::new(11.0, -120.5),
            Point::new(12.0, -119.8),
        ];
        let q = Point::new(10.0, -119.9);
        let hit = nearest_exact(&pts, &q, 200.0).unwrap().unwrap();
        let expected = exact_distance(10.0, -119.9, 10.0, -119.0);
        assert_eq!(hit.index, 0);
        assert!((hit.distance_km - expected).abs() < 1e-9);
        assert!(nearest_exact(&pts, &q, 50.0).unwrap().is_none());
    }

    #[test]
    fn test_exact_match_has_zero_distance() {
        let pts = scenario();
        let q = Point::new(11.0, -120.5);
        let hit = nearest_exact(&pts, &q, 1.0).unwrap().unwrap();
        assert_eq!(hit.index, 2);
        assert_eq!(hit.distance_km, 0.0);
    }

    #[test]
    fn test_query_past_every_point_not_found() {
        let pts = vec![Point::new(10.0, 0.0)];
        // (10, 0.001) sorts after the only point, so the seed search fails
        let q = Point::new(10.0, 0.001);
        assert!(nearest_exact(&pts, &q, 50.0).unwrap().is_none());
        let advisory = Approximate::new(RadiusCutoff::Advisory);
        assert!(nearest(&pts, &q, 50.0, &advisory).unwrap().is_none());
    }

    #[test]
    fn test_non_positive_radius_not_found() {
        let pts = scenario();
        let q = Point::new(10.0, -120.0);
        assert!(nearest_exact(&pts, &q, 0.0).unwrap().is_none());
        assert!(nearest_exact(&pts, &q, -5.0).unwrap().is_none());
        assert!(nearest_approximate(&pts, &q, 0.0).unwrap().is_none());
        assert!(nearest_exact(&pts, &q, f64::NAN).unwrap().is_none());
    }

    #[test]
    fn test_advisory_cutoff_returns_far_first_hit() {
        let pts = vec![Point::new(20.0, 0.0), Point::new(30.0, 0.0)];
        let q = Point::new(10.0, 0.0);
        assert!(nearest_approximate(&pts, &q, 5.0).unwrap().is_none());

        let advisory = Approximate::new(RadiusCutoff::Advisory);
        let hit = nearest(&pts, &q, 5.0, &advisory).unwrap().unwrap();
        assert_eq!(hit.index, 0);
        assert!((hit.distance_km - 10.0 * KM_PER_DEGREE_LATITUDE).abs() < 1e-6);

        let hit = nearest(&pts, &q, 0.0, &advisory).unwrap().unwrap();
        assert_eq!(hit.index, 0);
    }

    #[test]
    fn test_query_latitude_out_of_range() {
        let pts = scenario();
        let q = Point::new(91.0, 0.0);
        assert!(matches!(
            nearest_exact(&pts, &q, 10.0),
            Err(GeoError::LatitudeOutOfRange(_))
        ));
        assert!(nearest_approximate(&pts, &Point::new(f64::NAN, 0.0), 10.0).is_err());
    }

    #[test]
    fn test_first_record_is_reachable() {
        let pts = vec![
            Point::new(45.0, -93.01),
            Point::new(45.0, -92.0),
            Point::new(45.5, -93.0),
        ];
        let q = Point::new(45.0, -93.0);
        let hit = nearest_approximate(&pts, &q, 5.0).unwrap().unwrap();
        assert_eq!(hit.index, 0);
    }

    #[test]
    fn test_forward_scan_finds_closer_point() {
        // the seed (10, 5) is far east; (10.01, 0) just above is the answer
        let pts = vec![
            Point::new(9.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(10.01, 0.0),
            Point::new(12.0, 0.0),
        ];
        let q = Point::new(10.0, 0.0);
        let hit = nearest_exact(&pts, &q, 10.0).unwrap().unwrap();
        assert_eq!(hit.index, 2);
    }

    #[test]
    fn test_f32_sequence() {
        let pts: Vec<Point<f32>> = scenario()
            .iter()
            .map(|p| Point::from_degrees(p.lat, p.lon))
            .collect();
        let q: Point<f32> = Point::from_degrees(10.0, -119.9);
        let hit = nearest_exact(&pts, &q, 50.0).unwrap().unwrap();
        assert_eq!(hit.index, 0);
        assert!((hit.distance_km - 10.95).abs() < 0.01);
    }

    #[test]
    fn test_search_touches_a_window_not_everything() {
        let mut pts = Vec::new();
        for row in 0..1000 {
            for col in 0..10 {
                pts.push(Point::new(30.0 + row as f64 * 0.01, -95.0 + col as f64 * 0.1));
            }
        }
        let counting = Counting {
            inner: &pts,
            reads: Cell::new(0),
        };
        let q = Point::new(35.003, -94.52);
        let hit = nearest(&counting, &q, 5.0, &Exact).unwrap().unwrap();
        let p = pts[hit.index];
        assert!((p.lat - 35.0).abs() < 1e-9 && (p.lon + 94.5).abs() < 1e-9, "got {}", p);
        assert!(
            counting.reads.get() < 200,
            "touched {} of {} records",
            counting.reads.get(),
            pts.len()
        );
    }

    #[test]
    fn test_exact_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let pts = random_sorted(&mut rng, 3000);
        let radius = 30.0;

        for _ in 0..300 {
            let q = Point::new(rng.gen_range(30.0..40.0), rng.gen_range(-100.0..-90.0));
            let brute = pts
                .iter()
                .map(|p| exact_distance(q.lat, q.lon, p.lat, p.lon))
                .filter(|d| *d < radius + SEED_EPSILON_KM)
                .fold(None, |best: Option<f64>, d| Some(best.map_or(d, |b| b.min(d))));

            let got = nearest_exact(&pts, &q, radius).unwrap();
            match (brute, got) {
                (None, None) => {}
                (Some(expected), Some(hit)) => {
                    assert!(
                        (hit.distance_km - expected).abs() < 1e-9,
                        "query {}: got {} expected {}",
                        q,
                        hit.distance_km,
                        expected
                    );
                    let p = pts[hit.index];
                    assert!((exact_distance(q.lat, q.lon, p.lat, p.lon) - hit.distance_km).abs() < 1e-9);
                }
                (expected, got) => panic!("query {}: brute {:?} vs search {:?}", q, expected, got),
            }
        }
    }

    #[test]
    fn test_approximate_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(0xfeed);
        let pts = random_sorted(&mut rng, 3000);
        let radius = 20.0;

        for _ in 0..300 {
            let q = Point::new(rng.gen_range(30.0..40.0), rng.gen_range(-100.0..-90.0));
            let scale = lookup_lon_km_per_lat(q.lat).unwrap();
            let brute = pts
                .iter()
                .map(|p| planar_distance(p.lat - q.lat, p.lon - q.lon, scale))
                .filter(|d| *d < radius + SEED_EPSILON_KM)
                .fold(None, |best: Option<f64>, d| Some(best.map_or(d, |b| b.min(d))));

            let got = nearest_approximate(&pts, &q, radius).unwrap();
            match (brute, got) {
                (None, None) => {}
                (Some(expected), Some(hit)) => {
                    assert!((hit.distance_km - expected).abs() < 1e-9);
                }
                (expected, got) => panic!("query {}: brute {:?} vs search {:?}", q, expected, got),
            }
        }
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!(Exact.name(), "exact");
        assert_eq!(Approximate::default().name(), "approximate");
        assert_eq!(
            Approximate::new(RadiusCutoff::Advisory).name(),
            "approximate-advisory"
        );
    }
}
