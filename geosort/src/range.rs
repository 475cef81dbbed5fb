//! Ordered window scans over a sorted point sequence.
//!
//! The point order only gives a diagonal cut through lat/lon space: every
//! point between `from` and `to` in point order, which includes points of
//! any longitude on the intermediate latitudes. The scan therefore checks
//! each visited point's longitude against `[from.lon, to.lon]` and, when
//! given one, a [`Container`] shape. Matches are pushed to a callback as
//! they are found; nothing is buffered.

use crate::errors::{GeoError, GeoResult};
use crate::geo_math::{self, exact_distance};
use crate::point::{GeoFloat, Point, Rect};
use crate::points::{lower_bound, GeoPoints};

/// A shape that can answer "is this point inside".
pub trait Container<T: GeoFloat> {
    fn contains_point(&self, point: &Point<T>) -> bool;
}

impl<T: GeoFloat> Container<T> for Rect<T> {
    fn contains_point(&self, point: &Point<T>) -> bool {
        self.contains(point)
    }
}

/// Points within `radius_km` (great-circle) of `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle<T> {
    pub center: Point<T>,
    pub radius_km: f64,
}

impl<T: GeoFloat> Circle<T> {
    pub fn new(center: Point<T>, radius_km: f64) -> Self {
        Circle { center, radius_km }
    }

    /// Smallest degree-space box the scan has to walk for this circle.
    pub fn bounding_box(&self) -> Rect<T> {
        geo_math::expand_to_box(self.center.lat, self.center.lon, self.radius_km)
    }
}

impl<T: GeoFloat> Container<T> for Circle<T> {
    fn contains_point(&self, point: &Point<T>) -> bool {
        exact_distance(
            self.center.lat_f64(),
            self.center.lon_f64(),
            point.lat_f64(),
            point.lon_f64(),
        ) <= self.radius_km
    }
}

/// Adapts a closure into a [`Container`].
pub struct ContainsFn<F>(pub F);

impl<T: GeoFloat, F> Container<T> for ContainsFn<F>
where
    F: Fn(&Point<T>) -> bool,
{
    fn contains_point(&self, point: &Point<T>) -> bool {
        (self.0)(point)
    }
}

/// Walks every point `p` with `from <= p < to` in point order whose
/// longitude lies in `[from.lon, to.lon]` and that `container` (if any)
/// accepts, calling `on_match(index, point)` for each in order.
///
/// Returns the number of matches, or [`GeoError::NotFound`] when no point
/// is at or after `from`. An error from `on_match` stops the scan and is
/// returned as is.
pub fn range_scan<T, G, F>(
    points: &G,
    from: &Point<T>,
    to: &Point<T>,
    container: Option<&dyn Container<T>>,
    mut on_match: F,
) -> GeoResult<usize>
where
    T: GeoFloat,
    G: GeoPoints<T> + ?Sized,
    F: FnMut(usize, Point<T>) -> GeoResult<()>,
{
    let len = points.len();
    let start = lower_bound(points, from)?;
    if start == len {
        return Err(GeoError::NotFound);
    }

    let mut matched = 0;
    let mut visited = 0;
    for idx in start..len {
        let point = points.point_at(idx)?;
        if !point.less(to) {
            break;
        }
        visited += 1;
        if point.lon < from.lon || point.lon > to.lon {
            continue;
        }
        if let Some(shape) = container {
            if !shape.contains_point(&point) {
                continue;
            }
        }
        on_match(idx, point)?;
        matched += 1;
    }
    log::debug!(
        "range {} .. {}: {} matches out of {} visited",
        from,
        to,
        matched,
        visited
    );
    Ok(matched)
}

/// [`range_scan`] over the corners of `rect`.
pub fn scan_rect<T, G, F>(
    points: &G,
    rect: &Rect<T>,
    container: Option<&dyn Container<T>>,
    on_match: F,
) -> GeoResult<usize>
where
    T: GeoFloat,
    G: GeoPoints<T> + ?Sized,
    F: FnMut(usize, Point<T>) -> GeoResult<()>,
{
    range_scan(points, &rect.min_point(), &rect.max_point(), container, on_match)
}

/// Calls `on_match` for every point within `radius_km` of `center`, in
/// point order. Finding nothing is `Ok(0)`, not an error.
pub fn within_radius<T, G, F>(
    points: &G,
    center: &Point<T>,
    radius_km: f64,
    on_match: F,
) -> GeoResult<usize>
where
    T: GeoFloat,
    G: GeoPoints<T> + ?Sized,
    F: FnMut(usize, Point<T>) -> GeoResult<()>,
{
    let circle = Circle::new(*center, radius_km);
    let rect = circle.bounding_box();
    match scan_rect(points, &rect, Some(&circle), on_match) {
        Err(GeoError::NotFound) => Ok(0),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Pair;

    fn grid() -> Vec<Point<f64>> {
        let mut pts = Vec::new();
        for row in 0..20 {
            for col in 0..20 {
                pts.push(Point::new(40.0 + row as f64 * 0.05, -75.0 + col as f64 * 0.05));
            }
        }
        pts
    }

    fn collect(
        pts: &[Point<f64>],
        from: Point<f64>,
        to: Point<f64>,
        container: Option<&dyn Container<f64>>,
    ) -> GeoResult<Vec<(usize, Point<f64>)>> {
        let mut out = Vec::new();
        range_scan(pts, &from, &to, container, |i, p| {
            out.push((i, p));
            Ok(())
        })?;
        Ok(out)
    }

    #[test]
    fn test_range_results_ordered_and_within_longitude() {
        let pts = grid();
        let from = Point::new(40.12, -74.81);
        let to = Point::new(40.43, -74.52);
        let hits = collect(&pts, from, to, None).unwrap();
        assert!(!hits.is_empty());

        for pair in hits.windows(2) {
            assert!(pair[0].0 < pair[1].0);
            assert!(!pair[1].1.less(&pair[0].1));
        }
        for (_, p) in &hits {
            assert!(p.lon >= from.lon && p.lon <= to.lon, "{} outside longitude band", p);
            assert!(!p.less(&from) && p.less(&to));
        }

        // rows 40.15..40.40 (6 rows) times cols -74.80..-74.55 (6 cols)
        assert_eq!(hits.len(), 36);
    }

    #[test]
    fn test_range_not_found_past_end() {
        let pts = grid();
        let result = collect(&pts, Point::new(50.0, 0.0), Point::new(51.0, 1.0), None);
        assert!(matches!(result, Err(GeoError::NotFound)));
    }

    #[test]
    fn test_range_empty_window_is_zero_matches() {
        let pts = grid();
        let count = range_scan(
            &pts,
            &Point::new(40.01, -74.0),
            &Point::new(40.02, -73.0),
            None,
            |_, _| Ok(()),
        )
        .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_range_with_container() {
        let pts = grid();
        let only_even_rows = ContainsFn(|p: &Point<f64>| (((p.lat - 40.0) / 0.05).round() as i64) % 2 == 0);
        // 40.48 stops before row 40.50; rows 40.00 ..= 40.45 remain
        let all = collect(&pts, Point::new(40.0, -75.0), Point::new(40.48, -74.0), None).unwrap();
        let even = collect(
            &pts,
            Point::new(40.0, -75.0),
            Point::new(40.48, -74.0),
            Some(&only_even_rows),
        )
        .unwrap();
        assert_eq!(all.len(), 200);
        assert_eq!(even.len(), 100);
    }

    #[test]
    fn test_range_with_rect_container() {
        let pts = grid();
        let rect = Rect::new(Pair(40.2, -74.9), Pair(40.3, -74.8));
        let hits = collect(
            &pts,
            Point::new(40.0, -75.0),
            Point::new(41.0, -74.0),
            Some(&rect),
        )
        .unwrap();
        assert!(hits.iter().all(|(_, p)| rect.contains(p)));
        assert!(!hits.is_empty());
    }

    #[test]
    fn test_callback_error_stops_scan() {
        let pts = grid();
        let mut seen = 0;
        let result = range_scan(
            &pts,
            &Point::new(40.0, -75.0),
            &Point::new(41.0, -74.0),
            None,
            |_, _| {
                seen += 1;
                if seen == 3 {
                    Err(GeoError::InvalidStore("stop".into()))
                } else {
                    Ok(())
                }
            },
        );
        assert!(matches!(result, Err(GeoError::InvalidStore(_))));
        assert_eq!(seen, 3);
    }

    #[test]
    fn test_within_radius_matches_brute_force() {
        let pts = grid();
        let center = Point::new(40.47, -74.53);
        let radius = 12.0;
        let mut found = Vec::new();
        let count = within_radius(&pts, &center, radius, |i, _| {
            found.push(i);
            Ok(())
        })
        .unwrap();

        let expected: Vec<usize> = pts
            .iter()
            .enumerate()
            .filter(|(_, p)| center.distance(p) <= radius)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(count, expected.len());
        assert_eq!(found, expected);
        assert!(count > 0);
    }

    #[test]
    fn test_within_radius_nothing_is_ok() {
        let pts = grid();
        let count = within_radius(&pts, &Point::new(60.0, 10.0), 5.0, |_, _| Ok(())).unwrap();
        assert_eq!(count, 0);
    }
}
