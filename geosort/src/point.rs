//! Coordinate types: the ordered [`Point`], the plain [`Pair`], and the
//! degree-space [`Rect`].
//!
//! Every component works over a single floating-point coordinate type,
//! either `f32` (half the memory per point, about 11cm of precision) or
//! `f64`. Arithmetic is always carried out in `f64`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display};

use crate::errors::GeoResult;
use crate::geo_math;

/// Floating-point types usable as latitude/longitude storage.
pub trait GeoFloat: Copy + PartialOrd + Debug + Display + Default + Send + Sync + 'static {
    fn to_f64(self) -> f64;
    fn from_f64(value: f64) -> Self;
}

impl GeoFloat for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }
}

impl GeoFloat for f32 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

/// A geographic point ordered by latitude, then longitude.
///
/// Sequences handed to the search and range engines must already be sorted
/// under this order; nothing in this crate re-sorts them.
///
/// ## Example
///
/// ```rust
/// use geosort::Point;
///
/// let a = Point::new(10.0, -120.0);
/// let b = Point::new(10.0, -119.0);
/// assert!(a.less(&b));
/// assert!(a < b);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point<T> {
    pub lat: T,
    pub lon: T,
}

impl<T: GeoFloat> Point<T> {
    pub fn new(lat: T, lon: T) -> Self {
        Point { lat, lon }
    }

    /// Builds a point from `f64` degrees, narrowing if `T` is `f32`.
    pub fn from_degrees(lat: f64, lon: f64) -> Self {
        Point {
            lat: T::from_f64(lat),
            lon: T::from_f64(lon),
        }
    }

    pub fn lat_f64(&self) -> f64 {
        self.lat.to_f64()
    }

    pub fn lon_f64(&self) -> f64 {
        self.lon.to_f64()
    }

    /// Strict point order: latitude first, longitude breaks ties.
    #[inline]
    pub fn less(&self, other: &Point<T>) -> bool {
        if self.lat < other.lat {
            true
        } else if self.lat > other.lat {
            false
        } else {
            self.lon < other.lon
        }
    }

    /// Consistent fixed-width label, e.g. `0040.50000_-073.90000`.
    pub fn label(&self) -> String {
        format!("{:010.5}_{:010.5}", self.lat_f64(), self.lon_f64())
    }

    /// Great-circle distance in kilometers.
    pub fn distance(&self, other: &Point<T>) -> f64 {
        geo_math::exact_distance(
            self.lat_f64(),
            self.lon_f64(),
            other.lat_f64(),
            other.lon_f64(),
        )
    }

    /// Planar approximation of the distance in kilometers, scaled at this
    /// point's latitude.
    pub fn approximately(&self, other: &Point<T>) -> GeoResult<f64> {
        geo_math::approximate_distance(
            self.lat_f64(),
            self.lon_f64(),
            other.lat_f64(),
            other.lon_f64(),
        )
    }

    /// Same point with `f64` coordinates.
    #[inline]
    pub fn widen(&self) -> Point<f64> {
        Point {
            lat: self.lat_f64(),
            lon: self.lon_f64(),
        }
    }

    pub fn to_pair(&self) -> Pair<T> {
        Pair(self.lat, self.lon)
    }
}

impl<T: GeoFloat> PartialOrd for Point<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.lat.partial_cmp(&other.lat)? {
            Ordering::Equal => self.lon.partial_cmp(&other.lon),
            ord => Some(ord),
        }
    }
}

impl<T: GeoFloat> Display for Point<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

impl<T: GeoFloat> From<Pair<T>> for Point<T> {
    fn from(pair: Pair<T>) -> Self {
        Point::new(pair.0, pair.1)
    }
}

/// A bare `(lat, lon)` tuple with no ordering semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pair<T>(pub T, pub T);

impl<T: GeoFloat> Pair<T> {
    pub fn new(lat: T, lon: T) -> Self {
        Pair(lat, lon)
    }

    pub fn lat(&self) -> T {
        self.0
    }

    pub fn lon(&self) -> T {
        self.1
    }
}

/// Axis-aligned box in degree space, `min` and `max` corners as pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect<T> {
    pub min: Pair<T>,
    pub max: Pair<T>,
}

impl<T: GeoFloat> Rect<T> {
    pub fn new(min: Pair<T>, max: Pair<T>) -> Self {
        Rect { min, max }
    }

    /// Box that contains every point within `radius_km` of `center`.
    ///
    /// The box is not tight: it is a rectangle around a circle.
    pub fn around(center: Pair<T>, radius_km: f64) -> Self {
        geo_math::expand_to_box(center.lat(), center.lon(), radius_km)
    }

    /// Inclusive containment on both axes.
    pub fn contains(&self, point: &Point<T>) -> bool {
        geo_math::within(point.lat, point.lon, self)
    }

    pub fn min_point(&self) -> Point<T> {
        self.min.into()
    }

    pub fn max_point(&self) -> Point<T> {
        self.max.into()
    }
}

impl<T: GeoFloat> Display for Rect<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect(({}, {}), ({}, {}))",
            self.min.0, self.min.1, self.max.0, self.max.1
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_order_latitude_first() {
        let a = Point::new(10.0, 50.0);
        let b = Point::new(11.0, -50.0);
        assert!(a.less(&b));
        assert!(!b.less(&a));
        assert!(a < b);
    }

    #[test]
    fn test_point_order_longitude_breaks_ties() {
        let a = Point::new(10.0f32, -120.0);
        let b = Point::new(10.0f32, -119.0);
        assert!(a.less(&b));
        assert!(!b.less(&a));
        assert!(!a.less(&a));
        assert_eq!(a.partial_cmp(&a), Some(Ordering::Equal));
    }

    #[test]
    fn test_point_order_with_nan_is_unordered() {
        let a = Point::new(f64::NAN, 0.0);
        let b = Point::new(1.0, 0.0);
        assert_eq!(a.partial_cmp(&b), None);
        assert!(!a.less(&b));
    }

    #[test]
    fn test_label_is_fixed_width() {
        let p = Point::new(40.5, -73.9);
        assert_eq!(p.label(), "0040.50000_-073.90000");
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = Point::new(37.7749, -122.4194);
        assert!(p.distance(&p).abs() < 1e-9);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Point::new(37.7749, -122.4194);
        let b = Point::new(34.0522, -118.2437);
        assert!((a.distance(&b) - b.distance(&a)).abs() < 1e-9);
    }

    #[test]
    fn test_f32_points_widen_for_math() {
        let a: Point<f32> = Point::from_degrees(45.0, -93.0);
        let b: Point<f32> = Point::from_degrees(45.0, -93.0);
        assert_eq!(a, b);
        assert!(a.distance(&b) < 1e-6);
    }

    #[test]
    fn test_pair_to_point() {
        let pair = Pair::new(1.5, -2.5);
        let p: Point<f64> = pair.into();
        assert_eq!(p.lat, 1.5);
        assert_eq!(p.lon, -2.5);
        assert_eq!(p.to_pair(), pair);
    }

    #[test]
    fn test_rect_contains_is_inclusive() {
        let rect = Rect::new(Pair(40.0, -74.0), Pair(41.0, -73.0));
        assert!(rect.contains(&Point::new(40.0, -74.0)));
        assert!(rect.contains(&Point::new(41.0, -73.0)));
        assert!(rect.contains(&Point::new(40.5, -73.5)));
        assert!(!rect.contains(&Point::new(41.1, -73.5)));
        assert!(!rect.contains(&Point::new(40.5, -72.9)));
    }

    #[test]
    fn test_rect_around_contains_radius() {
        let center = Pair(45.0, -93.0);
        let rect = Rect::around(center, 10.0);
        let north = Point::new(45.0 + 10.0 / geo_math::KM_PER_DEGREE_LATITUDE * 0.99, -93.0);
        assert!(rect.contains(&north));
        assert!(rect.min.0 < 45.0 && rect.max.0 > 45.0);
        assert!(rect.min.1 < -93.0 && rect.max.1 > -93.0);
    }

    #[test]
    fn test_point_serializes_as_object() {
        let p = Point::new(1.0, 2.0);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"lat":1.0,"lon":2.0}"#);
    }
}
