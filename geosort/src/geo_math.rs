//! Geographic math: degree/kilometer conversions, the longitude-scale
//! lookup table, and the two distance metrics.
//!
//! A degree of latitude is (effectively) a constant distance, while a degree
//! of longitude shrinks with the cosine of the latitude. The lookup table
//! caches that cosine scale at 0.1 degree steps so that hot loops can trade
//! about 1% accuracy (below 80 degrees) for a table read.

use once_cell::sync::Lazy;

use crate::errors::{GeoError, GeoResult};
use crate::point::{GeoFloat, Pair, Rect};

/// Kilometers per degree of latitude.
pub const KM_PER_DEGREE_LATITUDE: f64 = 111.111;

/// Earth radius used by the great-circle formula.
pub const EARTH_RADIUS_KM: f64 = 6371.1;

pub const MILES_TO_KILOMETER: f64 = 1.609344;

pub const SQUARE_KM_PER_SQUARE_MILE: f64 = 0.386102;

/// Highest latitude (in absolute value) the lookup table covers.
pub const MAX_LOOKUP_LATITUDE: f64 = 90.0;

/// Table entries per degree of latitude.
const LOOKUP_STEPS_PER_DEGREE: f64 = 10.0;

/// One entry per 0.1 degree from 0 to 90 inclusive.
const LOOKUP_SIZE: usize = 901;

static LON_KM_LOOKUP: Lazy<[f64; LOOKUP_SIZE]> = Lazy::new(|| {
    let mut table = [0.0; LOOKUP_SIZE];
    for (i, entry) in table.iter_mut().enumerate() {
        *entry = lon_kilos(i as f64 / LOOKUP_STEPS_PER_DEGREE);
    }
    log::trace!("built longitude scale lookup table ({} entries)", LOOKUP_SIZE);
    table
});

/// Kilometers per degree of longitude at `lat`, computed exactly.
#[inline]
pub fn lon_kilos(lat: f64) -> f64 {
    lat.to_radians().cos() * KM_PER_DEGREE_LATITUDE
}

/// Kilometers per degree of longitude at `lat`, read from the lookup table.
///
/// The table is indexed by `floor(|lat| * 10)`; the scale is symmetric
/// about the equator. Non-finite latitudes and `|lat| > 90` are rejected.
#[inline]
pub fn lookup_lon_km_per_lat(lat: f64) -> GeoResult<f64> {
    if !lat.is_finite() || lat.abs() > MAX_LOOKUP_LATITUDE {
        return Err(GeoError::LatitudeOutOfRange(lat));
    }
    let idx = (lat.abs() * LOOKUP_STEPS_PER_DEGREE).floor() as usize;
    Ok(LON_KM_LOOKUP[idx.min(LOOKUP_SIZE - 1)])
}

/// Converts `kilometers` along a parallel at `lat` into degrees of longitude.
pub fn longitude_km_to_degrees(lat: f64, kilometers: f64) -> f64 {
    kilometers / lon_kilos(lat)
}

/// Length in kilometers of `lon_degrees` of longitude at `lat`.
pub fn longitude_kilometers(lat: f64, lon_degrees: f64) -> f64 {
    lon_kilos(lat) * lon_degrees
}

/// Great-circle distance in kilometers (spherical law of cosines).
pub fn exact_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    // acos is ill-conditioned near 1, identical points would come out ~0.1m apart
    if lat1 == lat2 && lon1 == lon2 {
        return 0.0;
    }
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let cos_angle = phi1.sin() * phi2.sin() + phi1.cos() * phi2.cos() * delta_lambda.cos();
    // rounding can push identical points just past 1.0
    cos_angle.clamp(-1.0, 1.0).acos() * EARTH_RADIUS_KM
}

/// Planar (Pythagorean) distance in kilometers.
///
/// Longitude is scaled by the lookup-table value at the FIRST point's
/// latitude. Good for a few tens of kilometers; roughly seven times cheaper
/// than [`exact_distance`].
pub fn approximate_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> GeoResult<f64> {
    let lon_km = lookup_lon_km_per_lat(lat1)?;
    Ok(planar_distance(lat2 - lat1, lon2 - lon1, lon_km))
}

/// Planar distance for degree deltas with a precomputed longitude scale.
#[inline]
pub fn planar_distance(delta_lat: f64, delta_lon: f64, lon_km_per_degree: f64) -> f64 {
    let a = delta_lat * KM_PER_DEGREE_LATITUDE;
    let b = delta_lon * lon_km_per_degree;
    a.hypot(b)
}

/// Box guaranteed to contain every point within `radius_km` of `(lat, lon)`.
pub fn expand_to_box<T: GeoFloat>(lat: T, lon: T, radius_km: f64) -> Rect<T> {
    let lat_f = lat.to_f64();
    let lon_f = lon.to_f64();
    let delta_lat = radius_km / KM_PER_DEGREE_LATITUDE;
    let delta_lon = longitude_km_to_degrees(lat_f, radius_km);
    Rect::new(
        Pair::new(T::from_f64(lat_f - delta_lat), T::from_f64(lon_f - delta_lon)),
        Pair::new(T::from_f64(lat_f + delta_lat), T::from_f64(lon_f + delta_lon)),
    )
}

#[inline]
fn between<T: PartialOrd>(check: T, min: T, max: T) -> bool {
    min <= check && check <= max
}

/// Inclusive containment of `(lat, lon)` in `rect`.
pub fn within<T: GeoFloat>(lat: T, lon: T, rect: &Rect<T>) -> bool {
    between(lat, rect.min.0, rect.max.0) && between(lon, rect.min.1, rect.max.1)
}

/// Approximate area in square kilometers of the box between two corners.
///
/// Averages the parallel lengths at both latitudes (a trapezoid); not for
/// precision work.
pub fn area_in_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let delta = (lon2 - lon1).abs();
    let d1 = longitude_kilometers(lat1, delta);
    let d2 = longitude_kilometers(lat2, delta);
    let avg = (d1 + d2).abs() / 2.0;
    let height = (lat2 - lat1).abs() * KM_PER_DEGREE_LATITUDE;
    height * avg
}

pub fn square_km_in_miles(square_km: f64) -> f64 {
    square_km * SQUARE_KM_PER_SQUARE_MILE
}

pub fn area_in_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    square_km_in_miles(area_in_km(lat1, lon1, lat2, lon2))
}
