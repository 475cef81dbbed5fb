//! Parsing of coordinate query strings.
//!
//! Fields are separated by `,` or, failing that, `/`. A point is
//! `"lat,lon"`; a bounding box is `"min_lat,min_lon,max_lat,max_lon"`.

use crate::errors::{GeoError, GeoResult};
use crate::point::{GeoFloat, Pair, Point, Rect};

fn split_fields(query: &str, expected: usize) -> GeoResult<Vec<&str>> {
    let mut fields: Vec<&str> = query.split(',').collect();
    if fields.len() != expected {
        fields = query.split('/').collect();
    }
    if fields.len() != expected {
        return Err(GeoError::InvalidCoordinates(format!(
            "expected {} fields in {:?}",
            expected, query
        )));
    }
    Ok(fields)
}

fn parse_fields<T: GeoFloat>(fields: &[&str]) -> GeoResult<Vec<T>> {
    fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            field.trim().parse::<f64>().map(T::from_f64).map_err(|err| {
                GeoError::InvalidCoordinates(format!(
                    "({}/{}): {:?} is not a number: {}",
                    i,
                    fields.len(),
                    field,
                    err
                ))
            })
        })
        .collect()
}

/// Parses `"lat,lon"` or `"lat/lon"`.
pub fn parse_pair<T: GeoFloat>(query: &str) -> GeoResult<Pair<T>> {
    let fields = split_fields(query, 2)?;
    let values = parse_fields::<T>(&fields)?;
    Ok(Pair(values[0], values[1]))
}

/// [`parse_pair`] as a [`Point`].
pub fn parse_point<T: GeoFloat>(query: &str) -> GeoResult<Point<T>> {
    parse_pair(query).map(Point::from)
}

/// Parses a four-field bounding box and runs [`check_bounding_box`] on it.
///
/// ```rust
/// use geosort::{parse_bounding_box, Pair, GeoError};
///
/// let rect = parse_bounding_box::<f64>("40.5,-73.9,41.0,-73.5")?;
/// assert_eq!(rect.min, Pair(40.5, -73.9));
/// assert_eq!(rect.max, Pair(41.0, -73.5));
///
/// assert!(matches!(
///     parse_bounding_box::<f64>("0,0,0,0"),
///     Err(GeoError::BadCoordinates(_))
/// ));
/// # Ok::<(), GeoError>(())
/// ```
pub fn parse_bounding_box<T: GeoFloat>(query: &str) -> GeoResult<Rect<T>> {
    let fields = split_fields(query, 4)?;
    let values = parse_fields::<T>(&fields)?;
    let rect = Rect::new(Pair(values[0], values[1]), Pair(values[2], values[3]));
    check_bounding_box(&rect)?;
    Ok(rect)
}

/// Sanity checks for a query box over northern/western-hemisphere data.
///
/// Rejects an all-zero box, a negative latitude or positive longitude on
/// either corner, and a minimum corner past the maximum on either axis.
pub fn check_bounding_box<T: GeoFloat>(rect: &Rect<T>) -> GeoResult<()> {
    let (min_lat, min_lon) = (rect.min.0.to_f64(), rect.min.1.to_f64());
    let (max_lat, max_lon) = (rect.max.0.to_f64(), rect.max.1.to_f64());

    let reason = if min_lat == 0.0 && min_lon == 0.0 && max_lat == 0.0 && max_lon == 0.0 {
        "zero coordinates are not allowed".to_string()
    } else if min_lat < 0.0 {
        format!("latitude {:.5} cannot be negative", min_lat)
    } else if min_lon > 0.0 {
        format!("longitude {:.5} must be negative", min_lon)
    } else if max_lat < 0.0 {
        format!("latitude {:.5} cannot be negative", max_lat)
    } else if max_lon > 0.0 {
        format!("longitude {:.5} must be negative", max_lon)
    } else if min_lat > max_lat {
        format!("latitude {:.5} must be less than {:.5}", min_lat, max_lat)
    } else if min_lon > max_lon {
        format!("longitude {:.5} must be less than {:.5}", min_lon, max_lon)
    } else {
        return Ok(());
    };
    Err(GeoError::BadCoordinates(reason))
}
