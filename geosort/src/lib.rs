//! # geosort - Nearest-Point Search over Sorted Coordinates
//!
//! This crate finds points near a query location in a sequence that is
//! sorted by latitude, then longitude. The sequence can live in memory or in
//! a memory-mapped file of fixed-size binary records; the search and range
//! engines only see it through the [`GeoPoints`] trait.
//!
//! ## Features
//!
//! - **Nearest point**: binary search to the query, then an outward scan
//!   pruned on latitude and by a shrinking longitude corridor
//! - **Two metrics**: great-circle distance ([`Exact`]) or a planar
//!   approximation with a precomputed longitude scale ([`Approximate`])
//! - **Range scans**: push every point in a window of the point order to a
//!   callback, optionally filtered by a [`Container`] shape
//! - **Record stores**: read-only, memory-mapped files with caller-supplied
//!   [`RecordDecoder`]s; reads are safe to run from many threads
//! - **`f32` or `f64`** coordinate storage
//!
//! ## Quick Start
//!
//! ```rust
//! use geosort::{nearest_approximate, within_radius, Point};
//!
//! let points = vec![
//!     Point::new(37.7749, -122.4194),
//!     Point::new(37.8044, -122.2712),
//!     Point::new(38.5816, -121.4944),
//! ];
//!
//! let hit = nearest_approximate(&points, &Point::new(37.78, -122.40), 25.0)?
//!     .expect("San Francisco is within 25 km");
//! assert_eq!(hit.index, 0);
//!
//! let mut bay_area = Vec::new();
//! within_radius(&points, &Point::new(37.79, -122.35), 20.0, |index, _| {
//!     bay_area.push(index);
//!     Ok(())
//! })?;
//! assert_eq!(bay_area, vec![0, 1]);
//! # Ok::<(), geosort::GeoError>(())
//! ```

pub mod config;
pub mod coords;
pub mod errors;
pub mod geo_math;
pub mod nearest;
pub mod point;
pub mod points;
pub mod range;
pub mod store;

pub use config::{MetricKind, SearchConfig, DEFAULT_RADIUS_KM};
pub use coords::{check_bounding_box, parse_bounding_box, parse_pair, parse_point};
pub use errors::{DecodeError, GeoError, GeoResult};
pub use nearest::{
    nearest, nearest_approximate, nearest_exact, Approximate, Exact, Neighbor, RadiusCutoff,
    SearchStrategy, Seed,
};
pub use point::{GeoFloat, Pair, Point, Rect};
pub use points::{lower_bound, GeoPoints, Located};
pub use range::{range_scan, scan_rect, within_radius, Circle, Container, ContainsFn};
pub use store::{
    encode_pair, nearest_in_file, write_pairs, NearestRecord, PairDecoder, RecordDecoder,
    RecordStore, StoreReader,
};
