//! Record decoders and the built-in 16-byte coordinate-pair format.

use std::io::{self, Write};

use crate::errors::{DecodeError, GeoResult};
use crate::point::{GeoFloat, Point};

/// Interprets the fixed-size records of a [`RecordStore`](super::RecordStore).
///
/// A decoder holds no per-record state: every call to [`decode`](Self::decode)
/// returns a fresh value owned by the caller, so one decoder can serve any
/// number of concurrent readers.
pub trait RecordDecoder: Send + Sync {
    /// Coordinate storage type of the decoded points.
    type Float: GeoFloat;
    /// Full decoded record: the point plus whatever payload the format carries.
    type Record;

    /// Size in bytes of every record in the store. Must be non-zero.
    fn record_size(&self) -> usize;

    /// Decodes exactly [`record_size`](Self::record_size) bytes.
    fn decode(&self, bytes: &[u8]) -> Result<Self::Record, DecodeError>;

    /// The location of a decoded record.
    fn point(&self, record: &Self::Record) -> Point<Self::Float>;

    /// Renders a decoded record as one line of text.
    fn write_json(&self, record: &Self::Record, out: &mut dyn Write) -> GeoResult<()>;

    /// Decodes just the location. Formats whose payload is expensive to
    /// decode can override this to skip it.
    fn decode_point(&self, bytes: &[u8]) -> Result<Point<Self::Float>, DecodeError> {
        self.decode(bytes).map(|record| self.point(&record))
    }
}

/// Width of a [`PairDecoder`] record.
pub const PAIR_RECORD_SIZE: usize = 16;

/// Decoder for records made of two little-endian `f64` values.
///
/// The field order is configurable since both `lat,lon` and `lon,lat` files
/// exist in the wild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairDecoder {
    lat_first: bool,
}

impl Default for PairDecoder {
    fn default() -> Self {
        Self::lat_first()
    }
}

impl PairDecoder {
    pub fn new(lat_first: bool) -> Self {
        PairDecoder { lat_first }
    }

    pub fn lat_first() -> Self {
        Self::new(true)
    }

    pub fn lon_first() -> Self {
        Self::new(false)
    }

    pub fn is_lat_first(&self) -> bool {
        self.lat_first
    }
}

fn read_f64(bytes: &[u8]) -> Result<f64, DecodeError> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| DecodeError::truncated(8, bytes.len()))?;
    Ok(f64::from_le_bytes(raw))
}

impl RecordDecoder for PairDecoder {
    type Float = f64;
    type Record = Point<f64>;

    fn record_size(&self) -> usize {
        PAIR_RECORD_SIZE
    }

    fn decode(&self, bytes: &[u8]) -> Result<Point<f64>, DecodeError> {
        if bytes.len() != PAIR_RECORD_SIZE {
            return Err(DecodeError::truncated(PAIR_RECORD_SIZE, bytes.len()));
        }
        let first = read_f64(&bytes[..8])?;
        let second = read_f64(&bytes[8..])?;
        if first.is_nan() || second.is_nan() {
            return Err(DecodeError::new("coordinate is NaN"));
        }
        Ok(if self.lat_first {
            Point::new(first, second)
        } else {
            Point::new(second, first)
        })
    }

    fn point(&self, record: &Point<f64>) -> Point<f64> {
        *record
    }

    fn write_json(&self, record: &Point<f64>, out: &mut dyn Write) -> GeoResult<()> {
        serde_json::to_writer(&mut *out, record)?;
        Ok(())
    }
}

/// Encodes one point in the [`PairDecoder`] layout.
pub fn encode_pair(point: &Point<f64>, lat_first: bool) -> [u8; PAIR_RECORD_SIZE] {
    let (first, second) = if lat_first {
        (point.lat, point.lon)
    } else {
        (point.lon, point.lat)
    };
    let mut buf = [0u8; PAIR_RECORD_SIZE];
    buf[..8].copy_from_slice(&first.to_le_bytes());
    buf[8..].copy_from_slice(&second.to_le_bytes());
    buf
}

/// Writes `points` as a pair-record store. The caller is responsible for
/// passing them in point order.
pub fn write_pairs<'a, W, I>(out: &mut W, points: I, lat_first: bool) -> io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Point<f64>>,
{
    let mut written = 0;
    for point in points {
        out.write_all(&encode_pair(point, lat_first))?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}
