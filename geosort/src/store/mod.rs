//! Memory-mapped record files.
//!
//! A store file is a flat sequence of fixed-size binary records with no
//! header, sorted in point order. A [`RecordDecoder`] supplied by the caller
//! turns each record's bytes into a point and a payload.

mod decoder;
mod record_store;

pub use decoder::{encode_pair, write_pairs, PairDecoder, RecordDecoder, PAIR_RECORD_SIZE};
pub use record_store::{RecordStore, StoreReader};

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::errors::{GeoError, GeoResult};
use crate::nearest::nearest;
use crate::point::Point;

/// The nearest record of a pair-record file, with its text form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestRecord {
    pub index: usize,
    pub distance_km: f64,
    pub line: String,
}

impl fmt::Display for NearestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Index:{} Distance:{:.6} Line:{}",
            self.index, self.distance_km, self.line
        )
    }
}

/// Opens the pair-record file at `path`, finds the record nearest to
/// `query` under `config`, and closes the file again.
///
/// `config.lat_first` selects the field order of the file.
pub fn nearest_in_file<P: AsRef<Path>>(
    path: P,
    query: &Point<f64>,
    config: &SearchConfig,
) -> GeoResult<Option<NearestRecord>> {
    config.validate()?;
    let store = RecordStore::open(path, PairDecoder::new(config.lat_first))?;
    let strategy = config.strategy();

    let found = {
        let reader = store.reader()?;
        match nearest(&reader, query, config.radius_km, strategy.as_ref())? {
            Some(hit) => {
                let mut line = Vec::new();
                reader.write_json(hit.index, &mut line)?;
                let line = String::from_utf8(line)
                    .map_err(|err| GeoError::Serialization(err.to_string()))?;
                Some(NearestRecord {
                    index: hit.index,
                    distance_km: hit.distance_km,
                    line,
                })
            }
            None => None,
        }
    };

    store.close()?;
    Ok(found)
}
