use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};

use super::decoder::RecordDecoder;
use crate::errors::{GeoError, GeoResult};
use crate::point::Point;
use crate::points::GeoPoints;
use crate::range::{range_scan, Container};

/// Bytes backing an open store.
enum RecordBuffer {
    Mapped(Mmap),
    // zero-length files cannot be mapped on every platform
    Owned(Vec<u8>),
}

impl RecordBuffer {
    fn as_bytes(&self) -> &[u8] {
        match self {
            RecordBuffer::Mapped(map) => &map[..],
            RecordBuffer::Owned(bytes) => bytes.as_slice(),
        }
    }
}

/// A read-only file of fixed-size records, memory-mapped on open.
///
/// Records are only reachable through a [`StoreReader`], which holds the
/// read side of the store's lock for as long as it lives. [`close`](Self::close)
/// takes the write side, so it waits for every outstanding reader to be
/// dropped and no reader can start after it.
///
/// ```rust,no_run
/// use geosort::{nearest, Exact, GeoPoints, PairDecoder, Point, RecordStore};
///
/// let store = RecordStore::open("points.bin", PairDecoder::lat_first())?;
/// {
///     let reader = store.reader()?;
///     if let Some(hit) = nearest(&reader, &Point::new(40.7, -74.0), 25.0, &Exact)? {
///         println!("{} at {:.3} km", reader.point_at(hit.index)?, hit.distance_km);
///     }
/// }
/// store.close()?;
/// # Ok::<(), geosort::GeoError>(())
/// ```
pub struct RecordStore<D: RecordDecoder> {
    path: Option<PathBuf>,
    decoder: D,
    len: usize,
    buffer: RwLock<Option<RecordBuffer>>,
}

impl<D: RecordDecoder> RecordStore<D> {
    /// Maps the file at `path`. Trailing bytes that do not make up a whole
    /// record are ignored.
    pub fn open<P: AsRef<Path>>(path: P, decoder: D) -> GeoResult<Self> {
        let path = path.as_ref();
        let record_size = Self::checked_record_size(&decoder)?;

        let file = File::open(path)?;
        let buffer = if file.metadata()?.len() == 0 {
            RecordBuffer::Owned(Vec::new())
        } else {
            // Safety: the mapping is read-only and the store never hands out
            // a slice that outlives the lock guarding it. Files modified by
            // another process while mapped are outside what this can defend.
            RecordBuffer::Mapped(unsafe { Mmap::map(&file)? })
        };

        // count from what was actually mapped, not from the earlier metadata
        let len = Self::record_count(
            buffer.as_bytes().len(),
            record_size,
            &path.display().to_string(),
        );
        log::info!(
            "opened record store {} ({} records of {} bytes)",
            path.display(),
            len,
            record_size
        );

        Ok(RecordStore {
            path: Some(path.to_path_buf()),
            decoder,
            len,
            buffer: RwLock::new(Some(buffer)),
        })
    }

    /// A store over bytes already in memory.
    pub fn from_bytes(bytes: Vec<u8>, decoder: D) -> GeoResult<Self> {
        let record_size = Self::checked_record_size(&decoder)?;
        let len = Self::record_count(bytes.len(), record_size, "in-memory buffer");
        log::debug!("in-memory record store with {} records", len);
        Ok(RecordStore {
            path: None,
            decoder,
            len,
            buffer: RwLock::new(Some(RecordBuffer::Owned(bytes))),
        })
    }

    fn checked_record_size(decoder: &D) -> GeoResult<usize> {
        match decoder.record_size() {
            0 => Err(GeoError::InvalidStore(
                "decoder reports a record size of zero".to_string(),
            )),
            size => Ok(size),
        }
    }

    fn record_count(byte_len: usize, record_size: usize, source: &str) -> usize {
        let trailing = byte_len % record_size;
        if trailing != 0 {
            log::warn!(
                "{}: ignoring {} trailing bytes after the last whole record",
                source,
                trailing
            );
        }
        byte_len / record_size
    }

    /// Number of whole records. Stays valid after the store is closed.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn is_closed(&self) -> bool {
        self.buffer.read().is_none()
    }

    /// Starts a read session.
    ///
    /// Fails with [`GeoError::Closed`] once the store has been closed.
    pub fn reader(&self) -> GeoResult<StoreReader<'_, D>> {
        let bytes = RwLockReadGuard::try_map(self.buffer.read(), |buffer| {
            buffer.as_ref().map(RecordBuffer::as_bytes)
        })
        .map_err(|_| GeoError::Closed)?;

        Ok(StoreReader {
            bytes,
            decoder: &self.decoder,
            record_size: self.decoder.record_size(),
            len: self.len,
        })
    }

    /// Releases the mapping. Blocks until every live [`StoreReader`] is
    /// dropped. Closing twice is a no-op.
    pub fn close(&self) -> GeoResult<()> {
        let mut buffer = self.buffer.write();
        if buffer.take().is_some() {
            match &self.path {
                Some(path) => log::debug!("closed record store {}", path.display()),
                None => log::debug!("closed in-memory record store"),
            }
        }
        Ok(())
    }
}

/// A read session over an open [`RecordStore`].
///
/// Implements [`GeoPoints`], so it can be handed straight to the search and
/// range engines. Each access decodes the record again; nothing is cached.
pub struct StoreReader<'a, D: RecordDecoder> {
    bytes: MappedRwLockReadGuard<'a, [u8]>,
    decoder: &'a D,
    record_size: usize,
    len: usize,
}

impl<D: RecordDecoder> StoreReader<'_, D> {
    fn slice(&self, index: usize) -> GeoResult<&[u8]> {
        if index >= self.len {
            return Err(GeoError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        let start = index * self.record_size;
        self.bytes
            .get(start..start + self.record_size)
            .ok_or(GeoError::IndexOutOfBounds {
                index,
                len: self.len,
            })
    }

    /// Decodes the full record at `index`.
    pub fn record(&self, index: usize) -> GeoResult<D::Record> {
        let bytes = self.slice(index)?;
        self.decoder
            .decode(bytes)
            .map_err(|source| GeoError::Decode { index, source })
    }

    /// Writes the record at `index` in the decoder's text form.
    pub fn write_json(&self, index: usize, out: &mut dyn Write) -> GeoResult<()> {
        let record = self.record(index)?;
        self.decoder.write_json(&record, out)
    }

    /// [`range_scan`] that hands each matching record, fully decoded, to
    /// `on_record`.
    pub fn scan_records<F>(
        &self,
        from: &Point<D::Float>,
        to: &Point<D::Float>,
        container: Option<&dyn Container<D::Float>>,
        mut on_record: F,
    ) -> GeoResult<usize>
    where
        F: FnMut(usize, D::Record) -> GeoResult<()>,
    {
        range_scan(self, from, to, container, |index, _| {
            let record = self.record(index)?;
            on_record(index, record)
        })
    }
}

impl<D: RecordDecoder> GeoPoints<D::Float> for StoreReader<'_, D> {
    fn len(&self) -> usize {
        self.len
    }

    fn point_at(&self, index: usize) -> GeoResult<Point<D::Float>> {
        let bytes = self.slice(index)?;
        self.decoder
            .decode_point(bytes)
            .map_err(|source| GeoError::Decode { index, source })
    }
}
