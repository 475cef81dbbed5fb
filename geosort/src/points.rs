//! Random-access view over a sorted point sequence.
//!
//! [`GeoPoints`] is all the search and range engines know about storage:
//! a length and a point per index. In-memory slices of anything that is
//! [`Located`] and the memory-mapped [`StoreReader`](crate::store::StoreReader)
//! both provide it.

use crate::errors::{GeoError, GeoResult};
use crate::point::{GeoFloat, Point};

/// An ordered, index-addressable, immutable collection of points.
pub trait GeoPoints<T: GeoFloat> {
    /// Number of records. Fixed for the lifetime of the view.
    fn len(&self) -> usize;

    /// Point of the record at `index`.
    ///
    /// Indices outside `[0, len)` are rejected with
    /// [`GeoError::IndexOutOfBounds`], never clamped.
    fn point_at(&self, index: usize) -> GeoResult<Point<T>>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Anything that carries a point: a bare [`Point`] or a record with payload.
pub trait Located<T: GeoFloat> {
    fn location(&self) -> Point<T>;
}

impl<T: GeoFloat> Located<T> for Point<T> {
    #[inline]
    fn location(&self) -> Point<T> {
        *self
    }
}

impl<T: GeoFloat, P> Located<T> for (Point<T>, P) {
    #[inline]
    fn location(&self) -> Point<T> {
        self.0
    }
}

impl<T: GeoFloat, R: Located<T>> GeoPoints<T> for [R] {
    #[inline]
    fn len(&self) -> usize {
        <[R]>::len(self)
    }

    #[inline]
    fn point_at(&self, index: usize) -> GeoResult<Point<T>> {
        self.get(index)
            .map(Located::location)
            .ok_or(GeoError::IndexOutOfBounds {
                index,
                len: <[R]>::len(self),
            })
    }
}

impl<T: GeoFloat, R: Located<T>> GeoPoints<T> for Vec<R> {
    #[inline]
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    fn point_at(&self, index: usize) -> GeoResult<Point<T>> {
        GeoPoints::point_at(self.as_slice(), index)
    }
}

impl<T: GeoFloat, G: GeoPoints<T> + ?Sized> GeoPoints<T> for &G {
    #[inline]
    fn len(&self) -> usize {
        (**self).len()
    }

    #[inline]
    fn point_at(&self, index: usize) -> GeoResult<Point<T>> {
        (**self).point_at(index)
    }
}

/// First index whose point is not less than `target`, or `len()` if every
/// point is less.
///
/// Binary search under the point order; the sequence must be sorted.
pub fn lower_bound<T, G>(points: &G, target: &Point<T>) -> GeoResult<usize>
where
    T: GeoFloat,
    G: GeoPoints<T> + ?Sized,
{
    let mut lo = 0;
    let mut hi = points.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if points.point_at(mid)?.less(target) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    Ok(lo)
}
