//! Search configuration shared by the file-level helpers and the CLI.

use serde::{Deserialize, Serialize};

use crate::errors::{GeoError, GeoResult};
use crate::nearest::{Approximate, Exact, RadiusCutoff, SearchStrategy};

/// Default search radius in kilometers.
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

/// Distance metric used by a nearest-point search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MetricKind {
    /// Great-circle distance.
    #[default]
    Exact,
    /// Planar distance with a table-driven longitude scale.
    Approximate,
}

/// Parameters for a nearest-point query.
///
/// # Examples
///
/// ```rust
/// use geosort::{MetricKind, SearchConfig};
///
/// let config = SearchConfig::default()
///     .with_radius_km(10.0)
///     .with_metric(MetricKind::Approximate);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.strategy().name(), "approximate");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub radius_km: f64,
    pub metric: MetricKind,
    /// Only consulted by the approximate metric.
    pub cutoff: RadiusCutoff,
    /// Record files store latitude before longitude.
    pub lat_first: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_RADIUS_KM,
            metric: MetricKind::Exact,
            cutoff: RadiusCutoff::Hard,
            lat_first: true,
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self
    }

    pub fn with_metric(mut self, metric: MetricKind) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_cutoff(mut self, cutoff: RadiusCutoff) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn with_lat_first(mut self, lat_first: bool) -> Self {
        self.lat_first = lat_first;
        self
    }

    /// Rejects a radius that is NaN or infinite.
    ///
    /// A zero or negative radius is valid and simply finds nothing under a
    /// hard cutoff.
    pub fn validate(&self) -> GeoResult<()> {
        if !self.radius_km.is_finite() {
            return Err(GeoError::InvalidOperation(format!(
                "search radius must be finite, got {}",
                self.radius_km
            )));
        }
        Ok(())
    }

    /// The search strategy these settings describe.
    pub fn strategy(&self) -> Box<dyn SearchStrategy> {
        match self.metric {
            MetricKind::Exact => Box::new(Exact),
            MetricKind::Approximate => Box::new(Approximate::new(self.cutoff)),
        }
    }
}
