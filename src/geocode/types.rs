//! Core types for the geocoding subsystem.

use crate::directory::Coordinates;
use serde::Serialize;
use std::fmt;

/// Where a resolution lands when the lookup cannot produce a coordinate.
/// Lower Manhattan — the center of gravity of the directory.
pub const DEFAULT_COORDINATES: Coordinates = Coordinates { lat: 40.7128, lng: -73.9960 };

/// Why a resolution fell back to the default coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FallbackReason {
    /// The service answered with an empty result list.
    NoResults,
    /// The request never produced a usable response.
    Network(String),
    /// The response arrived but could not be decoded.
    InvalidResponse(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResults => write!(f, "no results"),
            Self::Network(msg) => write!(f, "network error: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {}", msg),
        }
    }
}

/// How a coordinate pair was obtained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CoordinateSource {
    /// The entity already carried coordinates; nothing was resolved.
    Existing,
    /// Served from the durable address cache; no network call.
    Cache,
    /// Freshly geocoded by the lookup service.
    Lookup,
    /// Degraded to the fixed default coordinate.
    Fallback(FallbackReason),
}

impl CoordinateSource {
    /// Did obtaining this coordinate spend a network request?
    pub fn used_network(&self) -> bool {
        matches!(self, Self::Lookup | Self::Fallback(_))
    }

    /// Is this a real geocoded position rather than the default?
    pub fn is_geocoded(&self) -> bool {
        matches!(self, Self::Cache | Self::Lookup)
    }
}

impl fmt::Display for CoordinateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Existing => write!(f, "existing"),
            Self::Cache => write!(f, "cache"),
            Self::Lookup => write!(f, "lookup"),
            Self::Fallback(reason) => write!(f, "fallback ({})", reason),
        }
    }
}

/// The outcome of resolving one address. Always usable — `coordinates` is
/// the fallback default when `source` says so.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved {
    pub coordinates: Coordinates,
    pub source: CoordinateSource,
}

impl Resolved {
    pub fn fallback(reason: FallbackReason) -> Self {
        Self {
            coordinates: DEFAULT_COORDINATES,
            source: CoordinateSource::Fallback(reason),
        }
    }
}

/// Errors from the lookup service transport layer.
#[derive(Debug)]
pub enum LookupError {
    Network(String),
    InvalidResponse(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "Invalid API response: {}", msg),
        }
    }
}

impl std::error::Error for LookupError {}

impl From<LookupError> for FallbackReason {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::Network(msg) => FallbackReason::Network(msg),
            LookupError::InvalidResponse(msg) => FallbackReason::InvalidResponse(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fallback_resolved_uses_default() {
        let r = Resolved::fallback(FallbackReason::NoResults);
        assert_relative_eq!(r.coordinates.lat, 40.7128);
        assert_relative_eq!(r.coordinates.lng, -73.9960);
        assert!(!r.source.is_geocoded());
    }

    #[test]
    fn test_source_classification() {
        assert!(CoordinateSource::Lookup.used_network());
        assert!(CoordinateSource::Fallback(FallbackReason::NoResults).used_network());
        assert!(!CoordinateSource::Cache.used_network());
        assert!(!CoordinateSource::Existing.used_network());

        assert!(CoordinateSource::Cache.is_geocoded());
        assert!(CoordinateSource::Lookup.is_geocoded());
        assert!(!CoordinateSource::Existing.is_geocoded());
    }

    #[test]
    fn test_lookup_error_maps_to_reason() {
        let reason: FallbackReason = LookupError::Network("timed out".into()).into();
        assert_eq!(reason, FallbackReason::Network("timed out".into()));
    }
}
