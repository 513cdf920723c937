//! Forward geocoding for restaurant addresses.
//!
//! Turns free-text postal addresses into map coordinates via Nominatim,
//! with a durable local cache, a strictly sequential rate-limited batch
//! mode, and a never-fail contract: anything that goes wrong degrades to a
//! fixed default coordinate instead of an error.

pub mod cache;
pub mod nominatim;
pub mod resolver;
pub mod suggest;
pub mod types;

pub use cache::GeocodeCache;
pub use nominatim::{AddressLookup, NominatimClient, Place};
pub use resolver::{BatchGeocode, GeocodeResolver, RATE_LIMIT_DELAY};
pub use suggest::{Debouncer, StructuredPlace};
pub use types::{CoordinateSource, FallbackReason, LookupError, Resolved, DEFAULT_COORDINATES};
