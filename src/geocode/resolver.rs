//! Geocode resolver — cache, single lookup, fallback, and the sequential
//! rate-limited batch mode.
//!
//! `resolve` is total: every address produces a usable coordinate pair.
//! The batch iterator is the only place outbound calls happen in a loop,
//! and it is strictly sequential — one request in flight at a time, with a
//! fixed delay after every resolution that spent a network request.

use super::cache::GeocodeCache;
use super::nominatim::{AddressLookup, NominatimClient, Place};
use super::types::{CoordinateSource, FallbackReason, Resolved};
use crate::directory::{Coordinates, Restaurant};
use std::time::Duration;

/// Minimum spacing between outbound lookup requests (the service's
/// published request-rate ceiling is one per second).
pub const RATE_LIMIT_DELAY: Duration = Duration::from_millis(1000);

/// Injected delay, substitutable in tests.
pub type SleepFn = Box<dyn FnMut(Duration) + Send>;

/// The resolver, owning its cache and lookup service.
pub struct GeocodeResolver<S: AddressLookup = NominatimClient> {
    cache: GeocodeCache,
    service: S,
    sleep: SleepFn,
}

impl GeocodeResolver<NominatimClient> {
    /// Resolver with the default cache location and the real HTTP client.
    pub fn new() -> Self {
        Self::with_parts(GeocodeCache::load(), NominatimClient::new())
    }
}

impl Default for GeocodeResolver<NominatimClient> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: AddressLookup> GeocodeResolver<S> {
    /// Resolver with a specific cache and lookup service.
    pub fn with_parts(cache: GeocodeCache, service: S) -> Self {
        Self {
            cache,
            service,
            sleep: Box::new(std::thread::sleep),
        }
    }

    /// Replace the delay function (tests pass a recorder instead of waiting).
    pub fn with_sleeper(mut self, sleep: SleepFn) -> Self {
        self.sleep = sleep;
        self
    }

    pub fn cache(&self) -> &GeocodeCache {
        &self.cache
    }

    /// Resolve one address. Never fails: service errors and empty result
    /// lists degrade to the fixed default coordinate, which is NOT cached.
    pub fn resolve(&mut self, address: &str) -> Resolved {
        if let Some(coordinates) = self.cache.get(address) {
            return Resolved {
                coordinates,
                source: CoordinateSource::Cache,
            };
        }

        match self.service.search(address) {
            Ok(results) => match results.first() {
                Some(first) => match parse_coordinates(first) {
                    Ok(coordinates) => {
                        self.cache.put(address, coordinates);
                        Resolved {
                            coordinates,
                            source: CoordinateSource::Lookup,
                        }
                    }
                    Err(reason) => {
                        eprintln!("Warning: unusable geocoding result for '{}': {}", address, reason);
                        Resolved::fallback(reason)
                    }
                },
                None => {
                    eprintln!("Warning: no geocoding results for address '{}'", address);
                    Resolved::fallback(FallbackReason::NoResults)
                }
            },
            Err(err) => {
                eprintln!("Warning: error geocoding address '{}': {}", address, err);
                Resolved::fallback(err.into())
            }
        }
    }

    /// Resolve a whole restaurant list, yielding each enriched entry as it
    /// completes so a live view can render markers one by one.
    pub fn resolve_batch(&mut self, restaurants: Vec<Restaurant>) -> BatchGeocode<'_, S> {
        BatchGeocode {
            resolver: self,
            remaining: restaurants.into_iter(),
            delay_pending: false,
        }
    }
}

fn parse_coordinates(place: &Place) -> Result<Coordinates, FallbackReason> {
    let lat: f64 = place
        .lat
        .parse()
        .map_err(|_| FallbackReason::InvalidResponse(format!("bad latitude '{}'", place.lat)))?;
    let lng: f64 = place
        .lon
        .parse()
        .map_err(|_| FallbackReason::InvalidResponse(format!("bad longitude '{}'", place.lon)))?;
    Ok(Coordinates { lat, lng })
}

/// Sequential batch geocoding. Entities that already carry coordinates are
/// passed through untouched; cache hits skip the delay; only resolutions
/// that spent a network request arm the inter-request delay.
pub struct BatchGeocode<'a, S: AddressLookup> {
    resolver: &'a mut GeocodeResolver<S>,
    remaining: std::vec::IntoIter<Restaurant>,
    delay_pending: bool,
}

impl<S: AddressLookup> Iterator for BatchGeocode<'_, S> {
    type Item = (Restaurant, CoordinateSource);

    fn next(&mut self) -> Option<Self::Item> {
        let mut restaurant = self.remaining.next()?;

        // Populated coordinates are never re-resolved.
        if restaurant.coordinates.is_some() {
            return Some((restaurant, CoordinateSource::Existing));
        }

        if let Some(coordinates) = self.resolver.cache.get(&restaurant.address) {
            restaurant.coordinates = Some(coordinates);
            return Some((restaurant, CoordinateSource::Cache));
        }

        // About to go to the network: honor the spacing from the previous
        // network-backed resolution.
        if self.delay_pending {
            (self.resolver.sleep)(RATE_LIMIT_DELAY);
        }

        let resolved = self.resolver.resolve(&restaurant.address);
        self.delay_pending = resolved.source.used_network();
        restaurant.coordinates = Some(resolved.coordinates);
        Some((restaurant, resolved.source))
    }
}
