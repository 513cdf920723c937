//! TableMap — a curated restaurant directory engine.
//!
//! The crate is built around two small cores: a pure facet filter over the
//! restaurant list (cuisine and location multi-select) and a cached,
//! rate-limited forward geocoder that turns free-text addresses into map
//! coordinates without ever failing. Around them sit a durable restaurant
//! store, a photo folder store, a type-ahead venue suggestion helper, a CLI,
//! and a small JSON HTTP API.

pub mod directory;
pub mod filter;
pub mod geocode;
pub mod media;
pub mod server;
pub mod store;
