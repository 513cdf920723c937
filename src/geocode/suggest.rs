//! Type-ahead venue suggestions.
//!
//! The admin form searches Nominatim as the user types. Results are
//! filtered client-side toward food venues, then decomposed into the
//! structured fields the form wants. Requests are debounced — one lookup
//! per 500 ms quiet window — so this path needs neither the cache nor the
//! batch rate limiter.

use super::nominatim::{AddressDetails, AddressLookup, Place};
use super::types::LookupError;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Input must pause this long before a suggestion query fires.
pub const DEBOUNCE_QUIET: Duration = Duration::from_millis(500);

/// Queries shorter than this produce no suggestions.
pub const MIN_QUERY_LEN: usize = 3;

/// A suggestion decomposed into the admin form's fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredPlace {
    pub name: String,
    pub display_name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Fetch, filter, and decompose suggestions for a partial query.
pub fn fetch_suggestions<S: AddressLookup>(
    service: &S,
    query: &str,
) -> Result<Vec<StructuredPlace>, LookupError> {
    if query.chars().count() < MIN_QUERY_LEN {
        return Ok(vec![]);
    }
    let places = service.suggest(query)?;
    Ok(food_venues(places).iter().map(decompose).collect())
}

/// Prefer food-related venues; when the filter leaves nothing, fall back to
/// the first page of unfiltered results.
pub fn food_venues(places: Vec<Place>) -> Vec<Place> {
    let filtered: Vec<Place> = places
        .iter()
        .filter(|p| is_food_venue(p))
        .cloned()
        .collect();

    if !filtered.is_empty() {
        filtered
    } else {
        places.into_iter().take(10).collect()
    }
}

fn is_food_venue(place: &Place) -> bool {
    let kind = place.kind.as_deref().unwrap_or("");
    let category = place.category.as_deref().unwrap_or("");
    let display = place.display_name.to_lowercase();

    kind == "restaurant"
        || kind == "cafe"
        || kind == "fast_food"
        || category == "amenity"
        || display.contains("restaurant")
        || display.contains("cafe")
}

/// Break one match into structured form fields.
pub fn decompose(place: &Place) -> StructuredPlace {
    let default_details = AddressDetails::default();
    let addr = place.address.as_ref().unwrap_or(&default_details);

    let name = place
        .display_name
        .split(',')
        .next()
        .unwrap_or("")
        .trim()
        .to_string();

    let house_number = addr.house_number.as_deref().unwrap_or("");
    let road = addr
        .road
        .as_deref()
        .or(addr.street.as_deref())
        .unwrap_or("");
    let street_address = format!("{} {}", house_number, road).trim().to_string();

    let city = addr
        .city
        .as_deref()
        .or(addr.town.as_deref())
        .or(addr.village.as_deref())
        .or(addr.suburb.as_deref())
        .or(addr.county.as_deref())
        .unwrap_or("")
        .to_string();

    let state_raw = addr
        .state
        .as_deref()
        .or(addr.province.as_deref())
        .or(addr.region.as_deref())
        .unwrap_or("");
    let state = us_state_abbreviation(state_raw)
        .map(str::to_string)
        .unwrap_or_else(|| state_raw.to_string());

    StructuredPlace {
        name,
        display_name: place.display_name.clone(),
        street_address,
        city,
        state,
        zip_code: addr.postcode.clone().unwrap_or_default(),
        country: addr.country.clone().unwrap_or_else(|| "USA".to_string()),
        latitude: place.lat.parse().unwrap_or(0.0),
        longitude: place.lon.parse().unwrap_or(0.0),
    }
}

/// Full US state name → two-letter abbreviation.
fn us_state_abbreviation(name: &str) -> Option<&'static str> {
    let abbr = match name {
        "Alabama" => "AL", "Alaska" => "AK", "Arizona" => "AZ", "Arkansas" => "AR",
        "California" => "CA", "Colorado" => "CO", "Connecticut" => "CT", "Delaware" => "DE",
        "Florida" => "FL", "Georgia" => "GA", "Hawaii" => "HI", "Idaho" => "ID",
        "Illinois" => "IL", "Indiana" => "IN", "Iowa" => "IA", "Kansas" => "KS",
        "Kentucky" => "KY", "Louisiana" => "LA", "Maine" => "ME", "Maryland" => "MD",
        "Massachusetts" => "MA", "Michigan" => "MI", "Minnesota" => "MN", "Mississippi" => "MS",
        "Missouri" => "MO", "Montana" => "MT", "Nebraska" => "NE", "Nevada" => "NV",
        "New Hampshire" => "NH", "New Jersey" => "NJ", "New Mexico" => "NM", "New York" => "NY",
        "North Carolina" => "NC", "North Dakota" => "ND", "Ohio" => "OH", "Oklahoma" => "OK",
        "Oregon" => "OR", "Pennsylvania" => "PA", "Rhode Island" => "RI", "South Carolina" => "SC",
        "South Dakota" => "SD", "Tennessee" => "TN", "Texas" => "TX", "Utah" => "UT",
        "Vermont" => "VT", "Virginia" => "VA", "Washington" => "WA", "West Virginia" => "WV",
        "Wisconsin" => "WI", "Wyoming" => "WY",
        _ => return None,
    };
    Some(abbr)
}

// ─── Debouncer ──────────────────────────────────────────────────

/// Explicit debounce state: callers feed input events with their own clock
/// and poll for the query once the quiet window has elapsed. Newer input
/// supersedes anything pending.
pub struct Debouncer {
    quiet: Duration,
    pending: Option<String>,
    last_input: Option<Instant>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::with_quiet(DEBOUNCE_QUIET)
    }

    pub fn with_quiet(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            last_input: None,
        }
    }

    /// Record one keystroke's worth of input.
    pub fn input(&mut self, text: &str, now: Instant) {
        self.last_input = Some(now);
        if text.chars().count() < MIN_QUERY_LEN {
            self.pending = None;
        } else {
            self.pending = Some(text.to_string());
        }
    }

    /// The query to fire, if the input has been quiet long enough.
    /// Taking it clears the pending state until the next input.
    pub fn due(&mut self, now: Instant) -> Option<String> {
        let last = self.last_input?;
        if now.saturating_duration_since(last) >= self.quiet {
            self.pending.take()
        } else {
            None
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::RefCell;

    fn place_json(json: &str) -> Place {
        serde_json::from_str(json).unwrap()
    }

    fn venue(kind: &str, category: &str, display_name: &str) -> Place {
        place_json(&format!(
            r#"{{"lat": "40.0", "lon": "-74.0", "display_name": "{}", "type": "{}", "category": "{}"}}"#,
            display_name, kind, category
        ))
    }

    #[test]
    fn test_food_filter_prefers_food_venues() {
        let places = vec![
            venue("administrative", "boundary", "New York, USA"),
            venue("restaurant", "amenity", "Ramen King, New York"),
            venue("cafe", "amenity", "Blue Bottle, Oakland"),
        ];
        let out = food_venues(places);
        assert_eq!(out.len(), 2);
        assert!(out[0].display_name.starts_with("Ramen King"));
    }

    #[test]
    fn test_food_filter_matches_display_name() {
        let places = vec![venue("node", "building", "Some Restaurant Supply, Chicago")];
        let out = food_venues(places);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_food_filter_falls_back_to_unfiltered() {
        let places: Vec<Place> = (0..12)
            .map(|i| venue("administrative", "boundary", &format!("Region {}", i)))
            .collect();
        let out = food_venues(places);
        // Nothing food-related: first page of unfiltered results.
        assert_eq!(out.len(), 10);
        assert_eq!(out[0].display_name, "Region 0");
    }

    #[test]
    fn test_decompose_full_address() {
        let place = place_json(
            r#"{
                "lat": "37.7674",
                "lon": "-122.4221",
                "display_name": "Burma Love, 211, Valencia Street, San Francisco, California, 94103, United States",
                "type": "restaurant",
                "category": "amenity",
                "address": {
                    "house_number": "211",
                    "road": "Valencia Street",
                    "city": "San Francisco",
                    "state": "California",
                    "postcode": "94103",
                    "country": "United States"
                }
            }"#,
        );

        let s = decompose(&place);
        assert_eq!(s.name, "Burma Love");
        assert_eq!(s.street_address, "211 Valencia Street");
        assert_eq!(s.city, "San Francisco");
        assert_eq!(s.state, "CA");
        assert_eq!(s.zip_code, "94103");
        assert_eq!(s.country, "United States");
        assert_relative_eq!(s.latitude, 37.7674);
        assert_relative_eq!(s.longitude, -122.4221);
    }

    #[test]
    fn test_decompose_city_fallback_chain() {
        let place = place_json(
            r#"{
                "lat": "41.0", "lon": "-87.0",
                "display_name": "Saigon Kitchen, Broadway",
                "address": {"town": "Uptown", "province": "Illinois"}
            }"#,
        );
        let s = decompose(&place);
        assert_eq!(s.city, "Uptown");
        assert_eq!(s.state, "IL");
    }

    #[test]
    fn test_decompose_defaults() {
        let place = place_json(r#"{"lat": "x", "lon": "y", "display_name": "Mystery Spot"}"#);
        let s = decompose(&place);
        assert_eq!(s.name, "Mystery Spot");
        assert_eq!(s.street_address, "");
        assert_eq!(s.city, "");
        assert_eq!(s.state, "");
        assert_eq!(s.zip_code, "");
        assert_eq!(s.country, "USA");
        assert_relative_eq!(s.latitude, 0.0);
        assert_relative_eq!(s.longitude, 0.0);
    }

    #[test]
    fn test_us_state_abbreviation() {
        assert_eq!(us_state_abbreviation("New Jersey"), Some("NJ"));
        assert_eq!(us_state_abbreviation("California"), Some("CA"));
        assert_eq!(us_state_abbreviation("Île-de-France"), None);
    }

    struct RecordingLookup {
        queries: RefCell<Vec<String>>,
    }

    impl AddressLookup for RecordingLookup {
        fn search(&self, _address: &str) -> Result<Vec<Place>, LookupError> {
            Ok(vec![])
        }

        fn suggest(&self, query: &str) -> Result<Vec<Place>, LookupError> {
            self.queries.borrow_mut().push(query.to_string());
            Ok(vec![venue("restaurant", "amenity", "Ramen King, New York")])
        }
    }

    #[test]
    fn test_short_query_skips_service() {
        let service = RecordingLookup { queries: RefCell::new(vec![]) };
        let out = fetch_suggestions(&service, "ra").unwrap();
        assert!(out.is_empty());
        assert!(service.queries.borrow().is_empty());

        let out = fetch_suggestions(&service, "ram").unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Ramen King");
        assert_eq!(service.queries.borrow().len(), 1);
    }

    #[test]
    fn test_debouncer_waits_for_quiet_window() {
        let mut debouncer = Debouncer::new();
        let t0 = Instant::now();

        debouncer.input("ramen", t0);
        // Still typing — nothing due inside the window.
        assert!(debouncer.due(t0 + Duration::from_millis(499)).is_none());
        assert_eq!(
            debouncer.due(t0 + Duration::from_millis(500)),
            Some("ramen".to_string())
        );
        // Taken once; nothing left until the next input.
        assert!(debouncer.due(t0 + Duration::from_millis(2000)).is_none());
    }

    #[test]
    fn test_debouncer_newer_input_supersedes() {
        let mut debouncer = Debouncer::new();
        let t0 = Instant::now();

        debouncer.input("ram", t0);
        debouncer.input("ramen ki", t0 + Duration::from_millis(300));

        // The first query's window elapsed, but newer input reset it.
        assert!(debouncer.due(t0 + Duration::from_millis(600)).is_none());
        assert_eq!(
            debouncer.due(t0 + Duration::from_millis(800)),
            Some("ramen ki".to_string())
        );
    }

    #[test]
    fn test_debouncer_short_input_clears_pending() {
        let mut debouncer = Debouncer::new();
        let t0 = Instant::now();

        debouncer.input("ramen", t0);
        debouncer.input("ra", t0 + Duration::from_millis(100));
        assert!(debouncer.due(t0 + Duration::from_secs(5)).is_none());
    }
}
