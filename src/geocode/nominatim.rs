//! Nominatim (OpenStreetMap) lookup client.
//!
//! Two query shapes against the same backend: `search` asks for a single
//! best match for a postal address, `suggest` asks for up to ten candidate
//! venues with structured address details for the type-ahead flow.

use super::types::LookupError;
use serde::Deserialize;
use std::time::Duration;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
const USER_AGENT: &str = "TableMap/0.3 (restaurant-directory)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One candidate match from the service. `lat`/`lon` arrive as
/// numeric-looking strings.
#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
    #[serde(default)]
    pub place_id: Option<u64>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub address: Option<AddressDetails>,
}

/// Structured address breakdown (present when addressdetails=1).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressDetails {
    #[serde(default)]
    pub house_number: Option<String>,
    #[serde(default)]
    pub road: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub village: Option<String>,
    #[serde(default)]
    pub suburb: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// The outbound lookup seam. The resolver and the suggestion helper only
/// see this trait, so tests substitute a scripted implementation.
pub trait AddressLookup {
    /// Single best match for a full postal address (limit=1).
    fn search(&self, address: &str) -> Result<Vec<Place>, LookupError>;

    /// Candidate venues for a partial query (limit=10, with address details).
    fn suggest(&self, query: &str) -> Result<Vec<Place>, LookupError>;
}

/// The real HTTP client.
pub struct NominatimClient;

impl NominatimClient {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NominatimClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressLookup for NominatimClient {
    fn search(&self, address: &str) -> Result<Vec<Place>, LookupError> {
        fetch(&search_url(address))
    }

    fn suggest(&self, query: &str) -> Result<Vec<Place>, LookupError> {
        fetch(&suggest_url(query))
    }
}

fn fetch(url: &str) -> Result<Vec<Place>, LookupError> {
    let response = ureq::get(url)
        .set("User-Agent", USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .call()
        .map_err(|e| LookupError::Network(e.to_string()))?;

    response
        .into_json()
        .map_err(|e| LookupError::InvalidResponse(e.to_string()))
}

fn search_url(address: &str) -> String {
    format!("{}?format=json&q={}&limit=1", NOMINATIM_URL, urlencode(address))
}

fn suggest_url(query: &str) -> String {
    format!(
        "{}?q={}&format=json&addressdetails=1&limit=10&accept-language=en",
        NOMINATIM_URL,
        urlencode(query),
    )
}

// ─── URL encoding (minimal, no extra dep) ───────────────────────

fn urlencode(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            ' ' => "%20".to_string(),
            '&' => "%26".to_string(),
            '=' => "%3D".to_string(),
            '+' => "%2B".to_string(),
            ',' => "%2C".to_string(),
            _ if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' || c == '~' => {
                c.to_string()
            }
            _ => {
                let mut buf = [0u8; 4];
                c.encode_utf8(&mut buf)
                    .bytes()
                    .map(|b| format!("%{:02X}", b))
                    .collect()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_shape() {
        let url = search_url("1234 Geary Blvd, San Francisco, CA 94109");
        assert!(url.starts_with("https://nominatim.openstreetmap.org/search?format=json&q="));
        assert!(url.ends_with("&limit=1"));
        assert!(url.contains("1234%20Geary%20Blvd%2C%20San%20Francisco%2C%20CA%2094109"));
    }

    #[test]
    fn test_suggest_url_shape() {
        let url = suggest_url("golden pho");
        assert!(url.contains("q=golden%20pho"));
        assert!(url.contains("&format=json"));
        assert!(url.contains("&addressdetails=1"));
        assert!(url.contains("&limit=10"));
        assert!(url.contains("&accept-language=en"));
    }

    #[test]
    fn test_urlencode() {
        assert_eq!(urlencode("a b"), "a%20b");
        assert_eq!(urlencode("a&b=c"), "a%26b%3Dc");
        assert_eq!(urlencode("safe-._~"), "safe-._~");
        assert_eq!(urlencode("café"), "caf%C3%A9");
    }

    #[test]
    fn test_place_deserialization() {
        let json = r#"[{
            "place_id": 12345,
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
        }]"#;

        let places: Vec<Place> = serde_json::from_str(json).unwrap();
        assert_eq!(places.len(), 1);
        let p = &places[0];
        assert_eq!(p.lat, "37.7674");
        assert_eq!(p.kind.as_deref(), Some("restaurant"));
        assert_eq!(p.category.as_deref(), Some("amenity"));
        let addr = p.address.as_ref().unwrap();
        assert_eq!(addr.house_number.as_deref(), Some("211"));
        assert_eq!(addr.postcode.as_deref(), Some("94103"));
    }

    #[test]
    fn test_place_minimal_fields() {
        // The search shape (no addressdetails) omits most fields.
        let json = r#"[{"lat": "40.7", "lon": "-74.0", "display_name": "Somewhere"}]"#;
        let places: Vec<Place> = serde_json::from_str(json).unwrap();
        assert!(places[0].address.is_none());
        assert!(places[0].kind.is_none());
    }
}
