//! Restaurant entities and the fixed facet enumerations.
//!
//! A restaurant carries one or more cuisine tags and exactly one location
//! tag; both are closed enumerations, which is what makes the sidebar
//! filters enumerable. Coordinates are optional — entries without them are
//! filled in by the geocoder at view time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A latitude/longitude pair in floating-point degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Cuisine facet values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cuisine {
    Chinese,
    Vietnamese,
    Burmese,
    Korean,
    Japanese,
    Indian,
    Taiwanese,
    Thai,
}

impl Cuisine {
    pub const VALUES: [Cuisine; 8] = [
        Cuisine::Chinese,
        Cuisine::Vietnamese,
        Cuisine::Burmese,
        Cuisine::Korean,
        Cuisine::Japanese,
        Cuisine::Indian,
        Cuisine::Taiwanese,
        Cuisine::Thai,
    ];
}

impl fmt::Display for Cuisine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Cuisine::Chinese => "Chinese",
            Cuisine::Vietnamese => "Vietnamese",
            Cuisine::Burmese => "Burmese",
            Cuisine::Korean => "Korean",
            Cuisine::Japanese => "Japanese",
            Cuisine::Indian => "Indian",
            Cuisine::Taiwanese => "Taiwanese",
            Cuisine::Thai => "Thai",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Cuisine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chinese" => Ok(Cuisine::Chinese),
            "vietnamese" => Ok(Cuisine::Vietnamese),
            "burmese" => Ok(Cuisine::Burmese),
            "korean" => Ok(Cuisine::Korean),
            "japanese" => Ok(Cuisine::Japanese),
            "indian" => Ok(Cuisine::Indian),
            "taiwanese" => Ok(Cuisine::Taiwanese),
            "thai" => Ok(Cuisine::Thai),
            other => Err(format!("Unknown cuisine '{}'", other)),
        }
    }
}

/// Location facet values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    #[serde(rename = "San Francisco")]
    SanFrancisco,
    #[serde(rename = "Bay Area")]
    BayArea,
    #[serde(rename = "New York")]
    NewYork,
    Chicago,
    #[serde(rename = "New Jersey")]
    NewJersey,
}

impl Location {
    pub const VALUES: [Location; 5] = [
        Location::SanFrancisco,
        Location::BayArea,
        Location::NewYork,
        Location::Chicago,
        Location::NewJersey,
    ];
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Location::SanFrancisco => "San Francisco",
            Location::BayArea => "Bay Area",
            Location::NewYork => "New York",
            Location::Chicago => "Chicago",
            Location::NewJersey => "New Jersey",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "san francisco" | "sf" => Ok(Location::SanFrancisco),
            "bay area" => Ok(Location::BayArea),
            "new york" | "ny" | "nyc" => Ok(Location::NewYork),
            "chicago" => Ok(Location::Chicago),
            "new jersey" | "nj" => Ok(Location::NewJersey),
            other => Err(format!("Unknown location '{}'", other)),
        }
    }
}

/// A stored restaurant record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub cuisines: Vec<Cuisine>,
    pub location: Location,
    pub address: String,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub review: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Restaurant fields as entered in the admin form — everything except the
/// store-managed timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantDraft {
    pub id: String,
    pub name: String,
    pub cuisines: Vec<Cuisine>,
    pub location: Location,
    pub address: String,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub review: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

impl RestaurantDraft {
    /// Check the invariants the store refuses to persist without.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("id must not be empty".into());
        }
        if self.name.trim().is_empty() {
            return Err("name must not be empty".into());
        }
        if self.cuisines.is_empty() {
            return Err("at least one cuisine is required".into());
        }
        Ok(())
    }
}

// ─── Seed dataset ───────────────────────────────────────────────

/// A curated seed entry.
pub struct SeedRestaurant {
    pub id: &'static str,
    pub name: &'static str,
    pub cuisines: &'static [Cuisine],
    pub location: Location,
    pub address: &'static str,
    pub photos: &'static [&'static str],
    pub review: &'static str,
}

impl SeedRestaurant {
    pub fn to_draft(&self) -> RestaurantDraft {
        RestaurantDraft {
            id: self.id.to_string(),
            name: self.name.to_string(),
            cuisines: self.cuisines.to_vec(),
            location: self.location,
            address: self.address.to_string(),
            photos: self.photos.iter().map(|p| p.to_string()).collect(),
            review: self.review.to_string(),
            coordinates: None,
        }
    }
}

/// The original curated tour list.
pub const SEED_RESTAURANTS: &[SeedRestaurant] = &[
    SeedRestaurant {
        id: "golden-pho-sf",
        name: "Golden Pho House",
        cuisines: &[Cuisine::Vietnamese],
        location: Location::SanFrancisco,
        address: "1234 Geary Blvd, San Francisco, CA 94109",
        photos: &["/placeholder-restaurant.jpg"],
        review: "Authentic Vietnamese pho with rich broth and fresh herbs. The grilled pork banh mi is also exceptional. A San Francisco staple for Vietnamese cuisine.",
    },
    SeedRestaurant {
        id: "burma-love-sf",
        name: "Burma Love",
        cuisines: &[Cuisine::Burmese],
        location: Location::SanFrancisco,
        address: "211 Valencia St, San Francisco, CA 94103",
        photos: &["/placeholder-restaurant.jpg"],
        review: "Incredible Burmese tea leaf salad and coconut rice. The fermented tea leaves create a unique, addictive flavor. Don't miss the samusa soup!",
    },
    SeedRestaurant {
        id: "taj-india-bayarea",
        name: "Taj India Cuisine",
        cuisines: &[Cuisine::Indian],
        location: Location::BayArea,
        address: "2390 El Camino Real, Palo Alto, CA 94306",
        photos: &["/placeholder-restaurant.jpg"],
        review: "Outstanding Indian cuisine with perfectly spiced curries and fluffy naan bread. The butter chicken and garlic naan are phenomenal. Great vegetarian options too.",
    },
    SeedRestaurant {
        id: "han-bbq-bayarea",
        name: "Han Il Kwan",
        cuisines: &[Cuisine::Korean],
        location: Location::BayArea,
        address: "1802 W El Camino Real, Mountain View, CA 94040",
        photos: &["/placeholder-restaurant.jpg"],
        review: "Premium Korean BBQ with high-quality meats and excellent banchan. The marinated galbi is tender and flavorful. Service is attentive and the atmosphere is lively.",
    },
    SeedRestaurant {
        id: "ramen-king-ny",
        name: "Ramen King",
        cuisines: &[Cuisine::Japanese],
        location: Location::NewYork,
        address: "128 East 7th Street, New York, NY 10009",
        photos: &["/placeholder-restaurant.jpg"],
        review: "Rich tonkotsu ramen with perfectly cooked noodles and melt-in-your-mouth chashu pork. The broth is creamy and deeply flavorful. Get the spicy miso version!",
    },
    SeedRestaurant {
        id: "thai-street-ny",
        name: "Bangkok Street Food",
        cuisines: &[Cuisine::Thai],
        location: Location::NewYork,
        address: "456 2nd Avenue, New York, NY 10010",
        photos: &["/placeholder-restaurant.jpg"],
        review: "Authentic Thai street food in the heart of NYC. The pad thai has the perfect balance of sweet, sour, and savory. The green curry is aromatic and packed with flavor.",
    },
    SeedRestaurant {
        id: "peking-house-ny",
        name: "Peking House",
        cuisines: &[Cuisine::Chinese],
        location: Location::NewYork,
        address: "890 Broadway, New York, NY 10003",
        photos: &["/placeholder-restaurant.jpg"],
        review: "Traditional Chinese cuisine with excellent Peking duck and hand-pulled noodles. The soup dumplings are delicate and flavorful. A New York Chinatown institution.",
    },
    SeedRestaurant {
        id: "taiwan-cafe-chicago",
        name: "Taiwan Café & Boba",
        cuisines: &[Cuisine::Taiwanese],
        location: Location::Chicago,
        address: "2345 N Clark St, Chicago, IL 60614",
        photos: &["/placeholder-restaurant.jpg"],
        review: "Delicious Taiwanese comfort food with amazing beef noodle soup and scallion pancakes. The boba tea is perfectly sweet with chewy tapioca pearls. Cozy atmosphere.",
    },
    SeedRestaurant {
        id: "hot-pot-palace-chicago",
        name: "Hot Pot Palace",
        cuisines: &[Cuisine::Chinese],
        location: Location::Chicago,
        address: "789 W Argyle St, Chicago, IL 60640",
        photos: &["/placeholder-restaurant.jpg"],
        review: "All-you-can-eat hot pot with a huge selection of meats, vegetables, and broths. The spicy Szechuan broth is incredibly flavorful. Perfect for groups and cold Chicago nights!",
    },
    SeedRestaurant {
        id: "saigon-kitchen-chicago",
        name: "Saigon Kitchen",
        cuisines: &[Cuisine::Vietnamese],
        location: Location::Chicago,
        address: "4012 N Broadway, Chicago, IL 60613",
        photos: &["/placeholder-restaurant.jpg"],
        review: "Family-run Vietnamese restaurant with authentic pho and banh mi. The spring rolls are fresh and the peanut sauce is addictive. Great prices and generous portions.",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuisine_roundtrip() {
        for c in Cuisine::VALUES {
            let parsed: Cuisine = c.to_string().parse().unwrap();
            assert_eq!(parsed, c);
        }
    }

    #[test]
    fn test_location_roundtrip() {
        for l in Location::VALUES {
            let parsed: Location = l.to_string().parse().unwrap();
            assert_eq!(parsed, l);
        }
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("thai".parse::<Cuisine>().unwrap(), Cuisine::Thai);
        assert_eq!("BAY AREA".parse::<Location>().unwrap(), Location::BayArea);
        assert!("klingon".parse::<Cuisine>().is_err());
    }

    #[test]
    fn test_location_serde_rename() {
        let json = serde_json::to_string(&Location::SanFrancisco).unwrap();
        assert_eq!(json, "\"San Francisco\"");
        let back: Location = serde_json::from_str("\"New Jersey\"").unwrap();
        assert_eq!(back, Location::NewJersey);
    }

    #[test]
    fn test_seed_entries_valid() {
        assert_eq!(SEED_RESTAURANTS.len(), 10);
        for seed in SEED_RESTAURANTS {
            let draft = seed.to_draft();
            draft.validate().unwrap();
            assert!(draft.coordinates.is_none());
        }
    }

    #[test]
    fn test_draft_validation() {
        let mut draft = SEED_RESTAURANTS[0].to_draft();
        draft.cuisines.clear();
        assert!(draft.validate().is_err());

        let mut draft = SEED_RESTAURANTS[0].to_draft();
        draft.id = "  ".into();
        assert!(draft.validate().is_err());
    }
}
