use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use tablemap::directory::{Coordinates, Cuisine, Location, RestaurantDraft};
use tablemap::filter::{filter_restaurants, Selection};
use tablemap::geocode::suggest::fetch_suggestions;
use tablemap::geocode::{GeocodeCache, GeocodeResolver, NominatimClient};
use tablemap::media::MediaStore;
use tablemap::server;
use tablemap::store::{default_data_dir, RestaurantStore};

/// TableMap — curated restaurant directory engine.
///
/// Browse and manage a hand-picked restaurant list: facet filtering by
/// cuisine and location, forward geocoding of postal addresses with a
/// durable cache and polite rate limiting, venue suggestions, and a small
/// JSON API server for the web frontend.
///
/// Examples:
///   tablemap seed
///   tablemap list --cuisine Thai --cuisine Korean
///   tablemap geocode "456 2nd Avenue, New York, NY 10010"
///   tablemap geocode-all
///   tablemap serve --port 3000
#[derive(Parser)]
#[command(name = "tablemap", version, about, long_about = None)]
struct Cli {
    /// State directory (default ~/.tablemap, or TABLEMAP_DATA_DIR).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List restaurants, newest first, optionally narrowed by facets.
    List {
        /// Cuisine filter; repeat the flag for multi-select.
        #[arg(long = "cuisine")]
        cuisines: Vec<String>,
        /// Location filter; repeat the flag for multi-select.
        #[arg(long = "location")]
        locations: Vec<String>,
        /// Emit JSON instead of the table.
        #[arg(long)]
        json: bool,
    },
    /// Show one restaurant as JSON.
    Show { id: String },
    /// Add a restaurant.
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        /// Cuisine tag; repeat for multiple.
        #[arg(long = "cuisine", required = true)]
        cuisines: Vec<String>,
        #[arg(long)]
        location: String,
        #[arg(long)]
        address: String,
        /// Photo reference; repeat for multiple.
        #[arg(long = "photo")]
        photos: Vec<String>,
        #[arg(long, default_value = "")]
        review: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lng: Option<f64>,
    },
    /// Update fields on an existing restaurant.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        /// Replacement cuisine tags (the full new set).
        #[arg(long = "cuisine")]
        cuisines: Vec<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        address: Option<String>,
        /// Replacement photo references (the full new list).
        #[arg(long = "photo")]
        photos: Vec<String>,
        #[arg(long)]
        review: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lng: Option<f64>,
    },
    /// Remove a restaurant and its stored photos.
    Remove { id: String },
    /// Geocode one address.
    Geocode { address: String },
    /// Geocode every stored restaurant that lacks coordinates,
    /// one request per second.
    GeocodeAll,
    /// Search venue suggestions for a partial name or address.
    Suggest { query: String },
    /// Load the curated seed list into the store.
    Seed,
    /// Run the JSON API server.
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();
    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);

    match cli.command {
        Command::List { cuisines, locations, json } => list(&data_dir, cuisines, locations, json),
        Command::Show { id } => show(&data_dir, &id),
        Command::Add { id, name, cuisines, location, address, photos, review, lat, lng } => {
            add(&data_dir, id, name, cuisines, location, address, photos, review, lat, lng)
        }
        Command::Update { id, name, cuisines, location, address, photos, review, lat, lng } => {
            update(&data_dir, id, name, cuisines, location, address, photos, review, lat, lng)
        }
        Command::Remove { id } => remove(&data_dir, &id),
        Command::Geocode { address } => geocode(&data_dir, &address),
        Command::GeocodeAll => geocode_all(&data_dir),
        Command::Suggest { query } => suggest(&query),
        Command::Seed => seed(&data_dir),
        Command::Serve { host, port } => serve(&host, port, data_dir),
    }
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", msg);
    std::process::exit(1);
}

fn open_store(data_dir: &std::path::Path) -> RestaurantStore {
    RestaurantStore::open_at(data_dir.join("restaurants.json"))
}

fn open_resolver(data_dir: &std::path::Path) -> GeocodeResolver {
    GeocodeResolver::with_parts(
        GeocodeCache::load_from(data_dir.join("geocache.json")),
        NominatimClient::new(),
    )
}

fn parse_values<T: FromStr<Err = String>>(raw: Vec<String>) -> Vec<T> {
    raw.into_iter()
        .map(|s| s.parse::<T>().unwrap_or_else(|e| fail(e)))
        .collect()
}

fn selection_from<T: FromStr<Err = String> + PartialEq + Clone>(raw: Vec<String>) -> Selection<T> {
    if raw.is_empty() {
        Selection::All
    } else {
        Selection::Only(parse_values(raw))
    }
}

fn coordinates_from(lat: Option<f64>, lng: Option<f64>) -> Option<Coordinates> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                fail("Invalid coordinates. Lat: -90..90, Lng: -180..180");
            }
            Some(Coordinates { lat, lng })
        }
        (None, None) => None,
        _ => fail("Provide both --lat and --lng, or neither"),
    }
}

// ─── Subcommands ────────────────────────────────────────────────

fn list(data_dir: &std::path::Path, cuisines: Vec<String>, locations: Vec<String>, json: bool) {
    let store = open_store(data_dir);
    let all = store.list();

    let cuisine_sel: Selection<Cuisine> = selection_from(cuisines);
    let location_sel: Selection<Location> = selection_from(locations);
    let filtered = filter_restaurants(&all, &cuisine_sel, &location_sel);

    if json {
        println!("{}", serde_json::to_string_pretty(&filtered).unwrap_or_else(|e| fail(e)));
        return;
    }

    if filtered.is_empty() {
        eprintln!("  No restaurants match.");
        return;
    }
    for r in filtered {
        let tags: Vec<String> = r.cuisines.iter().map(|c| c.to_string()).collect();
        let coords = match &r.coordinates {
            Some(c) => format!("{:.4}, {:.4}", c.lat, c.lng),
            None => "—".to_string(),
        };
        println!("{:<24} {:<24} {:<22} {:<14} {}", r.id, r.name, tags.join("/"), r.location, coords);
    }
}

fn show(data_dir: &std::path::Path, id: &str) {
    let store = open_store(data_dir);
    match store.get(id) {
        Some(r) => println!("{}", serde_json::to_string_pretty(r).unwrap_or_else(|e| fail(e))),
        None => fail(format!("Restaurant '{}' not found", id)),
    }
}

#[allow(clippy::too_many_arguments)]
fn add(
    data_dir: &std::path::Path,
    id: String,
    name: String,
    cuisines: Vec<String>,
    location: String,
    address: String,
    photos: Vec<String>,
    review: String,
    lat: Option<f64>,
    lng: Option<f64>,
) {
    let draft = RestaurantDraft {
        id,
        name,
        cuisines: parse_values(cuisines),
        location: location.parse().unwrap_or_else(|e: String| fail(e)),
        address,
        photos,
        review,
        coordinates: coordinates_from(lat, lng),
    };

    let mut store = open_store(data_dir);
    let created = store.create(draft).unwrap_or_else(|e| fail(e));
    eprintln!("  Added '{}' ({})", created.name, created.id);
}

#[allow(clippy::too_many_arguments)]
fn update(
    data_dir: &std::path::Path,
    id: String,
    name: Option<String>,
    cuisines: Vec<String>,
    location: Option<String>,
    address: Option<String>,
    photos: Vec<String>,
    review: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
) {
    let mut store = open_store(data_dir);
    let existing = store
        .get(&id)
        .cloned()
        .unwrap_or_else(|| fail(format!("Restaurant '{}' not found", id)));

    // Changing the address invalidates any previously resolved coordinates
    // unless new ones are given explicitly.
    let address_changed = address.as_deref().is_some_and(|a| a != existing.address);
    let coordinates = match coordinates_from(lat, lng) {
        Some(c) => Some(c),
        None if address_changed => None,
        None => existing.coordinates,
    };

    let draft = RestaurantDraft {
        id: id.clone(),
        name: name.unwrap_or(existing.name),
        cuisines: if cuisines.is_empty() { existing.cuisines } else { parse_values(cuisines) },
        location: match location {
            Some(l) => l.parse().unwrap_or_else(|e: String| fail(e)),
            None => existing.location,
        },
        address: address.unwrap_or(existing.address),
        photos: if photos.is_empty() { existing.photos } else { photos },
        review: review.unwrap_or(existing.review),
        coordinates,
    };

    let updated = store.update(&id, draft).unwrap_or_else(|e| fail(e));
    eprintln!("  Updated '{}' ({})", updated.name, updated.id);
}

fn remove(data_dir: &std::path::Path, id: &str) {
    let mut store = open_store(data_dir);
    let removed = store.delete(id).unwrap_or_else(|e| fail(e));

    let media = MediaStore::open_at(data_dir.join("media"));
    if let Err(e) = media.remove_all(id) {
        eprintln!("Warning: failed to delete photos for '{}': {}", id, e);
    }
    eprintln!("  Removed '{}' ({})", removed.name, removed.id);
}

fn geocode(data_dir: &std::path::Path, address: &str) {
    let mut resolver = open_resolver(data_dir);
    let resolved = resolver.resolve(address);
    println!(
        "{:.7}, {:.7}  [{}]",
        resolved.coordinates.lat, resolved.coordinates.lng, resolved.source
    );
}

fn geocode_all(data_dir: &std::path::Path) {
    let mut store = open_store(data_dir);
    let mut resolver = open_resolver(data_dir);

    let restaurants = store.list();
    if restaurants.is_empty() {
        eprintln!("  Store is empty. Try 'tablemap seed' first.");
        return;
    }

    let mut resolved_count = 0;
    let mut fallback_count = 0;

    let outcomes: Vec<_> = resolver.resolve_batch(restaurants).collect();
    for (restaurant, source) in outcomes {
        let coords = match restaurant.coordinates {
            Some(c) => c,
            None => continue,
        };
        eprintln!(
            "  {:<24} {:>10.4}, {:>10.4}  [{}]",
            restaurant.id, coords.lat, coords.lng, source
        );

        if source.is_geocoded() {
            store
                .set_coordinates(&restaurant.id, coords)
                .unwrap_or_else(|e| fail(e));
            resolved_count += 1;
        } else if source.used_network() {
            // Fallback coordinates are display-only; leave the record blank
            // so a later run can retry.
            fallback_count += 1;
        }
    }

    eprintln!("  {} resolved, {} fell back to the default location.", resolved_count, fallback_count);
}

fn suggest(query: &str) {
    let client = NominatimClient::new();
    let suggestions = fetch_suggestions(&client, query).unwrap_or_else(|e| fail(e));

    if suggestions.is_empty() {
        eprintln!("  No suggestions for '{}'.", query);
        return;
    }
    for s in &suggestions {
        println!("{}", s.display_name);
        println!(
            "    {} | {} | {} {} | {} | {:.4}, {:.4}",
            s.street_address, s.city, s.state, s.zip_code, s.country, s.latitude, s.longitude
        );
    }
}

fn seed(data_dir: &std::path::Path) {
    let mut store = open_store(data_dir);
    let added = store.seed().unwrap_or_else(|e| fail(e));
    eprintln!("  Seeded {} restaurants ({} total).", added, store.len());
}

fn serve(host: &str, port: u16, data_dir: PathBuf) {
    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| fail(e));
    runtime.block_on(server::start(host, port, data_dir));
}
