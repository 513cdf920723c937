mod handlers;
mod state;

use axum::routing::{get, post};
use axum::Router;
use state::AppState;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use crate::geocode::{GeocodeCache, GeocodeResolver, NominatimClient};
use crate::media::MediaStore;
use crate::store::RestaurantStore;

pub fn build_router(data_dir: PathBuf, admin_token: Option<String>) -> Router {
    let state = Arc::new(AppState {
        store: Mutex::new(RestaurantStore::open_at(data_dir.join("restaurants.json"))),
        resolver: Mutex::new(GeocodeResolver::with_parts(
            GeocodeCache::load_from(data_dir.join("geocache.json")),
            NominatimClient::new(),
        )),
        lookup: NominatimClient::new(),
        media: MediaStore::open_at(data_dir.join("media")),
        admin_token,
    });

    Router::new()
        .route(
            "/api/restaurants",
            get(handlers::list_restaurants).post(handlers::create_restaurant),
        )
        .route(
            "/api/restaurants/{id}",
            get(handlers::get_restaurant)
                .put(handlers::update_restaurant)
                .delete(handlers::delete_restaurant),
        )
        .route("/api/geocode", post(handlers::geocode_address))
        .route("/api/suggest", get(handlers::suggest_places))
        .route("/api/photos", post(handlers::upload_photo))
        .route("/media/{id}/{file}", get(handlers::serve_photo))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, data_dir: PathBuf) {
    let admin_token = std::env::var("TABLEMAP_ADMIN_TOKEN").ok().filter(|t| !t.is_empty());
    if admin_token.is_none() {
        eprintln!("  Warning: TABLEMAP_ADMIN_TOKEN is not set; admin endpoints are disabled.");
    }

    let app = build_router(data_dir, admin_token);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: Cannot bind to {}: {}", addr, e);
            std::process::exit(1);
        });

    eprintln!("  TableMap server listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app).await.unwrap_or_else(|e| {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    });
}
