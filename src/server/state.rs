use crate::geocode::{GeocodeResolver, NominatimClient};
use crate::media::MediaStore;
use crate::store::RestaurantStore;
use std::sync::Mutex;

pub struct AppState {
    pub store: Mutex<RestaurantStore>,
    pub resolver: Mutex<GeocodeResolver<NominatimClient>>,
    pub lookup: NominatimClient,
    pub media: MediaStore,
    pub admin_token: Option<String>,
}
