mod geonames_geocoder;
mod reqwest_http_client;

pub use geonames_geocoder::{GeonamesGeocoder, DEFAULT_ENDPOINT, DEFAULT_MAX_ROWS};
pub use reqwest_http_client::ReqwestHttpClient;
