mod geocoder;
mod http_client;

pub use geocoder::Geocoder;
pub use http_client::HttpClient;
