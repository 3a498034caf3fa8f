//! Geonames Geocoder
//!
//! Implements the Geocoder port on top of the Geonames web services
//! (`searchJSON` for place names, `findNearbyPlaceNameJSON` for coordinates).
//!
//! See: https://www.geonames.org/export/web-services.html

use crate::domain::entities::{Address, Bounds};
use crate::domain::error::GeocoderError;
use crate::domain::ports::{Geocoder, HttpClient};
use crate::domain::value_objects::{Coordinates, Locale, Query};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;

/// Public Geonames API endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://api.geonames.org";

/// Default number of rows requested per query.
pub const DEFAULT_MAX_ROWS: usize = 5;

const PROVIDER_NAME: &str = "geonames";

const IP_NOT_SUPPORTED: &str = "The Geonames provider does not support IP addresses.";

/// Geonames status code for authorization failures.
const STATUS_AUTHORIZATION: i64 = 10;

/// Top-level Geonames JSON body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeonamesResponse {
    total_results_count: Option<u64>,
    geonames: Option<Vec<GeonamesRecord>>,
    status: Option<GeonamesStatus>,
}

/// Error payload Geonames returns instead of `geonames`.
#[derive(Debug, Deserialize)]
struct GeonamesStatus {
    #[serde(default)]
    message: String,
    #[serde(default)]
    value: i64,
}

/// A single place record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeonamesRecord {
    #[serde(default, deserialize_with = "lenient_f64")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    lng: Option<f64>,
    name: Option<String>,
    admin_name1: Option<String>,
    admin_code1: Option<String>,
    admin_name2: Option<String>,
    admin_code2: Option<String>,
    country_name: Option<String>,
    country_code: Option<String>,
    timezone: Option<GeonamesTimezone>,
    bbox: Option<GeonamesBbox>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeonamesTimezone {
    time_zone_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeonamesBbox {
    #[serde(default, deserialize_with = "lenient_f64")]
    south: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    west: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    north: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    east: Option<f64>,
}

/// Geonames sends coordinates as strings in search results and as
/// numbers elsewhere. Accept both; unparseable strings become `None`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Number(n)) => Some(n),
        Some(NumberOrString::String(s)) => s.trim().parse().ok(),
        None => None,
    })
}

impl From<GeonamesRecord> for Address {
    fn from(record: GeonamesRecord) -> Self {
        let coordinates = match (record.lat, record.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        };

        let bounds = record
            .bbox
            .map(|b| Bounds {
                south: b.south,
                west: b.west,
                north: b.north,
                east: b.east,
            })
            .unwrap_or_default();

        Address::builder()
            .coordinates(coordinates)
            .bounds(bounds)
            .locality(record.name)
            .admin_level(1, record.admin_name1, record.admin_code1)
            .admin_level(2, record.admin_name2, record.admin_code2)
            .country(record.country_name)
            .country_code(record.country_code)
            .timezone(record.timezone.and_then(|t| t.time_zone_id))
            .build()
    }
}

/// Geocoder backed by the Geonames web services.
///
/// Requires a Geonames account username. Without one every call fails
/// with [`GeocoderError::InvalidCredentials`].
pub struct GeonamesGeocoder {
    http: Arc<dyn HttpClient>,
    username: Option<String>,
    locale: Option<Locale>,
    max_rows: usize,
    endpoint: String,
}

impl GeonamesGeocoder {
    /// Create a provider. A blank username is treated as missing.
    pub fn new(http: Arc<dyn HttpClient>, username: Option<&str>) -> Self {
        Self {
            http,
            username: username
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
            locale: None,
            max_rows: DEFAULT_MAX_ROWS,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Set the locale used for localized place names.
    pub fn with_locale(mut self, locale: Option<Locale>) -> Self {
        self.locale = locale;
        self
    }

    /// Set the maximum number of rows returned per query (at least 1).
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows.max(1);
        self
    }

    /// Override the API base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    fn username(&self) -> Result<&str, GeocoderError> {
        self.username.as_deref().ok_or_else(GeocoderError::no_username)
    }

    /// Build the `searchJSON` URL for a place name.
    pub fn geocode_url(&self, username: &str, address: &str) -> String {
        let url = format!(
            "{}/searchJSON?q={}&maxRows={}&style=full&username={}",
            self.endpoint,
            encode(address),
            self.max_rows,
            encode(username)
        );
        self.localize(url)
    }

    /// Build the `findNearbyPlaceNameJSON` URL for a coordinate pair.
    pub fn reverse_url(&self, username: &str, coordinates: Coordinates) -> String {
        let url = format!(
            "{}/findNearbyPlaceNameJSON?lat={:.6}&lng={:.6}&style=full&maxRows={}&username={}",
            self.endpoint,
            coordinates.latitude,
            coordinates.longitude,
            self.max_rows,
            encode(username)
        );
        self.localize(url)
    }

    fn localize(&self, url: String) -> String {
        match &self.locale {
            Some(locale) => format!("{}&lang={}", url, encode(locale.language())),
            None => url,
        }
    }

    /// Fetch `url` and turn the body into addresses.
    async fn execute_query(&self, url: String) -> Result<Vec<Address>, GeocoderError> {
        tracing::debug!("geonames query {}", url);

        let body = match self.http.get(&url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("geonames request failed: {}", e);
                return Err(GeocoderError::could_not_execute(&url));
            }
        };

        if body.trim().is_empty() {
            return Err(GeocoderError::could_not_execute(&url));
        }

        let response: GeonamesResponse = match serde_json::from_str(&body) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("failed to parse geonames response: {}", e);
                return Err(GeocoderError::could_not_execute(&url));
            }
        };

        if let Some(status) = response.status {
            tracing::warn!(
                "geonames returned status {}: {}",
                status.value,
                status.message
            );
            return Err(status_error(&status, &url));
        }

        let records = response.geonames.unwrap_or_default();
        if records.is_empty() {
            return Err(GeocoderError::no_places(&url));
        }

        tracing::debug!(
            "geonames returned {} records (total={:?})",
            records.len(),
            response.total_results_count
        );

        Ok(records
            .into_iter()
            .take(self.max_rows)
            .map(Address::from)
            .collect())
    }
}

fn status_error(status: &GeonamesStatus, url: &str) -> GeocoderError {
    let message = status.message.trim();
    if status.value == STATUS_AUTHORIZATION {
        GeocoderError::InvalidCredentials(message.to_string())
    } else {
        GeocoderError::NoResult(format!(
            "Geonames error {} ({}) for query \"{}\".",
            status.value, message, url
        ))
    }
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[async_trait]
impl Geocoder for GeonamesGeocoder {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn geocode(&self, address: &str) -> Result<Vec<Address>, GeocoderError> {
        let username = self.username()?;

        if Query::forward(address).is_ip_address() {
            return Err(GeocoderError::UnsupportedOperation(
                IP_NOT_SUPPORTED.to_string(),
            ));
        }

        let url = self.geocode_url(username, address);
        self.execute_query(url).await
    }

    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Vec<Address>, GeocoderError> {
        let username = self.username()?;
        let url = self.reverse_url(username, Coordinates::new(latitude, longitude));
        self.execute_query(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::HttpError;
    use std::sync::Mutex;
    use tracing_test::traced_test;

    // ===== Test Doubles =====

    /// Returns a fixed response and records every requested URL.
    struct StubHttpClient {
        response: Option<String>,
        requests: Mutex<Vec<String>>,
    }

    impl StubHttpClient {
        fn returning(body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Some(body.to_string()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                response: None,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpClient for StubHttpClient {
        async fn get(&self, url: &str) -> Result<String, HttpError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.response
                .clone()
                .ok_or_else(|| HttpError::Transport("connection refused".to_string()))
        }
    }

    fn provider(http: Arc<StubHttpClient>) -> GeonamesGeocoder {
        GeonamesGeocoder::new(http, Some("username"))
    }

    const LONDON_RESPONSE: &str = r#"{
        "totalResultsCount": 3,
        "geonames": [
            {
                "lat": "51.50853", "lng": "-0.12574",
                "name": "London",
                "adminName1": "England", "adminCode1": "ENG",
                "adminName2": "Greater London", "adminCode2": "GLA",
                "countryName": "United Kingdom", "countryCode": "GB",
                "timezone": {"timeZoneId": "Europe/London", "gmtOffset": 0},
                "bbox": {"south": 51.15169, "west": -0.70361, "north": 51.86537, "east": 0.45212}
            },
            {
                "lat": "42.98339", "lng": "-81.23304",
                "name": "London",
                "adminName1": "Ontario",
                "adminName2": "",
                "countryName": "Canada", "countryCode": "CA",
                "timezone": {"timeZoneId": "America/Toronto"},
                "bbox": {"south": 42.90707, "west": -81.33748, "north": 43.05970}
            },
            {
                "lat": 41.35565, "lng": -72.09952,
                "name": "New London",
                "adminName1": "Connecticut",
                "adminName2": "New London County",
                "countryName": "United States", "countryCode": "US"
            }
        ]
    }"#;

    // ===== Metadata =====

    #[test]
    fn test_name() {
        let geocoder = provider(StubHttpClient::failing());
        assert_eq!(geocoder.name(), "geonames");
    }

    #[test]
    fn test_defaults() {
        let geocoder = provider(StubHttpClient::failing());
        assert_eq!(geocoder.max_rows(), 5);
        assert!(geocoder.locale().is_none());
    }

    #[test]
    fn test_max_rows_at_least_one() {
        let geocoder = provider(StubHttpClient::failing()).with_max_rows(0);
        assert_eq!(geocoder.max_rows(), 1);
    }

    // ===== Credentials =====

    #[tokio::test]
    async fn test_geocode_without_username() {
        let http = StubHttpClient::failing();
        let geocoder = GeonamesGeocoder::new(http.clone(), None);

        let err = geocoder.geocode("foo").await.unwrap_err();
        assert_eq!(err, GeocoderError::InvalidCredentials("No username provided.".into()));
        assert!(http.requests().is_empty());
    }

    #[tokio::test]
    async fn test_reverse_without_username() {
        let http = StubHttpClient::failing();
        let geocoder = GeonamesGeocoder::new(http.clone(), None);

        let err = geocoder.reverse(1.0, 2.0).await.unwrap_err();
        assert_eq!(err.to_string(), "No username provided.");
        assert!(matches!(err, GeocoderError::InvalidCredentials(_)));
        assert!(http.requests().is_empty());
    }

    #[tokio::test]
    async fn test_blank_username_is_missing() {
        let geocoder = GeonamesGeocoder::new(StubHttpClient::failing(), Some("  "));
        let err = geocoder.geocode("foo").await.unwrap_err();
        assert!(matches!(err, GeocoderError::InvalidCredentials(_)));
    }

    // ===== IP addresses =====

    #[tokio::test]
    async fn test_geocode_localhost_ipv4_unsupported() {
        let http = StubHttpClient::failing();
        let geocoder = provider(http.clone());

        let err = geocoder.geocode("127.0.0.1").await.unwrap_err();
        assert_eq!(
            err,
            GeocoderError::UnsupportedOperation(
                "The Geonames provider does not support IP addresses.".into()
            )
        );
        assert!(http.requests().is_empty());
    }

    #[tokio::test]
    async fn test_geocode_localhost_ipv6_unsupported() {
        let http = StubHttpClient::failing();
        let geocoder = provider(http.clone());

        let err = geocoder.geocode("::1").await.unwrap_err();
        assert!(matches!(err, GeocoderError::UnsupportedOperation(_)));
        assert!(http.requests().is_empty());
    }

    // ===== URL building =====

    #[test]
    fn test_geocode_url() {
        let geocoder = provider(StubHttpClient::failing());
        assert_eq!(
            geocoder.geocode_url("username", "New York"),
            "http://api.geonames.org/searchJSON?q=New+York&maxRows=5&style=full&username=username"
        );
    }

    #[test]
    fn test_geocode_url_encodes_special_characters() {
        let geocoder = provider(StubHttpClient::failing());
        let url = geocoder.geocode_url("username", "Città & Co");
        assert!(url.contains("q=Citt%C3%A0+%26+Co&"), "url was {}", url);
    }

    #[test]
    fn test_reverse_url_formats_six_decimals() {
        let geocoder = provider(StubHttpClient::failing());
        assert_eq!(
            geocoder.reverse_url("username", Coordinates::new(-80.0, -170.0)),
            "http://api.geonames.org/findNearbyPlaceNameJSON?lat=-80.000000&lng=-170.000000&style=full&maxRows=5&username=username"
        );
    }

    #[test]
    fn test_url_with_locale_and_endpoint() {
        let geocoder = provider(StubHttpClient::failing())
            .with_locale(Locale::parse("it_IT"))
            .with_endpoint("http://localhost:8080/")
            .with_max_rows(3);
        assert_eq!(
            geocoder.geocode_url("username", "London"),
            "http://localhost:8080/searchJSON?q=London&maxRows=3&style=full&username=username&lang=it"
        );
    }

    // ===== Failures =====

    #[tokio::test]
    async fn test_geocode_null_with_failing_transport() {
        let http = StubHttpClient::failing();
        let geocoder = provider(http.clone());

        let err = geocoder
            .query(&Query::Forward { text: None })
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not execute query \"http://api.geonames.org/searchJSON?q=&maxRows=5&style=full&username=username\"."
        );
        assert_eq!(http.requests().len(), 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_transport_failure_is_logged() {
        let geocoder = provider(StubHttpClient::failing());

        let _ = geocoder.geocode("London").await;
        assert!(logs_contain("geonames request failed"));
        assert!(logs_contain("connection refused"));
    }

    #[tokio::test]
    async fn test_reverse_with_failing_transport() {
        let geocoder = provider(StubHttpClient::failing());

        let err = geocoder.reverse(-80.0, -170.0).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not execute query \"http://api.geonames.org/findNearbyPlaceNameJSON?lat=-80.000000&lng=-170.000000&style=full&maxRows=5&username=username\"."
        );
    }

    #[tokio::test]
    async fn test_geocode_unknown_city() {
        let http = StubHttpClient::returning(r#"{"totalResultsCount": 0, "geonames": []}"#);
        let geocoder = provider(http);

        let err = geocoder.geocode("BlaBlaBla").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "No places found for query \"http://api.geonames.org/searchJSON?q=BlaBlaBla&maxRows=5&style=full&username=username\"."
        );
    }

    #[tokio::test]
    async fn test_reverse_bad_coordinates() {
        let geocoder = provider(StubHttpClient::returning(r#"{"geonames": []}"#));

        let err = geocoder.reverse(-80.0, -170.0).await.unwrap_err();
        assert!(err.is_no_result());
        assert!(err.to_string().contains("lat=-80.000000&lng=-170.000000"));
    }

    #[tokio::test]
    async fn test_missing_geonames_array_is_no_result() {
        let geocoder = provider(StubHttpClient::returning(r#"{"totalResultsCount": 0}"#));
        let err = geocoder.geocode("foo").await.unwrap_err();
        assert!(err.to_string().starts_with("No places found"));
    }

    #[tokio::test]
    async fn test_empty_body_is_no_result() {
        let geocoder = provider(StubHttpClient::returning("   "));
        let err = geocoder.geocode("foo").await.unwrap_err();
        assert!(err.to_string().starts_with("Could not execute query"));
    }

    #[tokio::test]
    async fn test_invalid_json_is_no_result() {
        let geocoder = provider(StubHttpClient::returning("<html>oops</html>"));
        let err = geocoder.geocode("foo").await.unwrap_err();
        assert!(err.to_string().starts_with("Could not execute query"));
    }

    #[tokio::test]
    async fn test_authorization_status_is_invalid_credentials() {
        let body = r#"{"status": {"message": "user account not enabled to use the free webservice.", "value": 10}}"#;
        let geocoder = provider(StubHttpClient::returning(body));

        let err = geocoder.geocode("London").await.unwrap_err();
        assert_eq!(
            err,
            GeocoderError::InvalidCredentials(
                "user account not enabled to use the free webservice.".into()
            )
        );
    }

    #[tokio::test]
    async fn test_other_status_is_no_result_with_url() {
        let body = r#"{"status": {"message": "the hourly limit of 1000 credits has been exceeded.", "value": 19}}"#;
        let geocoder = provider(StubHttpClient::returning(body));

        let err = geocoder.geocode("London").await.unwrap_err();
        assert!(err.is_no_result());
        let message = err.to_string();
        assert!(message.contains("hourly limit"));
        assert!(message.contains("searchJSON?q=London"));
    }

    // ===== Mapping =====

    #[tokio::test]
    async fn test_geocode_maps_records_in_order() {
        let geocoder = provider(StubHttpClient::returning(LONDON_RESPONSE));

        let results = geocoder.geocode("London").await.unwrap();
        assert_eq!(results.len(), 3);

        let first = &results[0];
        assert_eq!(first.latitude(), Some(51.50853));
        assert_eq!(first.longitude(), Some(-0.12574));
        assert!(first.bounds().is_defined());
        assert_eq!(first.bounds().south, Some(51.15169));
        assert_eq!(first.bounds().west, Some(-0.70361));
        assert_eq!(first.bounds().north, Some(51.86537));
        assert_eq!(first.bounds().east, Some(0.45212));
        assert_eq!(first.locality(), Some("London"));
        assert_eq!(first.county(), "Greater London");
        assert_eq!(first.region(), "England");
        assert_eq!(first.admin_level(2).unwrap().code.as_deref(), Some("GLA"));
        assert_eq!(first.country(), Some("United Kingdom"));
        assert_eq!(first.country_code(), Some("GB"));
        assert_eq!(first.timezone(), Some("Europe/London"));

        let second = &results[1];
        assert_eq!(second.county(), "");
        assert_eq!(second.region(), "Ontario");
        assert_eq!(second.country_code(), Some("CA"));
        assert!(!second.bounds().is_defined());
        assert_eq!(second.bounds().north, Some(43.05970));

        let third = &results[2];
        assert_eq!(third.locality(), Some("New London"));
        assert_eq!(third.latitude(), Some(41.35565));
        assert!(!third.bounds().is_defined());
        assert_eq!(third.timezone(), None);
    }

    #[tokio::test]
    async fn test_geocode_truncates_to_max_rows() {
        let geocoder = provider(StubHttpClient::returning(LONDON_RESPONSE)).with_max_rows(2);

        let results = geocoder.geocode("London").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].country_code(), Some("GB"));
        assert_eq!(results[1].country_code(), Some("CA"));
    }

    #[tokio::test]
    async fn test_reverse_maps_single_record() {
        let body = r#"{"geonames": [{
            "lat": "51.50853", "lng": "-0.12574", "name": "Londra",
            "adminName1": "Inghilterra", "adminName2": "Greater London",
            "countryName": "Regno Unito", "countryCode": "GB",
            "timezone": {"timeZoneId": "Europe/London"}
        }]}"#;
        let http = StubHttpClient::returning(body);
        let geocoder = provider(http.clone()).with_locale(Locale::parse("it_IT"));

        let results = geocoder.reverse(51.50853, -0.12574).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].locality(), Some("Londra"));
        assert_eq!(results[0].region(), "Inghilterra");
        assert_eq!(results[0].country(), Some("Regno Unito"));
        assert_eq!(results[0].latitude(), Some(51.50853));

        let requests = http.requests();
        assert_eq!(
            requests[0],
            "http://api.geonames.org/findNearbyPlaceNameJSON?lat=51.508530&lng=-0.125740&style=full&maxRows=5&username=username&lang=it"
        );
    }

    #[tokio::test]
    async fn test_unparseable_coordinates_are_absent() {
        let body = r#"{"geonames": [{"lat": "n/a", "lng": "1.0", "name": "Nowhere"}]}"#;
        let geocoder = provider(StubHttpClient::returning(body));

        let results = geocoder.geocode("Nowhere").await.unwrap();
        assert_eq!(results[0].coordinates(), None);
        assert_eq!(results[0].locality(), Some("Nowhere"));
    }

    #[tokio::test]
    async fn test_query_dispatches_reverse() {
        let http = StubHttpClient::failing();
        let geocoder = provider(http.clone());

        let _ = geocoder.query(&Query::reverse(1.5, 2.5)).await;
        assert!(http.requests()[0].contains("findNearbyPlaceNameJSON?lat=1.500000&lng=2.500000"));
    }

    #[test]
    fn test_geocoder_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GeonamesGeocoder>();
    }
}
