//! geonames-geocoder - command line geocoding against Geonames
//!
//! This is the composition root that wires together all the components.

use anyhow::Context;
use geonames_geocoder::{
    load_config, GeocodingService, GeonamesGeocoder, Query, ReqwestHttpClient,
};
use std::sync::Arc;
use std::time::Duration;

const USAGE: &str = "usage: geonames-geocoder geocode <place name>
       geonames-geocoder reverse <latitude> <longitude>";

/// Parse command line arguments (without the program name) into a query.
fn parse_query(args: &[String]) -> anyhow::Result<Query> {
    match args.first().map(String::as_str) {
        Some("geocode") if args.len() > 1 => Ok(Query::forward(args[1..].join(" "))),
        Some("reverse") if args.len() == 3 => {
            let latitude: f64 = args[1]
                .parse()
                .with_context(|| format!("invalid latitude {:?}", args[1]))?;
            let longitude: f64 = args[2]
                .parse()
                .with_context(|| format!("invalid longitude {:?}", args[2]))?;
            Ok(Query::reverse(latitude, longitude))
        }
        _ => anyhow::bail!(USAGE),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging (stderr, stdout carries results)
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let query = parse_query(&args)?;

    cfg.validate()?;

    // ===== COMPOSITION ROOT =====

    // 1. Outbound adapters
    let http = Arc::new(ReqwestHttpClient::new(Duration::from_secs(
        cfg.http_timeout_secs,
    ))?);

    let geonames = GeonamesGeocoder::new(http, cfg.username.as_deref())
        .with_locale(cfg.locale())
        .with_max_rows(cfg.max_rows)
        .with_endpoint(cfg.endpoint.clone());

    // 2. Application service
    let service = GeocodingService::new().register(Arc::new(geonames));

    tracing::debug!(
        "querying endpoint={} max_rows={} locale={:?}",
        cfg.endpoint,
        cfg.max_rows,
        cfg.locale
    );

    // 3. Run the query
    let results = service.query(&query).await?;
    tracing::info!("{} result(s)", results.len());

    println!("{}", serde_json::to_string_pretty(&results)?);

    Ok(())
}
