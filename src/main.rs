use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::{error, info};

mod adsb;
mod aircraft;
mod closest;
mod config;
mod console;
mod geo;
mod json;
mod logging;
mod paths;
mod units;

use adsb::FeedClient;
use aircraft::{LookupClient, SquawkKind};
use closest::{ClosestAircraftState, Resolver, SharedClosest, Worker};
use config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "closest-aircraft")]
#[command(about = "Track the aircraft closest to you from a dump1090 feed", long_about = None)]
struct Args {
    /// Config file (default: platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// dump1090 host, overrides the config file
    #[arg(long)]
    host: Option<String>,

    /// Observer latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Observer longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Run a single refresh cycle, print the result and exit
    #[arg(long)]
    once: bool,

    /// With --once, print the record as JSON
    #[arg(long, requires = "once")]
    json: bool,
}

impl Args {
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.feed.host = host.clone();
        }
        if let Some(lat) = self.lat {
            config.observer.latitude = lat;
        }
        if let Some(lon) = self.lon {
            config.observer.longitude = lon;
        }
    }
}

/// `--json` output: the published record plus the derived squawk meaning and alert flag.
#[derive(Serialize)]
struct JsonRecord<'a> {
    #[serde(flatten)]
    state: &'a ClosestAircraftState,
    squawk_kind: SquawkKind,
    within_alert_radius: bool,
}

impl<'a> JsonRecord<'a> {
    fn new(state: &'a ClosestAircraftState, alert_radius_km: f64) -> Self {
        Self {
            state,
            squawk_kind: state.squawk_kind(),
            within_alert_radius: state.within_alert_radius(alert_radius_km),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let (mut config, origin) = config::load_config(args.config.as_deref());
    args.apply_to(&mut config);
    logging::init_logging(&config.logging.level);
    origin.log();

    let resolver = match build_resolver(&config) {
        Ok(resolver) => resolver,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let cell = SharedClosest::new(config.alert.radius_km);

    if args.once {
        return run_once(&resolver, &cell, args.json).await;
    }

    let observer = resolver.observer();
    info!("Observer at {:.4}, {:.4}", observer.latitude, observer.longitude);
    let worker = match Worker::start(resolver, cell.clone(), config.refresh_interval()) {
        Ok(worker) => worker,
        Err(e) => {
            error!("Failed to start refresh worker: {}", e);
            return ExitCode::FAILURE;
        }
    };

    console::run(&cell, console::FRAME_INTERVAL).await;

    info!("Shutting down");
    drop(worker);
    ExitCode::SUCCESS
}

fn build_resolver(config: &AppConfig) -> Result<Resolver<FeedClient, LookupClient>, adsb::FetchError> {
    let feed = FeedClient::new(config.feed_url(), config.feed_timeout())?;
    info!("Polling {}", feed.url());
    let lookup = if config.lookup.enabled {
        let lookup = LookupClient::new(config.lookup.base_url.clone(), config.lookup_timeout())?;
        info!("Metadata lookups via {}", lookup.url_for("<hex>"));
        Some(lookup)
    } else {
        None
    };
    Ok(Resolver::new(config.observer(), feed, lookup))
}

async fn run_once(
    resolver: &Resolver<FeedClient, LookupClient>,
    cell: &SharedClosest,
    as_json: bool,
) -> ExitCode {
    if let Err(e) = resolver.refresh(cell).await {
        error!("Refresh failed: {}", e);
        return ExitCode::FAILURE;
    }

    let state = cell.snapshot();
    if as_json {
        match serde_json::to_string_pretty(&JsonRecord::new(&state, cell.alert_radius_km())) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("Failed to encode record: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", console::render(&state, cell.within_alert_radius()));
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::parse_from([
            "closest-aircraft",
            "--host",
            "piaware.local",
            "--lat",
            "-33.9461",
            "--lon",
            "151.1772",
        ]);
        let mut config = AppConfig::default();
        args.apply_to(&mut config);

        assert_eq!(config.feed.host, "piaware.local");
        assert_eq!(config.observer.latitude, -33.9461);
        assert_eq!(config.observer.longitude, 151.1772);
        assert!(!args.once);
    }

    #[test]
    fn test_json_requires_once() {
        assert!(Args::try_parse_from(["closest-aircraft", "--json"]).is_err());
        assert!(Args::try_parse_from(["closest-aircraft", "--once", "--json"]).is_ok());
    }

    #[test]
    fn test_json_record_carries_squawk_kind_and_alert() {
        let position: adsb::AircraftPosition = serde_json::from_value(serde_json::json!({
            "hex": "406b2f", "flight": "EZY12AB", "squawk": "7700", "lat": 51.51, "lon": -0.12
        }))
        .unwrap();
        let state = ClosestAircraftState::tracking(&position, 1.4, 20.0, chrono::Utc::now());

        let value = serde_json::to_value(JsonRecord::new(&state, 5.0)).unwrap();

        assert_eq!(value["hex"], "406b2f");
        assert_eq!(value["status"], "tracking");
        assert_eq!(value["squawk_kind"], "General");
        assert_eq!(value["within_alert_radius"], true);

        let far = serde_json::to_value(JsonRecord::new(&state, 1.0)).unwrap();
        assert_eq!(far["within_alert_radius"], false);
    }

    #[test]
    fn test_build_resolver_without_lookup() {
        let mut config = AppConfig::default();
        config.lookup.enabled = false;
        config.observer.latitude = 10.0;
        let resolver = build_resolver(&config).unwrap();
        assert_eq!(resolver.observer().latitude, 10.0);
    }
}
