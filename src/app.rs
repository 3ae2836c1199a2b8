use std::sync::Arc;

use anyhow::Context;
use log::info;
use rocket::{fairing::AdHoc, Build, Rocket};

use crate::{
    clock::Clock,
    config::{GeolocationMode, Settings},
    fairing::PageLogger,
    geocode::NominatimClient,
    geolocate::{Geolocator, IpGeolocator, Unsupported},
    resolver::{RevertDelays, Resolver},
    routes,
    store::LocationStore,
    sunset::SunriseSunsetClient,
    view::ViewController,
};

/// Shared client for the external APIs; Nominatim rejects requests without a User-Agent.
pub fn http_client(settings: &Settings) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(settings.request_timeout())
        .build()
        .context("Unable to build HTTP client.")
}

/// Wires the HTTP clients, store and view from `settings`.
pub fn build(settings: &Settings) -> anyhow::Result<Rocket<Build>> {
    let zone = settings.display_zone()?;
    let http = http_client(settings)?;

    let geolocator: Arc<dyn Geolocator> = match settings.geolocation {
        GeolocationMode::Ip => Arc::new(IpGeolocator::new(http.clone(), settings.geolocation_url.as_str())),
        GeolocationMode::Disabled => Arc::new(Unsupported),
    };
    let resolver = Resolver::new(
        ViewController::new(),
        LocationStore::new(&settings.store_path),
        Arc::new(SunriseSunsetClient::new(http.clone(), settings.sunset_api_url.as_str())),
        Arc::new(NominatimClient::new(http, settings.geocoder_url.as_str())),
        geolocator,
        zone,
        RevertDelays::from(settings),
    );
    info!("Storing location in {}", settings.store_path.display());

    Ok(assemble(Clock::new(zone), resolver))
}

/// Mounts the page and, once the server is up, starts the clock and
/// resolves the saved location.
pub fn assemble(clock: Clock, resolver: Resolver) -> Rocket<Build> {
    rocket::build()
        .manage(resolver.view().clone())
        .manage(clock)
        .manage(resolver)
        .mount("/", routes::all())
        .attach(PageLogger)
        .attach(AdHoc::on_liftoff("Startup", |rocket| Box::pin(async move {
            if let Some(clock) = rocket.state::<Clock>() {
                clock.update_current_time().await;
                clock.start();
            }
            if let Some(resolver) = rocket.state::<Resolver>() {
                let resolver = resolver.clone();
                tokio::spawn(async move {
                    let _ = resolver.load_saved_location().await;
                });
            }
        })))
}
