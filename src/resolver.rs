//! Turns a location (saved coordinates, a city name or the
//! device position) into a rendered sunset time.
//!
//! Every path ends in one of two places: the sunset panel, or an error
//! status that reverts to the setup panel after a fixed delay.

use std::{sync::Arc, time::Duration};

use log::{debug, info, warn};

use crate::{
    config::Settings,
    error::ResolveError,
    geocode::Geocoder,
    geolocate::Geolocator,
    store::{CachedLocation, Location, LocationStore},
    sunset::SunsetApi,
    time::{sunset_string, DisplayZone},
    view::ViewController,
};

pub const FETCHING_SUNSET: &str = "Fetching sunset time...";
pub const LOOKING_UP_CITY: &str = "Looking up location...";
pub const GETTING_POSITION: &str = "Getting your location...";

pub const SUNSET_FAILED: &str = "Error fetching sunset time. Please try again.";
pub const CITY_NOT_FOUND: &str = "City not found. Please try again.";
pub const CITY_LOOKUP_FAILED: &str = "Error looking up city. Please try again.";
pub const GEOLOCATION_UNSUPPORTED: &str = "Geolocation is not supported. Please enter your city manually.";
pub const POSITION_FAILED: &str = "Could not get location. Please enter your city manually.";
pub const EMPTY_CITY: &str = "Please enter a city name";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevertDelays {
    pub error: Duration,
    pub empty_input: Duration,
}

impl Default for RevertDelays {
    fn default() -> Self {
        RevertDelays::from(&Settings::default())
    }
}

impl From<&Settings> for RevertDelays {
    fn from(settings: &Settings) -> Self {
        RevertDelays {
            error: settings.error_revert(),
            empty_input: settings.empty_input_revert(),
        }
    }
}

/// What a successful resolution rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct SunsetReport {
    pub location: Location,
    pub sunset_time: String,
}

pub type Resolution = Result<SunsetReport, ResolveError>;

/// `Lat: 12.35°, Lon: -4.10°`
pub fn coordinate_label(latitude: f64, longitude: f64) -> String {
    format!("Lat: {latitude:.2}°, Lon: {longitude:.2}°")
}

#[derive(Clone)]
pub struct Resolver {
    view: ViewController,
    store: LocationStore,
    sunset: Arc<dyn SunsetApi>,
    geocoder: Arc<dyn Geocoder>,
    geolocator: Arc<dyn Geolocator>,
    zone: DisplayZone,
    delays: RevertDelays,
}

impl Resolver {
    pub fn new(
        view: ViewController,
        store: LocationStore,
        sunset: Arc<dyn SunsetApi>,
        geocoder: Arc<dyn Geocoder>,
        geolocator: Arc<dyn Geolocator>,
        zone: DisplayZone,
        delays: RevertDelays,
    ) -> Self {
        Resolver { view, store, sunset, geocoder, geolocator, zone, delays }
    }

    pub fn view(&self) -> &ViewController {
        &self.view
    }

    /// Shows `message`, schedules the revert to setup and hands `cause` back.
    async fn fail(&self, cause: ResolveError, message: &str, delay: Duration) -> Resolution {
        warn!("{message} ({cause})");
        // Detached: the revert checks the view generation itself.
        drop(self.view.show_error_then_revert(message, delay).await);
        Err(cause)
    }

    pub async fn resolve_by_coordinates(&self, latitude: f64, longitude: f64, label: &str) -> Resolution {
        self.view.show_status(FETCHING_SUNSET, false).await;

        let sunset = match self.sunset.sunset(latitude, longitude).await {
            Ok(sunset) => sunset,
            Err(e) => return self.fail(e, SUNSET_FAILED, self.delays.error).await,
        };

        let sunset_time = sunset_string(&self.zone.localize(sunset));
        let location = Location {
            latitude,
            longitude,
            display_name: label.to_owned(),
        };
        self.store.save(&location, self.zone.today()).await;
        self.view.show_sunset(&sunset_time, label).await;
        info!("Sunset for {label} at {sunset_time}");

        Ok(SunsetReport { location, sunset_time })
    }

    pub async fn resolve_by_city(&self, city_name: &str) -> Resolution {
        self.view.show_status(LOOKING_UP_CITY, false).await;

        match self.geocoder.search(city_name).await {
            Ok(Some(place)) => {
                debug!("{city_name:?} geocoded to {:?}", place.display_name);
                self.resolve_by_coordinates(place.latitude, place.longitude, &place.short_name()).await
            }
            Ok(None) => {
                let cause = ResolveError::NoMatch(city_name.to_owned());
                self.fail(cause, CITY_NOT_FOUND, self.delays.error).await
            }
            Err(e) => self.fail(e, CITY_LOOKUP_FAILED, self.delays.error).await,
        }
    }

    /// Manual entry: blank input is rejected before any lookup happens.
    pub async fn submit_city(&self, raw: &str) -> Resolution {
        let city = raw.trim();
        if city.is_empty() {
            return self.fail(ResolveError::EmptyInput, EMPTY_CITY, self.delays.empty_input).await;
        }
        self.resolve_by_city(city).await
    }

    pub async fn resolve_by_auto_location(&self) -> Resolution {
        if !self.geolocator.is_supported() {
            return self.fail(ResolveError::Unsupported, GEOLOCATION_UNSUPPORTED, self.delays.error).await;
        }
        self.view.show_status(GETTING_POSITION, false).await;

        let position = match self.geolocator.current_position().await {
            Ok(position) => position,
            Err(e) => return self.fail(e, POSITION_FAILED, self.delays.error).await,
        };

        let (latitude, longitude) = (position.latitude, position.longitude);
        let label = match self.geocoder.reverse(latitude, longitude).await {
            Ok(address) => address.label(),
            Err(e) => {
                debug!("Reverse geocoding failed, labelling by coordinates: {e}");
                coordinate_label(latitude, longitude)
            }
        };
        self.resolve_by_coordinates(latitude, longitude, &label).await
    }

    async fn resolve_cached(&self, cached: CachedLocation) -> Resolution {
        let Location { latitude, longitude, display_name } = cached.location;
        let label = if display_name.is_empty() {
            coordinate_label(latitude, longitude)
        } else {
            display_name
        };
        self.resolve_by_coordinates(latitude, longitude, &label).await
    }

    /// Startup: resolve the saved location, or show setup when there is none.
    pub async fn load_saved_location(&self) -> Option<Resolution> {
        let cached = match self.store.load().await {
            Some(cached) => cached,
            None => {
                self.view.show_setup().await;
                return None;
            }
        };
        // Both cases look the sunset up again; only the log differs.
        if cached.is_fresh(self.zone.today()) {
            info!("Using today's saved location {:?}", cached.location.display_name);
        } else {
            info!("Refreshing stale saved location {:?}", cached.location.display_name);
        }
        Some(self.resolve_cached(cached).await)
    }

    /// Re-fetches the saved location. Does nothing when none is saved.
    pub async fn refresh(&self) -> Option<Resolution> {
        let cached = self.store.load().await?;
        Some(self.resolve_cached(cached).await)
    }
}
