use serde::Deserialize;

use crate::error::ResolveError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

/// One-shot device position lookup.
#[rocket::async_trait]
pub trait Geolocator: Send + Sync {
    fn is_supported(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Position, ResolveError>;
}

/// Used when geolocation is switched off in the settings.
pub struct Unsupported;

#[rocket::async_trait]
impl Geolocator for Unsupported {
    fn is_supported(&self) -> bool {
        false
    }

    async fn current_position(&self) -> Result<Position, ResolveError> {
        Err(ResolveError::Unsupported)
    }
}

#[derive(Debug, Deserialize)]
struct IpLookup {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

impl IpLookup {
    fn into_position(self) -> Result<Position, ResolveError> {
        if self.status != "success" {
            return Err(ResolveError::Position(self.message.unwrap_or(self.status)));
        }
        match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => Ok(Position { latitude, longitude }),
            _ => Err(ResolveError::Position(String::from("lookup returned no coordinates"))),
        }
    }
}

/// Approximates the position from the public IP address (ip-api.com format).
pub struct IpGeolocator {
    http: reqwest::Client,
    url: String,
}

impl IpGeolocator {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        IpGeolocator { http, url: url.into() }
    }
}

impl IpGeolocator {
    fn request(&self) -> reqwest::Result<reqwest::Request> {
        self.http.get(&self.url).build()
    }
}

#[rocket::async_trait]
impl Geolocator for IpGeolocator {
    async fn current_position(&self) -> Result<Position, ResolveError> {
        let request = self.request()?;
        let lookup: IpLookup = self.http
            .execute(request)
            .await?
            .error_for_status()?
            .json()
            .await?;
        lookup.into_position()
    }
}
