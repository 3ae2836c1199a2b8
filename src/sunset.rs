use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::ResolveError;

#[rocket::async_trait]
pub trait SunsetApi: Send + Sync {
    /// Today's sunset at the given coordinates, as an absolute UTC instant.
    async fn sunset(&self, latitude: f64, longitude: f64) -> Result<DateTime<Utc>, ResolveError>;
}

#[derive(Debug, Deserialize)]
struct SunsetResponse {
    status: String,
    results: Option<SunsetResults>,
}

#[derive(Debug, Deserialize)]
struct SunsetResults {
    sunset: String,
}

impl SunsetResponse {
    fn into_sunset(self) -> Result<DateTime<Utc>, ResolveError> {
        if self.status != "OK" {
            return Err(ResolveError::ApiStatus(self.status));
        }
        let results = self.results
            .ok_or_else(|| ResolveError::Malformed(String::from("missing results")))?;
        match DateTime::parse_from_rfc3339(&results.sunset) {
            Ok(t) => Ok(t.with_timezone(&Utc)),
            Err(e) => Err(ResolveError::Malformed(format!("sunset {:?}: {e}", results.sunset))),
        }
    }
}

/// Client for the sunrise-sunset.org JSON API.
pub struct SunriseSunsetClient {
    http: reqwest::Client,
    base_url: String,
}

impl SunriseSunsetClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        SunriseSunsetClient { http, base_url: base_url.into() }
    }
}

impl SunriseSunsetClient {
    fn request(&self, latitude: f64, longitude: f64) -> reqwest::Result<reqwest::Request> {
        self.http
            .get(&self.base_url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lng", longitude.to_string()),
                ("formatted", String::from("0")),
            ])
            .build()
    }
}

#[rocket::async_trait]
impl SunsetApi for SunriseSunsetClient {
    async fn sunset(&self, latitude: f64, longitude: f64) -> Result<DateTime<Utc>, ResolveError> {
        let request = self.request(latitude, longitude)?;
        let response: SunsetResponse = self.http
            .execute(request)
            .await?
            .error_for_status()?
            .json()
            .await?;
        response.into_sunset()
    }
}
