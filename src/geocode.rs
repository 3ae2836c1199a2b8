use serde::Deserialize;

use crate::error::ResolveError;

#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

impl Place {
    pub fn short_name(&self) -> String {
        shorten_display_name(&self.display_name)
    }
}

/// The parts of a reverse-geocoded address used for labelling.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub state: Option<String>,
}

impl Address {
    /// `City, State`, falling back through town and village.
    pub fn label(&self) -> String {
        let locality = [&self.city, &self.town, &self.village]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .map(String::as_str)
            .unwrap_or("Your location");
        match self.state.as_deref() {
            Some(state) if !state.is_empty() => format!("{locality}, {state}"),
            _ => locality.to_owned(),
        }
    }
}

/// Keeps the first two comma-separated segments of a full address.
pub fn shorten_display_name(full: &str) -> String {
    full.split(',').take(2).collect::<Vec<_>>().join(",")
}

#[rocket::async_trait]
pub trait Geocoder: Send + Sync {
    /// First match for a free-text query, if any.
    async fn search(&self, query: &str) -> Result<Option<Place>, ResolveError>;

    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Address, ResolveError>;
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: String,
}

impl TryFrom<SearchHit> for Place {
    type Error = ResolveError;

    fn try_from(hit: SearchHit) -> Result<Self, Self::Error> {
        let parse = |s: &str| s.trim().parse::<f64>()
            .map_err(|e| ResolveError::Malformed(format!("coordinate {s:?}: {e}")));
        Ok(Place {
            latitude: parse(&hit.lat)?,
            longitude: parse(&hit.lon)?,
            display_name: hit.display_name,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Address,
}

/// Client for an OpenStreetMap Nominatim instance.
pub struct NominatimClient {
    http: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        NominatimClient { http, base_url: base_url.into().trim_end_matches('/').to_owned() }
    }
}

impl NominatimClient {
    fn search_request(&self, query: &str) -> reqwest::Result<reqwest::Request> {
        self.http
            .get(format!("{}/search", self.base_url))
            .query(&[("format", "json"), ("q", query), ("limit", "1")])
            .build()
    }

    fn reverse_request(&self, latitude: f64, longitude: f64) -> reqwest::Result<reqwest::Request> {
        self.http
            .get(format!("{}/reverse", self.base_url))
            .query(&[
                ("format", String::from("json")),
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
            ])
            .build()
    }
}

#[rocket::async_trait]
impl Geocoder for NominatimClient {
    async fn search(&self, query: &str) -> Result<Option<Place>, ResolveError> {
        let request = self.search_request(query)?;
        let hits: Vec<SearchHit> = self.http
            .execute(request)
            .await?
            .error_for_status()?
            .json()
            .await?;
        hits.into_iter().next().map(Place::try_from).transpose()
    }

    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Address, ResolveError> {
        let request = self.reverse_request(latitude, longitude)?;
        let response: ReverseResponse = self.http
            .execute(request)
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.address)
    }
}

#[cfg(test)]
mod tests {
    use rocket::serde::json::serde_json;

    use super::*;

    fn query_pairs(request: &reqwest::Request) -> Vec<(String, String)> {
        request.url().query_pairs().into_owned().collect()
    }

    fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn search_request_asks_for_one_json_match() {
        let client = NominatimClient::new(reqwest::Client::new(), "https://geo.example.test/");
        let request = client.search_request("São Paulo, BR").unwrap();

        assert_eq!(request.url().path(), "/search");
        assert_eq!(query_pairs(&request), pairs(&[("format", "json"), ("q", "São Paulo, BR"), ("limit", "1")]));
    }

    #[test]
    fn reverse_request_sends_lat_and_lon() {
        let client = NominatimClient::new(reqwest::Client::new(), "https://geo.example.test");
        let request = client.reverse_request(59.91, 10.75).unwrap();

        assert_eq!(request.url().path(), "/reverse");
        assert_eq!(query_pairs(&request), pairs(&[("format", "json"), ("lat", "59.91"), ("lon", "10.75")]));
    }

    #[test]
    fn display_name_keeps_two_segments() {
        assert_eq!(
            shorten_display_name("Paris, Ile-de-France, Metropolitan France, France"),
            "Paris, Ile-de-France"
        );
        assert_eq!(shorten_display_name("Singapore"), "Singapore");
    }

    #[test]
    fn search_hit_parses_numeric_strings() {
        let body = r#"[{"place_id": 1, "lat": "51.5073219", "lon": "-0.1276474",
            "display_name": "London, Greater London, England, United Kingdom"}]"#;
        let hits: Vec<SearchHit> = serde_json::from_str(body).unwrap();
        let place = Place::try_from(hits.into_iter().next().unwrap()).unwrap();

        assert!((place.latitude - 51.5073219).abs() < 1e-9);
        assert!((place.longitude + 0.1276474).abs() < 1e-9);
        assert_eq!(place.short_name(), "London, Greater London");
    }

    #[test]
    fn bad_coordinate_is_malformed() {
        let hit = SearchHit { lat: String::from("north"), lon: String::from("0"), display_name: String::new() };
        assert!(matches!(Place::try_from(hit), Err(ResolveError::Malformed(_))));
    }

    #[test]
    fn label_falls_back_through_localities() {
        let mut address = Address {
            village: Some(String::from("Grindelwald")),
            state: Some(String::from("Bern")),
            ..Address::default()
        };
        assert_eq!(address.label(), "Grindelwald, Bern");

        address.town = Some(String::from("Interlaken"));
        assert_eq!(address.label(), "Interlaken, Bern");

        address.city = Some(String::new());
        address.state = None;
        assert_eq!(address.label(), "Interlaken");

        assert_eq!(Address::default().label(), "Your location");
    }

    #[test]
    fn reverse_response_without_address_fails() {
        let body = r#"{"error": "Unable to geocode"}"#;
        assert!(serde_json::from_str::<ReverseResponse>(body).is_err());

        let body = r#"{"address": {"city": "Oslo", "state": "Oslo", "country": "Norge"}}"#;
        let response: ReverseResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.address.label(), "Oslo, Oslo");
    }
}
