use thiserror::Error;

/// Everything that can stop a location from turning into a rendered sunset time.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("sunset API reported status {0:?}")]
    ApiStatus(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("no geocoding match for {0:?}")]
    NoMatch(String),

    #[error("geolocation is not supported")]
    Unsupported,

    #[error("could not determine position: {0}")]
    Position(String),

    #[error("empty city name")]
    EmptyInput,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
