//! Durable storage for the last location a sunset was fetched for.
//!
//! The store is a small YAML document holding four scalar keys: `lat`, `lon`,
//! `locationName` and `lastFetch`. It is overwritten on every successful
//! lookup and never deleted.

use std::{
    io::ErrorKind,
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering},
};

use chrono::NaiveDate;
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedLocation {
    pub location: Location,
    pub last_fetch: Option<NaiveDate>,
}

impl CachedLocation {
    /// Fresh means the sunset was already fetched for this calendar date.
    pub fn is_fresh(&self, today: NaiveDate) -> bool {
        self.last_fetch == Some(today)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredFields {
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(rename = "locationName")]
    location_name: Option<String>,
    #[serde(rename = "lastFetch")]
    last_fetch: Option<NaiveDate>,
}

impl StoredFields {
    fn into_cached(self) -> Option<CachedLocation> {
        let (latitude, longitude) = (self.lat?, self.lon?);
        Some(CachedLocation {
            location: Location {
                latitude,
                longitude,
                display_name: self.location_name.unwrap_or_default(),
            },
            last_fetch: self.last_fetch,
        })
    }
}

static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct LocationStore {
    path: PathBuf,
}

impl LocationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LocationStore { path: path.into() }
    }

    /// Returns `None` when nothing was ever saved. Unreadable files are
    /// logged and treated the same way.
    pub async fn load(&self) -> Option<CachedLocation> {
        match self.read().await {
            Ok(fields) => fields.into_cached(),
            Err(StoreError::Io(e)) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Ignoring unreadable location store {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Overwrites the stored location. Failures are logged, not returned.
    pub async fn save(&self, location: &Location, fetch_date: NaiveDate) {
        let fields = StoredFields {
            lat: Some(location.latitude),
            lon: Some(location.longitude),
            location_name: Some(location.display_name.clone()),
            last_fetch: Some(fetch_date),
        };
        match self.write(&fields).await {
            Ok(()) => debug!("Saved location {:?} to {}", location.display_name, self.path.display()),
            Err(e) => error!("Unable to save location to {}: {}", self.path.display(), e),
        }
    }

    async fn read(&self) -> Result<StoredFields, StoreError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        if text.trim().is_empty() {
            return Ok(StoredFields::default());
        }
        Ok(serde_yaml::from_str(&text)?)
    }

    async fn write(&self, fields: &StoredFields) -> Result<(), StoreError> {
        let text = serde_yaml::to_string(fields)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        // Each write gets its own temp file so overlapping saves cannot
        // rename each other's file away.
        let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = self.path.with_extension(format!("{}.{}.tmp", std::process::id(), seq));
        tokio::fs::write(&tmp, text).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
