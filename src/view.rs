//! The three mutually exclusive page panels and the single setter that
//! switches between them.

use std::{sync::Arc, time::Duration};

use log::debug;
use serde::Serialize;
use tokio::{sync::RwLock, task::JoinHandle};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum ViewState {
    Status { message: String, is_error: bool },
    Setup,
    SunsetDisplay { sunset_time: String, location_label: String },
}

impl ViewState {
    pub fn status(message: impl Into<String>) -> Self {
        ViewState::Status { message: message.into(), is_error: false }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ViewState::Status { message: message.into(), is_error: true }
    }

    /// DOM id of the panel this state makes visible.
    pub fn panel_id(&self) -> &'static str {
        match self {
            ViewState::Status { .. } => "status",
            ViewState::Setup => "setup",
            ViewState::SunsetDisplay { .. } => "sunset-display",
        }
    }
}

/// The visible state plus a counter bumped on every transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub generation: u64,
    #[serde(flatten)]
    pub state: ViewState,
}

#[derive(Debug, Clone)]
pub struct ViewController {
    current: Arc<RwLock<Snapshot>>,
}

impl Default for ViewController {
    fn default() -> Self {
        ViewController::new()
    }
}

impl ViewController {
    pub fn new() -> Self {
        ViewController {
            current: Arc::new(RwLock::new(Snapshot {
                generation: 0,
                state: ViewState::status("Loading..."),
            })),
        }
    }

    /// Replaces the visible panel and returns the new generation.
    pub async fn show(&self, state: ViewState) -> u64 {
        let mut current = self.current.write().await;
        current.generation += 1;
        debug!("view #{} -> {}", current.generation, state.panel_id());
        current.state = state;
        current.generation
    }

    pub async fn show_setup(&self) -> u64 {
        self.show(ViewState::Setup).await
    }

    pub async fn show_status(&self, message: &str, is_error: bool) -> u64 {
        let state = if is_error { ViewState::error(message) } else { ViewState::status(message) };
        self.show(state).await
    }

    pub async fn show_sunset(&self, sunset_time: &str, location_label: &str) -> u64 {
        self.show(ViewState::SunsetDisplay {
            sunset_time: sunset_time.to_owned(),
            location_label: location_label.to_owned(),
        })
        .await
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.current.read().await.clone()
    }

    pub async fn generation(&self) -> u64 {
        self.current.read().await.generation
    }

    /// Switches to setup only if nothing else was shown since `generation`.
    pub async fn revert_to_setup_if_unchanged(&self, generation: u64) -> bool {
        let mut current = self.current.write().await;
        if current.generation != generation {
            debug!("revert for view #{} skipped, now at #{}", generation, current.generation);
            return false;
        }
        current.generation += 1;
        current.state = ViewState::Setup;
        true
    }

    pub fn schedule_revert(&self, generation: u64, delay: Duration) -> JoinHandle<bool> {
        let view = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            view.revert_to_setup_if_unchanged(generation).await
        })
    }

    /// Shows `message` as an error and returns to setup after `delay`.
    pub async fn show_error_then_revert(&self, message: &str, delay: Duration) -> JoinHandle<bool> {
        let generation = self.show_status(message, true).await;
        self.schedule_revert(generation, delay)
    }
}
