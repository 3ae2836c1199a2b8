use std::{sync::Arc, time::Duration};

use tokio::{sync::RwLock, task::JoinHandle, time::MissedTickBehavior};

use crate::time::{clock_string, DisplayZone};

/// The `current-time` text, refreshed once per second.
#[derive(Debug, Clone)]
pub struct Clock {
    zone: DisplayZone,
    current: Arc<RwLock<String>>,
}

impl Clock {
    pub fn new(zone: DisplayZone) -> Self {
        Clock {
            zone,
            current: Arc::new(RwLock::new(clock_string(&zone.now()))),
        }
    }

    pub async fn update_current_time(&self) -> String {
        let text = clock_string(&self.zone.now());
        *self.current.write().await = text.clone();
        text
    }

    pub async fn current_time(&self) -> String {
        self.current.read().await.clone()
    }

    /// Ticks for as long as the runtime lives. The first tick is immediate.
    pub fn start(&self) -> JoinHandle<()> {
        let clock = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                clock.update_current_time().await;
            }
        })
    }
}
