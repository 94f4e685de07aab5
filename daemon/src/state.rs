//! Application state shared across background tasks

use crate::settings::DaemonSettings;
use snipebot_engine::{demo, SnipeEngine};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SnipeEngine>,
    pub settings: Arc<DaemonSettings>,
}

impl AppState {
    pub fn new(settings: DaemonSettings) -> Self {
        let engine = match settings.seed {
            Some(seed) => SnipeEngine::seeded(settings.engine.clone(), seed),
            None => SnipeEngine::simulated(settings.engine.clone()),
        };

        Self {
            engine: Arc::new(engine),
            settings: Arc::new(settings),
        }
    }

    /// Register demo data and startup snipes. A rejected snipe is logged and skipped.
    pub async fn bootstrap(&self) {
        if self.settings.demo_mode {
            if let Err(e) = demo::seed(&self.engine).await {
                warn!("Failed to load demo data: {}", e);
            }
        }

        for snipe in &self.settings.snipes {
            let id = match self.engine.add_config(snipe.config.clone()).await {
                Ok(id) => id,
                Err(e) => {
                    warn!("Skipping startup snipe for {}: {}", snipe.config.token_address, e);
                    continue;
                }
            };

            if snipe.enabled {
                if let Err(e) = self.engine.enable_config(&id, snipe.acknowledged).await {
                    warn!("Startup snipe {} left disabled: {}", id, e);
                }
            }
        }

        info!(
            "Bootstrapped {} snipe config(s)",
            self.engine.configs().await.len()
        );
    }
}
