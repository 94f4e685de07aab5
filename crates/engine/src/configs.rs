//! User-defined snipe configs

use crate::risk::check_enable_allowed;
use snipebot_core::{Error, NewSnipeConfig, Result, SnipeConfig, SnipeConfigPatch};
use tracing::{debug, info, warn};

/// Ordered collection of snipe configs. Mutated only through these operations.
#[derive(Debug, Default)]
pub struct SnipeConfigStore {
    configs: Vec<SnipeConfig>,
}

impl SnipeConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a config under a fresh id. New configs start disabled.
    pub fn add(&mut self, draft: NewSnipeConfig) -> Result<String> {
        draft.validate_fields()?;

        let id = uuid::Uuid::new_v4().to_string();
        let config = SnipeConfig::from_draft(id.clone(), draft);
        info!(
            "Added snipe {} for {} (target {}, max {}, amount {})",
            id,
            config.token_address.short(),
            config.target_price,
            config.max_price,
            config.amount
        );
        self.configs.push(config);
        Ok(id)
    }

    /// Shallow-merge `patch` into the config. `Ok(false)` when the id is unknown.
    ///
    /// An enabled config must still pass the enable check afterwards.
    pub fn update(&mut self, id: &str, patch: SnipeConfigPatch) -> Result<bool> {
        let Some(config) = self.configs.iter_mut().find(|c| c.id == id) else {
            debug!("Update for unknown snipe {}, ignoring", id);
            return Ok(false);
        };

        let mut candidate = config.clone();
        candidate.apply(patch);
        candidate.validate_fields()?;
        if candidate.enabled {
            // the user acknowledged when enabling
            check_enable_allowed(&candidate, true)?;
        }

        *config = candidate;
        debug!("Updated snipe {}", id);
        Ok(true)
    }

    pub fn remove(&mut self, id: &str) -> Option<SnipeConfig> {
        let pos = self.configs.iter().position(|c| c.id == id)?;
        let removed = self.configs.remove(pos);
        info!("Removed snipe {}", id);
        Some(removed)
    }

    /// Run the enable check without changing anything
    pub fn check_enable(&self, id: &str, acknowledged: bool) -> Result<()> {
        let config = self.get(id).ok_or_else(|| Error::ConfigNotFound(id.to_string()))?;
        check_enable_allowed(config, acknowledged)?;
        Ok(())
    }

    /// Switch a config on for live trading
    pub fn enable(&mut self, id: &str, acknowledged: bool) -> Result<()> {
        let config = self
            .configs
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::ConfigNotFound(id.to_string()))?;

        if let Err(violation) = check_enable_allowed(config, acknowledged) {
            warn!("Enable rejected for snipe {}: {}", id, violation);
            return Err(violation.into());
        }

        config.enabled = true;
        info!("Enabled snipe {} for {}", id, config.token_address.short());
        Ok(())
    }

    pub fn disable(&mut self, id: &str) -> Result<()> {
        let config = self
            .configs
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::ConfigNotFound(id.to_string()))?;
        config.enabled = false;
        info!("Disabled snipe {}", id);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&SnipeConfig> {
        self.configs.iter().find(|c| c.id == id)
    }

    /// Read-only copy in creation order
    pub fn list(&self) -> Vec<SnipeConfig> {
        self.configs.clone()
    }

    pub fn enabled_count(&self) -> usize {
        self.configs.iter().filter(|c| c.enabled).count()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
