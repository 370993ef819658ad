use std::collections::HashMap;

use anyhow::{anyhow, Result};
use log::debug;

#[derive(Debug, Clone)]
enum LoadState {
    /// A load for this key is currently running; guards re-entrant loads.
    InFlight,
    Ready(String),
    Failed(String),
}

/// Injectable shared-dependency loader: each external dependency is loaded
/// at most once, the outcome (success or failure) is cached, and consumers
/// receive the service by reference rather than through ambient global
/// state. Single logical owner, so no synchronisation is needed.
#[derive(Debug, Default)]
pub struct Preloader {
    libraries: HashMap<String, LoadState>,
}

impl Preloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached resource for `name`, running `load` only if this is
    /// the first request. A failed load is cached and reported on every
    /// subsequent request without retrying.
    pub fn ensure<F>(&mut self, name: &str, load: F) -> Result<&str>
    where
        F: FnOnce() -> Result<String>,
    {
        match self.libraries.get(name) {
            Some(LoadState::InFlight) => {
                return Err(anyhow!("dependency {name} is already being loaded"));
            }
            Some(LoadState::Failed(message)) => {
                return Err(anyhow!("dependency {name} previously failed: {message}"));
            }
            Some(LoadState::Ready(_)) => {}
            None => {
                debug!("loading shared dependency {name}");
                self.libraries
                    .insert(name.to_string(), LoadState::InFlight);
                let state = match load() {
                    Ok(resource) => LoadState::Ready(resource),
                    Err(err) => LoadState::Failed(err.to_string()),
                };
                self.libraries.insert(name.to_string(), state);
            }
        }

        match self.libraries.get(name) {
            Some(LoadState::Ready(resource)) => Ok(resource),
            Some(LoadState::Failed(message)) => {
                Err(anyhow!("dependency {name} failed to load: {message}"))
            }
            _ => Err(anyhow!("dependency {name} is in an inconsistent state")),
        }
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        matches!(self.libraries.get(name), Some(LoadState::Ready(_)))
    }
}
