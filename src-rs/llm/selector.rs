use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::types::ProviderAdapter;
use super::vendors::vendor_for_model;
use crate::error::RouterError;

/// Source of the default-routing choice. Production uses [`RandomPicker`];
/// tests plug in deterministic pickers.
pub trait ProviderPicker: Send + Sync {
    /// Return an index in `0..len`. `len` is never zero.
    fn pick(&self, len: usize) -> usize;
}

pub struct RandomPicker {
    rng: Mutex<StdRng>,
}

impl RandomPicker {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl ProviderPicker for RandomPicker {
    fn pick(&self, len: usize) -> usize {
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..len),
            // a poisoned rng is still a usable rng
            Err(poisoned) => poisoned.into_inner().gen_range(0..len),
        }
    }
}

/// Chooses the adapter that serves a request.
///
/// A model hint with a known vendor prefix pins the request to that vendor;
/// anything else is spread uniformly at random over the configured adapters.
pub struct ProviderSelector {
    providers: Vec<Arc<dyn ProviderAdapter>>,
    picker: Arc<dyn ProviderPicker>,
}

impl ProviderSelector {
    pub fn new(picker: Arc<dyn ProviderPicker>) -> Self {
        Self {
            providers: Vec::new(),
            picker,
        }
    }

    /// Registration happens once at startup; later registrations under the
    /// same name replace the earlier adapter.
    pub fn register_provider(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        self.providers.retain(|existing| existing.name() != adapter.name());
        self.providers.push(adapter);
    }

    pub fn active_providers(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ProviderAdapter>> {
        self.providers.iter().find(|p| p.name() == name).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn select(&self, model_hint: Option<&str>) -> Result<Arc<dyn ProviderAdapter>, RouterError> {
        if let Some(vendor) = model_hint.and_then(vendor_for_model) {
            debug!(vendor = vendor.name, hint = ?model_hint, "model hint pinned vendor");
            return self.get(vendor.name).ok_or_else(|| {
                RouterError::configuration(format!("{} provider not configured", vendor.display_name))
            });
        }

        if self.providers.is_empty() {
            return Err(RouterError::configuration("No LLM providers configured"));
        }
        let idx = self.picker.pick(self.providers.len()).min(self.providers.len() - 1);
        Ok(self.providers[idx].clone())
    }
}
