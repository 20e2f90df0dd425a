//! Registry for named extractors and mutators.

use crate::control::Control;
use log::debug;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Custom value extraction for a control.
///
/// Returning `None` means the control contributes no value, which keeps any
/// value already bound at its path.
pub trait Extractor: Send + Sync {
    fn extract(&self, control: &Control) -> Option<Value>;
}

/// Custom value application for a control during population.
pub trait Mutator: Send + Sync {
    fn apply(&self, control: &mut Control, value: &Value);
}

impl<F> Extractor for F
where
    F: Fn(&Control) -> Option<Value> + Send + Sync,
{
    fn extract(&self, control: &Control) -> Option<Value> {
        self(control)
    }
}

impl<F> Mutator for F
where
    F: Fn(&mut Control, &Value) + Send + Sync,
{
    fn apply(&self, control: &mut Control, value: &Value) {
        self(control, value)
    }
}

/// In-memory registry resolving extractor and mutator names.
#[derive(Default, Clone)]
pub struct ExtractorRegistry {
    extractors: Arc<RwLock<HashMap<String, Arc<dyn Extractor>>>>,
    mutators: Arc<RwLock<HashMap<String, Arc<dyn Mutator>>>>,
}

impl ExtractorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extractor under `name`, replacing any previous one.
    pub fn register_extractor(&self, name: impl Into<String>, extractor: Arc<dyn Extractor>) {
        let name = name.into();
        debug!("registering extractor (name={})", name);
        self.extractors.write().insert(name, extractor);
    }

    /// Register a mutator under `name`, replacing any previous one.
    pub fn register_mutator(&self, name: impl Into<String>, mutator: Arc<dyn Mutator>) {
        let name = name.into();
        debug!("registering mutator (name={})", name);
        self.mutators.write().insert(name, mutator);
    }

    pub fn extractor(&self, name: &str) -> Option<Arc<dyn Extractor>> {
        self.extractors.read().get(name).cloned()
    }

    pub fn mutator(&self, name: &str) -> Option<Arc<dyn Mutator>> {
        self.mutators.read().get(name).cloned()
    }

    /// Registered extractor names, sorted.
    pub fn extractor_names(&self) -> Vec<String> {
        let mut names = self.extractors.read().keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }
}
