//! Effect kind → executor table.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use super::effect::EffectKind;
use super::executor::EffectExecutor;
use super::executors::{
    ChoiceExecutor, ContinuousExecutor, DamageExecutor, LibraryExecutor, PermanentExecutor,
    RemovalExecutor,
};
use crate::core::{EngineError, Result};

/// Maps every effect kind to the executor that runs it.
#[derive(Clone, Default)]
pub struct ExecutorRegistry {
    executors: FxHashMap<EffectKind, Arc<dyn EffectExecutor>>,
}

impl std::fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.executors.keys().collect();
        kinds.sort();
        f.debug_struct("ExecutorRegistry").field("kinds", &kinds).finish()
    }
}

impl ExecutorRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry with every built-in executor.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ContinuousExecutor));
        registry.register(Arc::new(PermanentExecutor));
        registry.register(Arc::new(RemovalExecutor));
        registry.register(Arc::new(DamageExecutor));
        registry.register(Arc::new(LibraryExecutor));
        registry.register(Arc::new(ChoiceExecutor));
        registry
    }

    /// Register `executor` for each kind it declares, replacing any
    /// previous executor for those kinds.
    pub fn register(&mut self, executor: Arc<dyn EffectExecutor>) {
        for kind in executor.kinds() {
            debug!(?kind, executor = executor.name(), "registering executor");
            self.executors.insert(*kind, Arc::clone(&executor));
        }
    }

    #[must_use]
    pub fn get(&self, kind: EffectKind) -> Option<&Arc<dyn EffectExecutor>> {
        self.executors.get(&kind)
    }

    /// Look up an executor, failing with `MissingExecutor`.
    pub fn require(&self, kind: EffectKind) -> Result<&Arc<dyn EffectExecutor>> {
        self.get(kind).ok_or(EngineError::MissingExecutor(kind))
    }

    /// Fail unless every effect kind has an executor.
    pub fn validate(&self) -> Result<()> {
        match EffectKind::ALL.iter().find(|k| !self.executors.contains_key(k)) {
            Some(kind) => Err(EngineError::MissingExecutor(*kind)),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.executors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_is_complete() {
        let registry = ExecutorRegistry::standard();
        assert!(registry.validate().is_ok());
        assert_eq!(registry.len(), EffectKind::ALL.len());
    }

    #[test]
    fn test_empty_registry_fails_validation() {
        let registry = ExecutorRegistry::new();
        assert_eq!(
            registry.validate(),
            Err(EngineError::MissingExecutor(EffectKind::ALL[0]))
        );
        assert!(matches!(
            registry.require(EffectKind::Draw),
            Err(EngineError::MissingExecutor(EffectKind::Draw))
        ));
    }

    #[test]
    fn test_each_kind_has_one_executor() {
        let executors: [&dyn EffectExecutor; 6] = [
            &ContinuousExecutor,
            &PermanentExecutor,
            &RemovalExecutor,
            &DamageExecutor,
            &LibraryExecutor,
            &ChoiceExecutor,
        ];
        let mut seen = std::collections::BTreeSet::new();
        for executor in executors {
            for kind in executor.kinds() {
                assert!(seen.insert(*kind), "{kind:?} claimed twice");
            }
        }
        assert_eq!(seen.len(), EffectKind::ALL.len());
    }
}
