use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use crate::validator::errors::ValidationError;

/// Names an evidence slot and the payload type stored in it.
pub struct EvidenceKey<T> {
    name: &'static str,
    _payload: PhantomData<fn() -> T>,
}

impl<T> EvidenceKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _payload: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for EvidenceKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for EvidenceKey<T> {}

impl<T> fmt::Debug for EvidenceKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EvidenceKey").field(&self.name).finish()
    }
}

/// Evidence a rule leaves behind for the fixes registered with it.
///
/// One context lives for one rule application.
#[derive(Default)]
pub struct RuleContext {
    evidence: HashMap<&'static str, Box<dyn Any>>,
}

impl RuleContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value`, replacing whatever was under the same key.
    pub fn put<T: 'static>(&mut self, key: EvidenceKey<T>, value: T) {
        self.evidence.insert(key.name, Box::new(value));
    }

    pub fn get<T: 'static>(&self, key: EvidenceKey<T>) -> Result<&T, ValidationError> {
        self.evidence
            .get(key.name)
            .ok_or(ValidationError::MissingEvidence { key: key.name })?
            .downcast_ref::<T>()
            .ok_or(ValidationError::EvidenceType { key: key.name })
    }

    pub fn remove<T: 'static>(&mut self, key: EvidenceKey<T>) -> Option<T> {
        self.evidence
            .remove(key.name)
            .and_then(|value| value.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    pub fn contains<T>(&self, key: EvidenceKey<T>) -> bool {
        self.evidence.contains_key(key.name)
    }

    pub fn len(&self) -> usize {
        self.evidence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evidence.is_empty()
    }
}

impl fmt::Debug for RuleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.evidence.keys()).finish()
    }
}
