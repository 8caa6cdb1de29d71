//! Detect-then-repair passes over a parsed document.
//!
//! A [`Rule`] inspects the tree and records what it found in a [`RuleContext`]
//! under its own [`EvidenceKey`]. The [`Fix`]es registered with that rule read
//! the evidence back and edit the tree. Neither side knows how the other works;
//! the key is the whole contract.

pub mod context;
pub mod errors;
pub mod rules;

pub use context::{EvidenceKey, RuleContext};
pub use errors::ValidationError;

use serde::Serialize;
use tracing::{debug, info};

use crate::dom::DomDocument;

pub trait Rule {
    fn name(&self) -> &'static str;

    /// Writes this rule's evidence into `context` and returns whether any
    /// defect was found.
    fn apply(
        &self,
        document: &DomDocument,
        context: &mut RuleContext,
    ) -> Result<bool, ValidationError>;
}

pub trait Fix {
    fn name(&self) -> &'static str;

    fn execute(
        &self,
        rule: &dyn Rule,
        context: &RuleContext,
        document: &mut DomDocument,
    ) -> Result<(), ValidationError>;
}

/// One rule that found something, and the fixes that were applied for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleActivation {
    pub rule: &'static str,
    pub fixes: Vec<&'static str>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub activations: Vec<RuleActivation>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.activations.is_empty()
    }

    pub fn activated(&self, rule: &str) -> bool {
        self.activations.iter().any(|activation| activation.rule == rule)
    }

    pub fn fixes_applied(&self) -> usize {
        self.activations.iter().map(|a| a.fixes.len()).sum()
    }
}

struct Registration {
    rule: Box<dyn Rule>,
    fixes: Vec<Box<dyn Fix>>,
}

/// Ordered registry of rules and their fixes.
#[derive(Default)]
pub struct Validator {
    registrations: Vec<Registration>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in rule catalog.
    pub fn with_default_rules() -> Self {
        let mut validator = Self::new();
        validator.register(
            rules::MetaNameMisuseRule,
            vec![Box::new(rules::MetaNameMisuseFix)],
        );
        validator.register(
            rules::MissingOpenGraphNamespaceRule,
            vec![Box::new(rules::MissingOpenGraphNamespaceFix)],
        );
        validator.register(rules::AboutNotIriRule, Vec::new());
        validator
    }

    pub fn register<R: Rule + 'static>(&mut self, rule: R, fixes: Vec<Box<dyn Fix>>) {
        self.registrations.push(Registration {
            rule: Box::new(rule),
            fixes,
        });
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.registrations.iter().map(|r| r.rule.name()).collect()
    }

    /// Runs every rule in registration order, each with a fresh context.
    /// Fixes run only for rules that found something, and only if `apply_fixes`.
    pub fn validate(
        &self,
        document: &mut DomDocument,
        apply_fixes: bool,
    ) -> Result<ValidationReport, ValidationError> {
        let mut report = ValidationReport::default();

        for registration in &self.registrations {
            let rule = registration.rule.as_ref();
            let mut context = RuleContext::new();
            if !rule.apply(document, &mut context)? {
                continue;
            }
            debug!(rule = rule.name(), document = %document.base(), "Rule activated");

            let mut applied = Vec::new();
            if apply_fixes {
                for fix in &registration.fixes {
                    fix.execute(rule, &context, document)?;
                    applied.push(fix.name());
                }
            }
            report.activations.push(RuleActivation {
                rule: rule.name(),
                fixes: applied,
            });
        }

        if !report.is_clean() {
            info!(
                document = %document.base(),
                activations = report.activations.len(),
                fixes = report.fixes_applied(),
                "Validation found issues"
            );
        }
        Ok(report)
    }
}
