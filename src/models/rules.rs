//! The any-phase rule set.
//!
//! Rules are opaque identifiers; their *relative order* is what evolves.
//! The canonical set is loaded from the synthesizer's default-order genome
//! and is the source of truth for membership validation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// The fixed set of any-phase rules, in the synthesizer's default order.
///
/// Every individual's rule order must be a permutation of exactly this set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: Vec<String>,
}

impl RuleSet {
    /// Creates a rule set from the default order.
    ///
    /// Fails with [`CodecError::DuplicateRule`] if the same identifier
    /// appears twice.
    pub fn new(rules: Vec<String>) -> Result<Self, CodecError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.as_str()) {
                return Err(CodecError::DuplicateRule { rule: rule.clone() });
            }
        }
        Ok(Self { rules })
    }

    /// Number of any-phase rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when the set is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// True when `rule` belongs to the set.
    pub fn contains(&self, rule: &str) -> bool {
        self.rules.iter().any(|r| r == rule)
    }

    /// The default order, as loaded from the seed genome.
    pub fn default_order(&self) -> &[String] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_duplicates() {
        let result = RuleSet::new(vec!["r1".into(), "r2".into(), "r1".into()]);
        assert!(matches!(
            result,
            Err(CodecError::DuplicateRule { rule }) if rule == "r1"
        ));
    }

    #[test]
    fn test_membership() {
        let rules = RuleSet::new(vec!["r1".into(), "r2".into()]).unwrap();
        assert_eq!(rules.len(), 2);
        assert!(rules.contains("r2"));
        assert!(!rules.contains("r3"));
    }
}
