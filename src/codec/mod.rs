//! Genome codec: JSON persistence for rule-order individuals.
//!
//! The persisted form is the file the external synthesizer loads, so
//! field names and the path scheme follow its contract exactly:
//!
//! ```json
//! { "numbOfAnyPhaseRules": 5,
//!   "orderOfAnyPhaseRules": ["r1", "r2", "r3", "r4", "r5"] }
//! ```
//!
//! Files are addressed by `(population_id, individual_id)` —
//! `orderOfRules_{pop}_{ind}.json` under the tactics directory — so
//! concurrent evaluations never collide on storage.
//!
//! Decoding fails closed: a count mismatch, a duplicate rule, or a rule
//! outside the known set is a [`CodecError`], never a silently tolerated
//! document.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::TunerConfig;
use crate::error::CodecError;
use crate::models::{Individual, RuleSet};

/// On-disk genome schema, field names per the synthesizer's contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeDocument {
    /// Declared rule count; must equal the order's length.
    #[serde(rename = "numbOfAnyPhaseRules")]
    pub numb_of_any_phase_rules: usize,
    /// The rule order itself.
    #[serde(rename = "orderOfAnyPhaseRules")]
    pub order_of_any_phase_rules: Vec<String>,
}

/// Encodes and decodes individuals to/from genome files.
///
/// Holds the tactics directory and the canonical rule set; every decode
/// validates against both the schema and the set.
#[derive(Debug, Clone)]
pub struct GenomeCodec {
    tactics_dir: PathBuf,
    rule_set: RuleSet,
}

impl GenomeCodec {
    /// Creates a codec writing under `tactics_dir`.
    pub fn new(tactics_dir: impl Into<PathBuf>, rule_set: RuleSet) -> Self {
        Self {
            tactics_dir: tactics_dir.into(),
            rule_set,
        }
    }

    /// Creates a codec from the experiment layout, loading the canonical
    /// rule set from the seed genome.
    pub fn from_config(config: &TunerConfig) -> Result<Self, CodecError> {
        let rule_set = Self::load_rule_set(&config.default_order_path)?;
        Ok(Self::new(&config.tactics_dir, rule_set))
    }

    /// Loads the canonical rule set from the seed (default-order) genome.
    pub fn load_rule_set(default_order_path: &Path) -> Result<RuleSet, CodecError> {
        let document = read_document(default_order_path)?;
        if document.numb_of_any_phase_rules != document.order_of_any_phase_rules.len() {
            return Err(CodecError::CountMismatch {
                declared: document.numb_of_any_phase_rules,
                actual: document.order_of_any_phase_rules.len(),
            });
        }
        RuleSet::new(document.order_of_any_phase_rules)
    }

    /// The canonical rule set this codec validates against.
    pub fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }

    /// Path of the genome file for `(population_id, individual_id)`.
    pub fn genome_path(&self, population_id: u32, individual_id: u32) -> PathBuf {
        self.tactics_dir
            .join(format!("orderOfRules_{population_id}_{individual_id}.json"))
    }

    /// Validates an order against the schema and the known rule set.
    pub fn validate(&self, order: &[String]) -> Result<(), CodecError> {
        if order.len() != self.rule_set.len() {
            return Err(CodecError::CountMismatch {
                declared: self.rule_set.len(),
                actual: order.len(),
            });
        }
        let mut seen = HashSet::new();
        for rule in order {
            if !self.rule_set.contains(rule) {
                return Err(CodecError::UnknownRule { rule: rule.clone() });
            }
            if !seen.insert(rule.as_str()) {
                return Err(CodecError::DuplicateRule { rule: rule.clone() });
            }
        }
        Ok(())
    }

    /// Validates and writes the individual's genome file.
    ///
    /// Returns the path the synthesizer will load it from.
    pub fn encode(&self, individual: &Individual) -> Result<PathBuf, CodecError> {
        self.validate(&individual.rule_order)?;
        let document = GenomeDocument {
            numb_of_any_phase_rules: individual.rule_count(),
            order_of_any_phase_rules: individual.rule_order.clone(),
        };
        let path = self.genome_path(individual.population_id, individual.individual_id);
        let json = serde_json::to_string_pretty(&document).map_err(|source| CodecError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| CodecError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Reads back the genome for `(population_id, individual_id)`.
    ///
    /// The result is unevaluated; `decode(encode(x))` reproduces `x`
    /// exactly for any valid unevaluated individual.
    pub fn decode(
        &self,
        population_id: u32,
        individual_id: u32,
    ) -> Result<Individual, CodecError> {
        let path = self.genome_path(population_id, individual_id);
        let document = read_document(&path)?;
        if document.numb_of_any_phase_rules != document.order_of_any_phase_rules.len() {
            return Err(CodecError::CountMismatch {
                declared: document.numb_of_any_phase_rules,
                actual: document.order_of_any_phase_rules.len(),
            });
        }
        self.validate(&document.order_of_any_phase_rules)?;
        Ok(Individual::new(
            population_id,
            individual_id,
            document.order_of_any_phase_rules,
        ))
    }
}

fn read_document(path: &Path) -> Result<GenomeDocument, CodecError> {
    let contents = fs::read_to_string(path).map_err(|source| CodecError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CodecError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_rules() -> RuleSet {
        RuleSet::new(vec![
            "r1".into(),
            "r2".into(),
            "r3".into(),
            "r4".into(),
            "r5".into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let codec = GenomeCodec::new(dir.path(), sample_rules());
        let individual = Individual::new(
            3,
            12,
            vec!["r2".into(), "r5".into(), "r1".into(), "r4".into(), "r3".into()],
        );

        codec.encode(&individual).unwrap();
        let decoded = codec.decode(3, 12).unwrap();
        assert_eq!(decoded, individual);
    }

    #[test]
    fn test_reversed_seed_round_trip() {
        // Seed scenario: default order and its reversal, five rules.
        let dir = tempdir().unwrap();
        let rules = sample_rules();
        let codec = GenomeCodec::new(dir.path(), rules.clone());

        let default = Individual::from_default_order(3, 0, &rules);
        let reversed = default.reversed(1);
        assert_eq!(reversed.rule_order, vec!["r5", "r4", "r3", "r2", "r1"]);

        codec.encode(&reversed).unwrap();
        assert_eq!(codec.decode(3, 1).unwrap(), reversed);
    }

    #[test]
    fn test_paths_keyed_by_identity_pair() {
        let codec = GenomeCodec::new("/tmp/tactics", sample_rules());
        assert_eq!(
            codec.genome_path(3, 12),
            PathBuf::from("/tmp/tactics/orderOfRules_3_12.json")
        );
        assert_ne!(codec.genome_path(3, 12), codec.genome_path(3, 13));
        assert_ne!(codec.genome_path(3, 12), codec.genome_path(4, 12));
    }

    #[test]
    fn test_decode_rejects_count_mismatch() {
        let dir = tempdir().unwrap();
        let codec = GenomeCodec::new(dir.path(), sample_rules());
        let json = r#"{"numbOfAnyPhaseRules": 4,
                       "orderOfAnyPhaseRules": ["r1","r2","r3","r4","r5"]}"#;
        fs::write(codec.genome_path(0, 0), json).unwrap();

        assert!(matches!(
            codec.decode(0, 0),
            Err(CodecError::CountMismatch { declared: 4, actual: 5 })
        ));
    }

    #[test]
    fn test_decode_rejects_duplicates() {
        let dir = tempdir().unwrap();
        let codec = GenomeCodec::new(dir.path(), sample_rules());
        let json = r#"{"numbOfAnyPhaseRules": 5,
                       "orderOfAnyPhaseRules": ["r1","r2","r3","r4","r4"]}"#;
        fs::write(codec.genome_path(0, 1), json).unwrap();

        assert!(matches!(
            codec.decode(0, 1),
            Err(CodecError::DuplicateRule { rule }) if rule == "r4"
        ));
    }

    #[test]
    fn test_decode_rejects_unknown_rule() {
        let dir = tempdir().unwrap();
        let codec = GenomeCodec::new(dir.path(), sample_rules());
        let json = r#"{"numbOfAnyPhaseRules": 5,
                       "orderOfAnyPhaseRules": ["r1","r2","r3","r4","r9"]}"#;
        fs::write(codec.genome_path(0, 2), json).unwrap();

        assert!(matches!(
            codec.decode(0, 2),
            Err(CodecError::UnknownRule { rule }) if rule == "r9"
        ));
    }

    #[test]
    fn test_decode_rejects_missing_fields() {
        let dir = tempdir().unwrap();
        let codec = GenomeCodec::new(dir.path(), sample_rules());
        fs::write(codec.genome_path(0, 3), r#"{"numbOfAnyPhaseRules": 5}"#).unwrap();

        assert!(matches!(codec.decode(0, 3), Err(CodecError::Json { .. })));
    }

    #[test]
    fn test_decode_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let codec = GenomeCodec::new(dir.path(), sample_rules());
        assert!(matches!(codec.decode(9, 9), Err(CodecError::Io { .. })));
    }

    #[test]
    fn test_encode_rejects_invalid_order() {
        let dir = tempdir().unwrap();
        let codec = GenomeCodec::new(dir.path(), sample_rules());
        let bad = Individual::new(0, 0, vec!["r1".into(), "r1".into()]);
        let err = codec.encode(&bad).unwrap_err();
        assert!(err.is_malformed_genome());
    }

    #[test]
    fn test_load_rule_set_from_seed_genome() {
        let dir = tempdir().unwrap();
        let seed_path = dir.path().join("defaultOrderOfRules.json");
        let json = r#"{"numbOfAnyPhaseRules": 3,
                       "orderOfAnyPhaseRules": ["a","b","c"]}"#;
        fs::write(&seed_path, json).unwrap();

        let rules = GenomeCodec::load_rule_set(&seed_path).unwrap();
        assert_eq!(rules.default_order(), ["a", "b", "c"]);
    }

    #[test]
    fn test_codec_from_experiment_layout() {
        let dir = tempdir().unwrap();
        let seed_path = dir.path().join("defaultOrderOfRules.json");
        let json = r#"{"numbOfAnyPhaseRules": 2,
                       "orderOfAnyPhaseRules": ["x","y"]}"#;
        fs::write(&seed_path, json).unwrap();

        let config = TunerConfig::new(dir.path(), &seed_path, dir.path());
        let codec = GenomeCodec::from_config(&config).unwrap();
        assert_eq!(codec.rule_set().len(), 2);

        let individual = Individual::new(0, 0, vec!["y".into(), "x".into()]);
        codec.encode(&individual).unwrap();
        assert_eq!(codec.decode(0, 0).unwrap(), individual);
    }
}
