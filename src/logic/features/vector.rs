//! Feature Vector - Core data structure for model input
//!
//! One record of the 30 diagnostic measurements, aligned to `FEATURE_LAYOUT`.
//! Construction validates the input against the schema; a vector that exists
//! is always complete and correctly ordered.

use std::collections::HashMap;

use serde::Serialize;

use super::layout::{feature_index, FEATURE_COUNT, FEATURE_LAYOUT};
use crate::logic::error::SchemaError;

/// Ordered feature values for one record.
///
/// Never build one from raw slices without going through the checked
/// constructors; arity mismatches are hard input errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Create from an already-ordered array.
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Create from an ordered list (JSON array input). Wrong length is a
    /// schema error, never padded or truncated.
    pub fn from_ordered(values: &[f64]) -> Result<Self, SchemaError> {
        if values.len() != FEATURE_COUNT {
            return Err(SchemaError::WrongArity {
                expected: FEATURE_COUNT,
                actual: values.len(),
            });
        }
        let mut array = [0.0f64; FEATURE_COUNT];
        array.copy_from_slice(values);
        Ok(Self { values: array })
    }

    /// Create from named fields (form input). Every schema field must be
    /// present; all missing names are reported at once.
    pub fn from_named(fields: &HashMap<String, String>) -> Result<Self, SchemaError> {
        let missing: Vec<String> = FEATURE_LAYOUT
            .iter()
            .filter(|&&name| !fields.contains_key(name))
            .map(|&name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns(missing));
        }

        let mut array = [0.0f64; FEATURE_COUNT];
        for (i, &name) in FEATURE_LAYOUT.iter().enumerate() {
            let raw = &fields[name];
            array[i] = raw.trim().parse().map_err(|_| SchemaError::InvalidValue {
                column: name.to_string(),
                row: 0,
                value: raw.clone(),
            })?;
        }
        Ok(Self { values: array })
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        feature_index(name).and_then(|i| self.get(i))
    }

    /// `radius_mean`, the identifying subset stored with history records.
    pub fn radius_mean(&self) -> f64 {
        self.values[0]
    }

    /// `area_mean`, the identifying subset stored with history records.
    pub fn area_mean(&self) -> f64 {
        self.values[3]
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn named_fields() -> HashMap<String, String> {
        FEATURE_LAYOUT
            .iter()
            .enumerate()
            .map(|(i, &name)| (name.to_string(), format!("{}.5", i)))
            .collect()
    }

    #[test]
    fn test_from_ordered() {
        let values: Vec<f64> = (0..FEATURE_COUNT).map(|i| i as f64).collect();
        let vector = FeatureVector::from_ordered(&values).unwrap();
        assert_eq!(vector.get(0), Some(0.0));
        assert_eq!(vector.get(29), Some(29.0));
    }

    #[test]
    fn test_from_ordered_wrong_arity() {
        let err = FeatureVector::from_ordered(&[1.0; 29]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::WrongArity {
                expected: 30,
                actual: 29
            }
        );
    }

    #[test]
    fn test_from_named() {
        let vector = FeatureVector::from_named(&named_fields()).unwrap();
        assert_eq!(vector.get_by_name("radius_mean"), Some(0.5));
        assert_eq!(vector.get_by_name("area_mean"), Some(3.5));
        assert_eq!(vector.radius_mean(), 0.5);
        assert_eq!(vector.area_mean(), 3.5);
    }

    #[test]
    fn test_from_named_reports_all_missing() {
        let mut fields = named_fields();
        fields.remove("radius_worst");
        fields.remove("symmetry_se");

        let err = FeatureVector::from_named(&fields).unwrap_err();
        match err {
            SchemaError::MissingColumns(names) => {
                assert_eq!(names, vec!["symmetry_se", "radius_worst"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_named_bad_value() {
        let mut fields = named_fields();
        fields.insert("texture_mean".to_string(), "abc".to_string());

        let err = FeatureVector::from_named(&fields).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidValue { column, .. } if column == "texture_mean"));
    }
}
