//! Confidence Resolver
//!
//! Maps the classifier's raw output to what the user actually sees. The
//! invariant: confidence is the model's certainty in the *displayed* label,
//! not in the positive class. An earlier revision of this service returned
//! the raw malignant probability for every prediction, which contradicted the
//! label on every benign case; `resolve` is the corrected, canonical behavior.

use serde::Serialize;

/// Display label for a binary diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosisLabel {
    Benign,
    Malignant,
}

impl DiagnosisLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Benign => "Benign",
            Self::Malignant => "Malignant",
        }
    }
}

impl std::fmt::Display for DiagnosisLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pure mapping `(raw class, P(malignant)) -> (label, confidence)`.
///
/// raw 1 -> Malignant with `p`; raw 0 -> Benign with `1 - p`.
pub fn resolve(raw_class: u8, prob_malignant: f64) -> (DiagnosisLabel, f64) {
    debug_assert!((0.0..=1.0).contains(&prob_malignant));
    if raw_class == 1 {
        (DiagnosisLabel::Malignant, prob_malignant)
    } else {
        (DiagnosisLabel::Benign, 1.0 - prob_malignant)
    }
}

// ============================================================================
// TESTS
// ============================================================================
