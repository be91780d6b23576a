//! Feature Layout - Centralized Feature Schema
//!
//! **CRITICAL: This file controls the input schema**
//!
//! The scaler and classifier artifacts were fitted against exactly these 30
//! columns in exactly this order. Both artifacts carry their training-time
//! `feature_names` and are validated against this layout at load.
//!
//! Rule: the layout never changes without re-exporting both artifacts.

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Column names in the exact order they appear in every feature vector.
/// This is the SINGLE SOURCE OF TRUTH for the input schema.
///
/// Spellings match the diagnostic dataset headers verbatim, including the
/// space in the `concave points_*` columns.
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Mean values (0-9) ===
    "radius_mean",
    "texture_mean",
    "perimeter_mean",
    "area_mean",
    "smoothness_mean",
    "compactness_mean",
    "concavity_mean",
    "concave points_mean",
    "symmetry_mean",
    "fractal_dimension_mean",
    // === Standard error (10-19) ===
    "radius_se",
    "texture_se",
    "perimeter_se",
    "area_se",
    "smoothness_se",
    "compactness_se",
    "concavity_se",
    "concave points_se",
    "symmetry_se",
    "fractal_dimension_se",
    // === Worst (largest) values (20-29) ===
    "radius_worst",
    "texture_worst",
    "perimeter_worst",
    "area_worst",
    "smoothness_worst",
    "compactness_worst",
    "concavity_worst",
    "concave points_worst",
    "symmetry_worst",
    "fractal_dimension_worst",
];

/// Total number of features.
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 30;

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name (O(n) but the schema is small)
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

/// Check that an external name list matches the layout exactly (names AND order).
///
/// Used when loading artifacts: a scaler or classifier fitted on a different
/// schema must be rejected at startup, never silently tolerated.
pub fn matches_layout(names: &[String]) -> bool {
    names.len() == FEATURE_COUNT
        && names.iter().zip(FEATURE_LAYOUT.iter()).all(|(a, &b)| a == b)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 30);
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_layout_groups() {
        assert_eq!(feature_name(0), Some("radius_mean"));
        assert_eq!(feature_name(3), Some("area_mean"));
        assert_eq!(feature_name(10), Some("radius_se"));
        assert_eq!(feature_name(20), Some("radius_worst"));
        assert_eq!(feature_name(29), Some("fractal_dimension_worst"));
        assert_eq!(feature_name(30), None);
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("radius_mean"), Some(0));
        assert_eq!(feature_index("concave points_worst"), Some(27));
        assert_eq!(feature_index("nonexistent"), None);
    }

    #[test]
    fn test_no_duplicate_names() {
        for (i, a) in FEATURE_LAYOUT.iter().enumerate() {
            for b in &FEATURE_LAYOUT[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_matches_layout() {
        let exact: Vec<String> = FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect();
        assert!(matches_layout(&exact));

        let mut reordered = exact.clone();
        reordered.swap(0, 1);
        assert!(!matches_layout(&reordered));

        assert!(!matches_layout(&exact[..29]));
    }
}
