//! Fitted scaler artifact
//!
//! Standard-score parameters exported by the training pipeline. The transform
//! is deterministic and side-effect free; the artifact is loaded once at
//! startup and shared read-only.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::Deserialize;

use crate::logic::error::PredictError;
use crate::logic::features::FEATURE_COUNT;

/// Capability interface for the scaling artifact.
///
/// The pipeline depends on this trait, not on the concrete serialization
/// format of the fitted object.
pub trait ScalerArtifact: Send + Sync {
    /// Transform one record from raw feature space to model input space.
    fn transform(&self, row: ArrayView1<f64>) -> Result<Array1<f64>, PredictError>;

    /// Transform a whole table at once (rows x features).
    fn transform_batch(&self, rows: ArrayView2<f64>) -> Result<Array2<f64>, PredictError>;
}

/// Standard scaler: `(x - mean) / scale` per feature.
#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    /// Training-time schema, validated against the layout at load
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    fn check_width(&self, width: usize) -> Result<(), PredictError> {
        if width != FEATURE_COUNT {
            return Err(PredictError::Transform(format!(
                "expected {} features, got {}",
                FEATURE_COUNT, width
            )));
        }
        Ok(())
    }
}

impl ScalerArtifact for StandardScaler {
    fn transform(&self, row: ArrayView1<f64>) -> Result<Array1<f64>, PredictError> {
        self.check_width(row.len())?;

        let mut scaled = Array1::zeros(FEATURE_COUNT);
        for i in 0..FEATURE_COUNT {
            scaled[i] = (row[i] - self.mean[i]) / self.scale[i];
        }
        Ok(scaled)
    }

    fn transform_batch(&self, rows: ArrayView2<f64>) -> Result<Array2<f64>, PredictError> {
        self.check_width(rows.ncols())?;

        let mut scaled = Array2::zeros(rows.raw_dim());
        for (r, row) in rows.rows().into_iter().enumerate() {
            for i in 0..FEATURE_COUNT {
                scaled[[r, i]] = (row[i] - self.mean[i]) / self.scale[i];
            }
        }
        Ok(scaled)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::FEATURE_LAYOUT;
    use ndarray::{arr1, Array2};

    fn scaler() -> StandardScaler {
        StandardScaler {
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            mean: vec![2.0; FEATURE_COUNT],
            scale: vec![4.0; FEATURE_COUNT],
        }
    }

    #[test]
    fn test_transform() {
        let scaled = scaler().transform(arr1(&[10.0; FEATURE_COUNT]).view()).unwrap();
        assert_eq!(scaled.len(), FEATURE_COUNT);
        assert!((scaled[0] - 2.0).abs() < 1e-12);
        assert!((scaled[29] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_wrong_width() {
        let err = scaler().transform(arr1(&[1.0; 5]).view()).unwrap_err();
        assert!(matches!(err, PredictError::Transform(_)));
    }

    #[test]
    fn test_transform_batch() {
        let mut rows = Array2::zeros((3, FEATURE_COUNT));
        rows.row_mut(1).fill(2.0);
        rows.row_mut(2).fill(6.0);

        let scaled = scaler().transform_batch(rows.view()).unwrap();
        assert_eq!(scaled.nrows(), 3);
        assert!((scaled[[0, 0]] + 0.5).abs() < 1e-12);
        assert!((scaled[[1, 0]] - 0.0).abs() < 1e-12);
        assert!((scaled[[2, 0]] - 1.0).abs() < 1e-12);
    }
}
