//! Coherence audit: a lightweight divergence check on the estimate.
//!
//! The verdict combines a √τ bias-drift model with a deterministic accuracy
//! figure taken from the covariance's position block. The audit is pure:
//! the same inputs always produce the same verdict.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::constants::{AUDIT_BIAS_ERROR, AUDIT_COHERENCE_THRESHOLD};
use crate::state::position_block_variance;

/// The outcome of one audit evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuditVerdict {
    /// True while the drift estimate remains below the threshold
    pub coherent: bool,

    /// Modeled drift uncertainty, `bias_error · √τ`
    pub uncertainty: f64,

    /// Position standard deviation from the covariance diagonal (1σ)
    pub position_sigma: f64,
}

/// Evaluates the coherence heuristic against a fixed threshold.
#[derive(Debug, Clone)]
pub struct CoherenceAuditor {
    bias_error: f64,
    threshold: f64,
}

impl CoherenceAuditor {
    pub fn new() -> Self {
        Self {
            bias_error: AUDIT_BIAS_ERROR,
            threshold: AUDIT_COHERENCE_THRESHOLD,
        }
    }

    /// Audits the estimate after `proper_time_s` seconds of proper time.
    pub fn evaluate(&self, proper_time_s: f64, covariance: &DMatrix<f64>) -> AuditVerdict {
        let uncertainty = self.bias_error * proper_time_s.max(0.0).sqrt();
        AuditVerdict {
            coherent: uncertainty < self.threshold,
            uncertainty,
            position_sigma: position_block_variance(covariance).max(0.0).sqrt(),
        }
    }
}

impl Default for CoherenceAuditor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::initial_covariance;
    use approx::assert_relative_eq;

    #[test]
    fn test_fresh_session_is_coherent() {
        let auditor = CoherenceAuditor::new();
        let p = initial_covariance(1e-2);

        let verdict = auditor.evaluate(0.0, &p);
        assert!(verdict.coherent);
        assert_eq!(verdict.uncertainty, 0.0);
        assert_relative_eq!(verdict.position_sigma, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_coherence_flips_at_threshold() {
        let auditor = CoherenceAuditor::new();
        let p = initial_covariance(1e-2);

        // uncertainty = 0.001·√τ crosses 0.005 at τ = 25 s.
        assert!(auditor.evaluate(24.9, &p).coherent);
        assert!(!auditor.evaluate(25.1, &p).coherent);
    }

    #[test]
    fn test_verdict_matches_threshold_law() {
        let auditor = CoherenceAuditor::new();
        let p = initial_covariance(1e-2);

        for tau in [0.0, 1.0, 10.0, 24.0, 26.0, 1000.0] {
            let v = auditor.evaluate(tau, &p);
            assert_eq!(v.coherent, v.uncertainty < AUDIT_COHERENCE_THRESHOLD);
        }
    }

    #[test]
    fn test_idempotent_for_same_inputs() {
        let auditor = CoherenceAuditor::new();
        let p = initial_covariance(1e-2);
        assert_eq!(auditor.evaluate(12.0, &p), auditor.evaluate(12.0, &p));
    }
}
