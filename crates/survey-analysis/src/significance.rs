//! The `p < alpha` decision that gates plots and report flags.

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_ALPHA: f64 = 0.05;

/// Whether `p_value` is strictly below `alpha`. A NaN p-value is never
/// significant.
///
/// ```
/// use survey_analysis::significance::is_significant;
///
/// assert!(is_significant(0.04, 0.05));
/// assert!(!is_significant(0.05, 0.05));
/// assert!(!is_significant(f64::NAN, 0.05));
/// ```
#[must_use]
pub fn is_significant(p_value: f64, alpha: f64) -> bool {
    p_value < alpha
}

/// Significance threshold used to decide which results get plotted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignificanceGate {
    pub alpha: f64,
}

impl Default for SignificanceGate {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl SignificanceGate {
    #[must_use]
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }

    #[must_use]
    pub fn check(&self, p_value: f64) -> bool {
        let significant = is_significant(p_value, self.alpha);
        debug!(p_value, alpha = self.alpha, significant, "significance check");
        significant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_alpha() {
        let gate = SignificanceGate::default();
        assert!(gate.check(0.04));
        assert!(!gate.check(1.0));
        assert!(!gate.check(0.05));
    }

    #[test]
    fn test_custom_alpha() {
        let gate = SignificanceGate::new(0.01);
        assert!(!gate.check(0.04));
        assert!(gate.check(0.001));
        assert!(gate.check(0.0));
    }
}
