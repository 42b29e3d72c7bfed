//! Evolutionary rate parameters reported by fitted models.

use std::collections::BTreeMap;

use chromrec_core::{ChromrecError, Result};

use crate::result::AnalysisResult;

/// Rate information found in a result.
#[derive(Debug, Clone, PartialEq)]
pub enum RateSummary {
    /// Brownian-motion rate parameter σ².
    BrownianMotion { sigma_sq: f64 },
    /// Posterior summary of the rate, e.g. mean and interval bounds.
    Bayesian { posterior: BTreeMap<String, f64> },
}

/// Look up the rate parameter of `result`.
///
/// `sigma_sq` takes precedence over `rate_posterior` when both are present.
///
/// # Errors
///
/// Returns [`ChromrecError::InvalidInput`] if neither parameter is present
/// or it has the wrong type.
pub fn evolutionary_rates(result: &AnalysisResult) -> Result<RateSummary> {
    if let Some(value) = result.parameter("sigma_sq") {
        let sigma_sq = value.as_f64().ok_or_else(|| {
            ChromrecError::InvalidInput(format!("'sigma_sq' must be numeric, got '{}'", value))
        })?;
        return Ok(RateSummary::BrownianMotion { sigma_sq });
    }
    if let Some(value) = result.parameter("rate_posterior") {
        let posterior = value.as_summary().cloned().ok_or_else(|| {
            ChromrecError::InvalidInput(format!(
                "'rate_posterior' must be a summary table, got '{}'",
                value
            ))
        })?;
        return Ok(RateSummary::Bayesian { posterior });
    }
    Err(ChromrecError::InvalidInput(
        "result has no rate parameter ('sigma_sq' or 'rate_posterior')".into(),
    ))
}
