//! Information-theoretic comparison of fitted models.

use chromrec_core::{ChromrecError, Result};
use tracing::debug;

use crate::result::AnalysisResult;

/// One comparable model and its score.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelScore {
    pub model_name: String,
    pub log_likelihood: f64,
    pub num_params: usize,
    pub aic: f64,
}

/// Akaike Information Criterion: AIC = -2 ln(L) + 2k
pub fn aic(log_likelihood: f64, num_params: usize) -> f64 {
    -2.0 * log_likelihood + 2.0 * num_params as f64
}

/// Rank results by AIC, best (lowest) first.
///
/// A result is comparable when it has a likelihood and a non-negative
/// integer `num_params` parameter; others are skipped. `model_name` falls
/// back to `"Unknown"`.
///
/// # Errors
///
/// Returns [`ChromrecError::InvalidInput`] if `results` is empty or none of
/// them is comparable.
pub fn compare_models(results: &[AnalysisResult]) -> Result<Vec<ModelScore>> {
    if results.is_empty() {
        return Err(ChromrecError::InvalidInput(
            "no results to compare".into(),
        ));
    }

    let mut table = Vec::with_capacity(results.len());
    for (i, result) in results.iter().enumerate() {
        let Some(log_likelihood) = result.likelihood() else {
            debug!(index = i, "skipping result without likelihood");
            continue;
        };
        let Some(num_params) = result
            .parameter("num_params")
            .and_then(|p| p.as_i64())
            .and_then(|k| usize::try_from(k).ok())
        else {
            debug!(index = i, "skipping result without a usable 'num_params'");
            continue;
        };
        let model_name = result
            .parameter("model_name")
            .map(|p| p.to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        table.push(ModelScore {
            model_name,
            log_likelihood,
            num_params,
            aic: aic(log_likelihood, num_params),
        });
    }

    if table.is_empty() {
        return Err(ChromrecError::InvalidInput(
            "no result has both a likelihood and 'num_params'".into(),
        ));
    }
    table.sort_by(|a, b| a.aic.total_cmp(&b.aic));
    Ok(table)
}
