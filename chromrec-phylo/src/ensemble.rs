//! Ensemble reconstruction: several methods on the same data.
//!
//! Members run in configuration order (on the calling thread, or on the
//! rayon pool with the `parallel` feature, still collected in order). A
//! member's failure is captured in its [`MethodOutcome`] and the remaining
//! members still run. The combined result carries no annotated tree; each
//! member's own result is available from [`AnalysisResult::outcomes`].

use chromrec_core::{ChromrecError, Result};
use tracing::{debug, info, warn};

use crate::config::{ConfigValue, MethodConfig};
use crate::method::MethodSpec;
use crate::result::{AnalysisResult, MethodOutcome, OutcomeStatus, RawOutput};
use crate::validate::PhyloData;

/// Run every configured member against `data`.
///
/// Parameters of the combined result:
/// - `ensemble_size`: number of outcomes recorded
/// - `methods_configured`: length of the `methods` list
/// - `methods_succeeded`: outcomes with [`OutcomeStatus::Success`]
///
/// # Errors
///
/// Only configuration problems of the ensemble itself are errors: a missing
/// `methods` key or a `methods` value that is not a method list.
pub fn run(data: &PhyloData, config: &MethodConfig) -> Result<AnalysisResult> {
    let specs = match config.require("methods", "Ensemble")? {
        ConfigValue::Methods(specs) => specs,
        other => {
            return Err(ChromrecError::Configuration(format!(
                "'methods' must be a list of (method, config) pairs, got {}",
                other.kind()
            )))
        }
    };
    info!(methods = specs.len(), "running ensemble");

    #[cfg(feature = "parallel")]
    let outcomes: Vec<MethodOutcome> = {
        use rayon::prelude::*;
        specs
            .par_iter()
            .enumerate()
            .map(|(i, spec)| run_member(data, spec, i, specs.len()))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<MethodOutcome> = specs
        .iter()
        .enumerate()
        .map(|(i, spec)| run_member(data, spec, i, specs.len()))
        .collect();

    let succeeded = outcomes
        .iter()
        .filter(|o| o.status() == OutcomeStatus::Success)
        .count();
    info!(total = outcomes.len(), succeeded, "ensemble finished");

    Ok(AnalysisResult::new()
        .with_parameter("ensemble_size", outcomes.len())
        .with_parameter("methods_configured", specs.len())
        .with_parameter("methods_succeeded", succeeded)
        .with_raw_output(RawOutput::Ensemble(outcomes)))
}

fn run_member(data: &PhyloData, spec: &MethodSpec, index: usize, total: usize) -> MethodOutcome {
    debug!(method = %spec.method, "running ensemble member {}/{}", index + 1, total);
    let outcome = MethodOutcome::new(spec.method.name(), spec.method.run(data, &spec.config));
    if let Some(err) = outcome.error() {
        warn!(method = %spec.method, status = %outcome.status(), "ensemble member failed: {}", err);
    }
    outcome
}
