//! Reconstruction methods.
//!
//! [`ReconstructionMethod`] is a closed set of strategies sharing one
//! operation, [`ReconstructionMethod::run`]. Sub-variants are picked from the
//! config:
//!
//! | Method              | Key          | Values                               |
//! |---------------------|--------------|--------------------------------------|
//! | `Parsimony`         | `algorithm`  | `Fitch` (default), `Sankoff`         |
//! |                     | `cost_matrix`| square matrix, required for Sankoff  |
//! | `MaximumLikelihood` | `model`      | `BM`, `OU` (required)                |
//! | `Bayesian`          | `model_type` | any, default `Mk`                    |
//! |                     | `mcmc_params`| table, passed to the sampler         |
//! | `Ensemble`          | `methods`    | list of [`MethodSpec`] (required)    |
//!
//! Variants without an algorithm check their configuration first and only
//! then fail with [`ChromrecError::Unimplemented`], so a bad config is always
//! reported as a configuration error.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chromrec_core::{ChromrecError, Result};

use crate::config::{ConfigValue, MethodConfig};
use crate::ensemble;
use crate::parsimony::{self, CostMatrix};
use crate::result::AnalysisResult;
use crate::validate::PhyloData;

/// A reconstruction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ReconstructionMethod {
    /// Fitch (or, eventually, Sankoff) small parsimony.
    Parsimony,
    /// Brownian motion or Ornstein-Uhlenbeck likelihood models.
    #[cfg_attr(feature = "serde", serde(alias = "ml"))]
    MaximumLikelihood,
    /// MCMC sampling of ancestral states.
    Bayesian,
    /// Several methods run one after another.
    Ensemble,
}

impl ReconstructionMethod {
    /// Every variant, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Parsimony,
        Self::MaximumLikelihood,
        Self::Bayesian,
        Self::Ensemble,
    ];

    /// Display name, also accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Parsimony => "Parsimony",
            Self::MaximumLikelihood => "MaximumLikelihood",
            Self::Bayesian => "Bayesian",
            Self::Ensemble => "Ensemble",
        }
    }

    /// Run this method on validated data.
    pub fn run(&self, data: &PhyloData, config: &MethodConfig) -> Result<AnalysisResult> {
        match self {
            Self::Parsimony => run_parsimony(data, config),
            Self::MaximumLikelihood => run_likelihood(config),
            Self::Bayesian => run_bayesian(config),
            Self::Ensemble => ensemble::run(data, config),
        }
    }
}

impl fmt::Display for ReconstructionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReconstructionMethod {
    type Err = ChromrecError;

    /// Case-insensitive lookup by name.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parsimony" => Ok(Self::Parsimony),
            "ml" | "maximum_likelihood" | "maximumlikelihood" => Ok(Self::MaximumLikelihood),
            "bayesian" => Ok(Self::Bayesian),
            "ensemble" => Ok(Self::Ensemble),
            _ => Err(ChromrecError::Configuration(format!(
                "unknown reconstruction method: '{}'",
                s
            ))),
        }
    }
}

/// A method together with its own configuration, as held by an ensemble.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MethodSpec {
    pub method: ReconstructionMethod,
    #[cfg_attr(feature = "serde", serde(default))]
    pub config: MethodConfig,
}

impl MethodSpec {
    pub fn new(method: ReconstructionMethod, config: MethodConfig) -> Self {
        Self { method, config }
    }
}

impl From<(ReconstructionMethod, MethodConfig)> for MethodSpec {
    fn from((method, config): (ReconstructionMethod, MethodConfig)) -> Self {
        Self::new(method, config)
    }
}

/// Parsimony algorithms selectable through `algorithm`.
#[derive(Debug, Clone, PartialEq)]
enum ParsimonyAlgorithm {
    Fitch,
    Sankoff(CostMatrix),
}

impl ParsimonyAlgorithm {
    fn from_config(data: &PhyloData, config: &MethodConfig) -> Result<Self> {
        const METHOD: &str = "Parsimony";
        let algorithm = config.text("algorithm", METHOD)?.unwrap_or("Fitch");
        if algorithm.eq_ignore_ascii_case("fitch") {
            return Ok(Self::Fitch);
        }
        if !algorithm.eq_ignore_ascii_case("sankoff") {
            return Err(ChromrecError::Configuration(format!(
                "unsupported parsimony algorithm: '{}' (expected 'Fitch' or 'Sankoff')",
                algorithm
            )));
        }

        let matrix = match config.require("cost_matrix", "Sankoff parsimony")? {
            ConfigValue::Matrix(rows) => CostMatrix::from_rows(rows)?,
            other => {
                return Err(ChromrecError::Configuration(format!(
                    "'cost_matrix' must be a square matrix, got {}",
                    other.kind()
                )))
            }
        };
        let observed: BTreeSet<_> = data.traits().iter().map(|(_, s)| s).collect();
        if matrix.n_states() < observed.len() {
            return Err(ChromrecError::Configuration(format!(
                "cost matrix covers {} states but the trait table has {} distinct states",
                matrix.n_states(),
                observed.len()
            )));
        }
        Ok(Self::Sankoff(matrix))
    }
}

fn run_parsimony(data: &PhyloData, config: &MethodConfig) -> Result<AnalysisResult> {
    match ParsimonyAlgorithm::from_config(data, config)? {
        ParsimonyAlgorithm::Fitch => {
            let reconstruction = parsimony::fitch(data)?;
            let score = reconstruction.score;
            Ok(AnalysisResult::new()
                .with_parameter("parsimony_score", score)
                .with_parameter("model_name", "Fitch Parsimony")
                .with_annotated_tree(reconstruction.into_annotated(data)))
        }
        ParsimonyAlgorithm::Sankoff(matrix) => Err(ChromrecError::Unimplemented(format!(
            "Sankoff parsimony ({}-state cost matrix)",
            matrix.n_states()
        ))),
    }
}

fn run_likelihood(config: &MethodConfig) -> Result<AnalysisResult> {
    const METHOD: &str = "MaximumLikelihood";
    config.require("model", METHOD)?;
    let model = config.text("model", METHOD)?.unwrap_or_default();
    match model.to_ascii_uppercase().as_str() {
        "BM" => Err(ChromrecError::Unimplemented(
            "Brownian Motion (BM) maximum likelihood".into(),
        )),
        "OU" => Err(ChromrecError::Unimplemented(
            "Ornstein-Uhlenbeck (OU) maximum likelihood".into(),
        )),
        _ => Err(ChromrecError::Configuration(format!(
            "unsupported model for maximum likelihood: '{}' (expected 'BM' or 'OU')",
            model
        ))),
    }
}

fn run_bayesian(config: &MethodConfig) -> Result<AnalysisResult> {
    const METHOD: &str = "Bayesian";
    let model_type = config.text("model_type", METHOD)?.unwrap_or("Mk");
    match config.get("mcmc_params") {
        None | Some(ConfigValue::Table(_)) => {}
        Some(other) => {
            return Err(ChromrecError::Configuration(format!(
                "Bayesian expects 'mcmc_params' to be a table, got {}",
                other.kind()
            )))
        }
    }
    Err(ChromrecError::Unimplemented(format!(
        "Bayesian MCMC reconstruction ({} model)",
        model_type
    )))
}
