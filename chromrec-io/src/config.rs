//! TOML analysis configuration.
//!
//! ```toml
//! method = "ensemble"
//!
//! [config]
//! methods = [
//!     { method = "parsimony", config = { algorithm = "Fitch" } },
//!     { method = "ml", config = { model = "BM" } },
//! ]
//! ```

use std::fs;
use std::io;
use std::path::Path;

use chromrec_core::{ChromrecError, Result};
use chromrec_phylo::{MethodConfig, Pipeline, ReconstructionMethod};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One method to run and its configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub method: ReconstructionMethod,
    #[serde(default)]
    pub config: MethodConfig,
}

impl AnalysisConfig {
    /// Parse from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ChromrecError::Parse`] for malformed TOML, an unknown method
    /// name or a value of an unsupported shape.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ChromrecError::Parse(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ChromrecError::DataSourceNotFound(path.to_path_buf())
            } else {
                ChromrecError::Io(io::Error::new(
                    e.kind(),
                    format!("{}: {}", path.display(), e),
                ))
            }
        })?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), method = %config.method, keys = config.config.len(), "loaded analysis config");
        Ok(config)
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| ChromrecError::Parse(e.to_string()))
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromrec_phylo::{ConfigValue, OutcomeStatus, PhyloData, PhyloTree, TraitTable};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn data() -> PhyloData {
        let tree = PhyloTree::from_newick("(A:1,B:1,C:1);").unwrap();
        let traits: TraitTable = [("A", 2), ("B", 2), ("C", 4)].into_iter().collect();
        PhyloData::new(tree, traits).unwrap()
    }

    #[test]
    fn parsimony_config() {
        let cfg = AnalysisConfig::from_toml_str(
            r#"
            method = "parsimony"
            [config]
            algorithm = "Fitch"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.method, ReconstructionMethod::Parsimony);
        assert_eq!(
            cfg.config.get("algorithm"),
            Some(&ConfigValue::Text("Fitch".into()))
        );
    }

    #[test]
    fn config_table_is_optional() {
        let cfg = AnalysisConfig::from_toml_str("method = \"bayesian\"").unwrap();
        assert_eq!(cfg.method, ReconstructionMethod::Bayesian);
        assert!(cfg.config.is_empty());
    }

    #[test]
    fn ensemble_config_runs() {
        let cfg = AnalysisConfig::from_toml_str(
            r#"
            method = "ensemble"
            [config]
            methods = [
                { method = "parsimony", config = { algorithm = "Fitch" } },
                { method = "ml", config = { model = "BM" } },
            ]
            "#,
        )
        .unwrap();
        let result = cfg.pipeline().run(&data(), &cfg.config).unwrap();
        let statuses: Vec<_> = result
            .outcomes()
            .unwrap()
            .iter()
            .map(|o| o.status())
            .collect();
        assert_eq!(
            statuses,
            vec![OutcomeStatus::Success, OutcomeStatus::Unimplemented]
        );
    }

    #[test]
    fn sankoff_matrix_and_mcmc_table() {
        let cfg = AnalysisConfig::from_toml_str(
            r#"
            method = "parsimony"
            [config]
            algorithm = "Sankoff"
            cost_matrix = [[0.0, 1.0], [1.0, 0.0]]
            "#,
        )
        .unwrap();
        assert!(matches!(
            cfg.config.get("cost_matrix"),
            Some(ConfigValue::Matrix(_))
        ));

        let cfg = AnalysisConfig::from_toml_str(
            r#"
            method = "bayesian"
            [config.mcmc_params]
            draws = 10000
            burnin = 0.1
            "#,
        )
        .unwrap();
        match cfg.config.get("mcmc_params") {
            Some(ConfigValue::Table(t)) => {
                assert_eq!(t.get("draws"), Some(&ConfigValue::Integer(10_000)));
                assert_eq!(t.get("burnin"), Some(&ConfigValue::Float(0.1)));
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn unknown_method_rejected() {
        let err = AnalysisConfig::from_toml_str("method = \"neighbor_joining\"").unwrap_err();
        assert!(matches!(err, ChromrecError::Parse(_)));
    }

    #[test]
    fn round_trip_through_file() {
        let cfg = AnalysisConfig {
            method: ReconstructionMethod::MaximumLikelihood,
            config: MethodConfig::new().with("model", "OU"),
        };
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(file, "{}", cfg.to_toml_string().unwrap()).unwrap();
        file.flush().unwrap();
        assert_eq!(AnalysisConfig::from_path(file.path()).unwrap(), cfg);
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            AnalysisConfig::from_path("/nonexistent/analysis.toml"),
            Err(ChromrecError::DataSourceNotFound(_))
        ));
    }
}
