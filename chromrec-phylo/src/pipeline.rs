//! Dispatch of a run request to one selected reconstruction method.

use chromrec_core::Result;
use tracing::info;

use crate::config::MethodConfig;
use crate::method::ReconstructionMethod;
use crate::result::AnalysisResult;
use crate::validate::PhyloData;

/// Holds exactly one method and forwards run requests to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pipeline {
    method: ReconstructionMethod,
}

impl Pipeline {
    pub fn new(method: ReconstructionMethod) -> Self {
        Self { method }
    }

    /// Build a pipeline from a method name such as `"parsimony"` or `"ml"`.
    ///
    /// # Errors
    ///
    /// Returns [`chromrec_core::ChromrecError::Configuration`] for unknown names.
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    pub fn method(&self) -> ReconstructionMethod {
        self.method
    }

    /// Run the method and return its result unchanged.
    pub fn run(&self, data: &PhyloData, config: &MethodConfig) -> Result<AnalysisResult> {
        info!(method = %self.method, "executing pipeline");
        self.method.run(data, config)
    }
}

impl From<ReconstructionMethod> for Pipeline {
    fn from(method: ReconstructionMethod) -> Self {
        Self::new(method)
    }
}
