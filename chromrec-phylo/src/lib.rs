//! Ancestral character-state reconstruction on rooted phylogenetic trees.
//!
//! - **Tree model**: arena-backed rooted trees with multifurcations and
//!   unary nodes, Newick reading and writing
//! - **Trait table**: one discrete state per leaf, typically a chromosome count
//! - **Validation**: [`PhyloData`] pairs a tree with a trait table whose
//!   names match its leaves exactly
//! - **Fitch parsimony**: two-pass small parsimony with a deterministic
//!   tie-break
//! - **Methods**: [`ReconstructionMethod`] with parsimony, likelihood,
//!   Bayesian and ensemble variants, dispatched through a [`Pipeline`]
//! - **Analysis**: AIC model comparison, event detection and rate lookup
//!
//! # Features
//!
//! - `serde`: derive `Serialize`/`Deserialize` for trees, states and configuration
//! - `parallel`: run ensemble members on the rayon thread pool

pub mod analysis;
pub mod config;
pub mod ensemble;
pub mod method;
pub mod newick;
pub mod parsimony;
pub mod pipeline;
pub mod result;
pub mod trait_table;
pub mod tree;
pub mod validate;

pub use analysis::{
    aic, compare_models, detect_events, evolutionary_rates, EventConfig, ModelScore, RateSummary,
    StateChangeEvent,
};
pub use config::{ConfigValue, MethodConfig};
pub use method::{MethodSpec, ReconstructionMethod};
pub use parsimony::{fitch, CostMatrix, FitchReconstruction};
pub use pipeline::Pipeline;
pub use result::{AnalysisResult, AnnotatedTree, MethodOutcome, OutcomeStatus, ParamValue, RawOutput};
pub use trait_table::{State, TraitTable};
pub use tree::{Node, NodeId, PhyloTree};
pub use validate::PhyloData;
