//! Input loading for chromrec analyses.
//!
//! - **Trees**: Newick files into [`PhyloTree`](chromrec_phylo::PhyloTree)
//! - **Trait tables**: CSV files with a species column and a state column
//! - **Validated data**: [`load_phylo_data`] reads both and pairs them
//! - **Analysis configuration**: TOML files naming a method and its config

pub mod config;
pub mod loader;

pub use config::AnalysisConfig;
pub use loader::{load_phylo_data, load_traits, load_tree, LoadOptions};
