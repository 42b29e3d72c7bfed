//! Structured error types for the chromrec workspace.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for all chromrec operations.
#[derive(Debug, Error)]
pub enum ChromrecError {
    /// I/O error while reading an input that does exist
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An input file could not be found
    #[error("data source not found: {}", .0.display())]
    DataSourceNotFound(PathBuf),

    /// Parse error (malformed input data)
    #[error("parse error: {0}")]
    Parse(String),

    /// Missing or invalid configuration key, or an unknown method variant
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Tree leaves and trait table keys disagree
    #[error("{0}")]
    DataMismatch(LeafSetMismatch),

    /// Tree without leaves or empty trait table
    #[error("empty input: {0}")]
    EmptyInput(EmptyInput),

    /// Malformed node, or a violated internal consistency check
    #[error("invalid tree structure: {0}")]
    InvalidTreeStructure(String),

    /// A recognised method variant that has no implementation yet
    #[error("{0} is not implemented")]
    Unimplemented(String),

    /// Invalid input (bad arguments, out-of-range values)
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ChromrecError {
    /// True for [`ChromrecError::Unimplemented`].
    pub fn is_unimplemented(&self) -> bool {
        matches!(self, Self::Unimplemented(_))
    }
}

/// Both directions of a leaf-set mismatch between a tree and a trait table.
///
/// Names are sorted so that messages are reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeafSetMismatch {
    /// Present in the trait table but absent from the tree.
    pub missing_in_tree: Vec<String>,
    /// Present in the tree but absent from the trait table.
    pub missing_in_traits: Vec<String>,
}

impl fmt::Display for LeafSetMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mismatch between tree leaves and trait table")?;
        let mut sep = ": ";
        if !self.missing_in_tree.is_empty() {
            write!(
                f,
                "{}in trait table but not in tree: [{}]",
                sep,
                self.missing_in_tree.join(", ")
            )?;
            sep = "; ";
        }
        if !self.missing_in_traits.is_empty() {
            write!(
                f,
                "{}in tree but not in trait table: [{}]",
                sep,
                self.missing_in_traits.join(", ")
            )?;
        }
        Ok(())
    }
}

/// Which input was empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyInput {
    /// The tree has no named leaves.
    Tree,
    /// The trait table has no entries.
    TraitTable,
}

impl fmt::Display for EmptyInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tree => f.write_str("tree has no leaves"),
            Self::TraitTable => f.write_str("trait table is empty"),
        }
    }
}

/// Convenience alias used throughout the chromrec workspace.
pub type Result<T> = std::result::Result<T, ChromrecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_message_lists_both_directions() {
        let err = ChromrecError::DataMismatch(LeafSetMismatch {
            missing_in_tree: vec!["D".into()],
            missing_in_traits: vec!["C".into()],
        });
        assert_eq!(
            err.to_string(),
            "mismatch between tree leaves and trait table: \
             in trait table but not in tree: [D]; in tree but not in trait table: [C]"
        );
    }

    #[test]
    fn mismatch_message_one_direction() {
        let m = LeafSetMismatch {
            missing_in_tree: vec![],
            missing_in_traits: vec!["A".into(), "B".into()],
        };
        assert_eq!(
            m.to_string(),
            "mismatch between tree leaves and trait table: in tree but not in trait table: [A, B]"
        );
    }

    #[test]
    fn empty_input_messages() {
        assert_eq!(
            ChromrecError::EmptyInput(EmptyInput::Tree).to_string(),
            "empty input: tree has no leaves"
        );
        assert_eq!(
            ChromrecError::EmptyInput(EmptyInput::TraitTable).to_string(),
            "empty input: trait table is empty"
        );
    }

    #[test]
    fn unimplemented_predicate() {
        assert!(ChromrecError::Unimplemented("Sankoff parsimony".into()).is_unimplemented());
        assert!(!ChromrecError::Configuration("x".into()).is_unimplemented());
    }

    #[test]
    fn data_source_not_found_shows_path() {
        let err = ChromrecError::DataSourceNotFound(PathBuf::from("/no/such/tree.nwk"));
        assert_eq!(err.to_string(), "data source not found: /no/such/tree.nwk");
    }
}
