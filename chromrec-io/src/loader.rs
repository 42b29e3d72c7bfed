//! Newick tree files and trait CSV files.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use ::csv::{ReaderBuilder, Trim};
use chromrec_core::{ChromrecError, Result};
use chromrec_phylo::{PhyloData, PhyloTree, State, TraitTable};
use tracing::debug;

/// Column names of the trait CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Column holding the species (leaf) names.
    pub species_column: String,
    /// Column holding the observed state.
    pub count_column: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            species_column: "species".to_string(),
            count_column: "count".to_string(),
        }
    }
}

/// Map a failed open onto [`ChromrecError::DataSourceNotFound`] when the file
/// is missing and onto an I/O error carrying the path otherwise.
fn source_error(path: &Path, e: io::Error) -> ChromrecError {
    if e.kind() == io::ErrorKind::NotFound {
        ChromrecError::DataSourceNotFound(path.to_path_buf())
    } else {
        ChromrecError::Io(io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    }
}

/// Read a Newick tree file.
pub fn load_tree(path: impl AsRef<Path>) -> Result<PhyloTree> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| source_error(path, e))?;
    let tree = PhyloTree::from_newick(&text)?;
    debug!(path = %path.display(), nodes = tree.node_count(), leaves = tree.leaf_count(), "loaded tree");
    Ok(tree)
}

/// Read a trait table from a CSV file with a header row.
///
/// Integer fields become [`State::Count`], anything else a [`State::Label`].
/// Extra columns are ignored.
///
/// # Errors
///
/// - [`ChromrecError::DataSourceNotFound`] if the file does not exist
/// - [`ChromrecError::Configuration`] if either column is missing
/// - [`ChromrecError::InvalidInput`] for an empty field or a repeated species
/// - [`ChromrecError::Parse`] for malformed CSV
pub fn load_traits(path: impl AsRef<Path>, options: &LoadOptions) -> Result<TraitTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| source_error(path, e))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| ChromrecError::Parse(e.to_string()))?
        .clone();
    let column = |name: &str| {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            ChromrecError::Configuration(format!(
                "column '{}' not found in {} (columns: {})",
                name,
                path.display(),
                headers.iter().collect::<Vec<_>>().join(", ")
            ))
        })
    };
    let species_idx = column(&options.species_column)?;
    let count_idx = column(&options.count_column)?;

    let mut traits = TraitTable::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|e| ChromrecError::Parse(e.to_string()))?;
        // Header is line 1
        let line = row + 2;
        let field = |idx: usize, name: &str| match record.get(idx) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(ChromrecError::InvalidInput(format!(
                "{}:{}: empty '{}' field",
                path.display(),
                line,
                name
            ))),
        };
        let species = field(species_idx, &options.species_column)?;
        let state = State::parse(field(count_idx, &options.count_column)?);
        if traits.insert(species, state).is_some() {
            return Err(ChromrecError::InvalidInput(format!(
                "{}:{}: species '{}' appears more than once",
                path.display(),
                line,
                species
            )));
        }
    }

    debug!(path = %path.display(), taxa = traits.len(), "loaded trait table");
    Ok(traits)
}

/// Load a tree and a trait table and validate them against each other.
///
/// # Errors
///
/// Any error of [`load_tree`], [`load_traits`] or [`PhyloData::new`].
pub fn load_phylo_data(
    tree_path: impl AsRef<Path>,
    traits_path: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<PhyloData> {
    let tree = load_tree(tree_path)?;
    let traits = load_traits(traits_path, options)?;
    PhyloData::new(tree, traits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file(suffix: &str, contents: &str) -> NamedTempFile {
        let mut f = NamedTempFile::with_suffix(suffix).unwrap();
        write!(f, "{}", contents).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn load_valid_pair() {
        let tree = file(".nwk", "((A:1,B:1):1,C:2);\n");
        let counts = file(".csv", "species,count\nA,2\nB,2\nC,4\n");
        let data = load_phylo_data(tree.path(), counts.path(), &LoadOptions::default()).unwrap();
        assert_eq!(data.tree().leaf_count(), 3);
        assert_eq!(data.traits().get("C"), Some(&State::Count(4)));
    }

    #[test]
    fn custom_columns_and_labels() {
        let counts = file(
            ".csv",
            "genus,taxon,karyotype\nX,A,XY\nX,B, 12 \n",
        );
        let options = LoadOptions {
            species_column: "taxon".into(),
            count_column: "karyotype".into(),
        };
        let traits = load_traits(counts.path(), &options).unwrap();
        assert_eq!(traits.get("A"), Some(&State::Label("XY".into())));
        assert_eq!(traits.get("B"), Some(&State::Count(12)));
    }

    #[test]
    fn missing_files() {
        let counts = file(".csv", "species,count\nA,1\n");
        let err = load_phylo_data("/nonexistent/tree.nwk", counts.path(), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, ChromrecError::DataSourceNotFound(_)));

        let err = load_traits("/nonexistent/counts.csv", &LoadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/counts.csv"));
    }

    #[test]
    fn missing_column() {
        let counts = file(".csv", "species,chromosomes\nA,1\n");
        let err = load_traits(counts.path(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, ChromrecError::Configuration(_)));
        assert!(err.to_string().contains("'count'"));
    }

    #[test]
    fn duplicate_species() {
        let counts = file(".csv", "species,count\nA,1\nB,2\nA,3\n");
        let err = load_traits(counts.path(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, ChromrecError::InvalidInput(_)));
        assert!(err.to_string().contains(":4:"));
    }

    #[test]
    fn empty_field() {
        let counts = file(".csv", "species,count\nA,\n");
        assert!(matches!(
            load_traits(counts.path(), &LoadOptions::default()),
            Err(ChromrecError::InvalidInput(_))
        ));
    }

    #[test]
    fn mismatch_is_reported() {
        let tree = file(".nwk", "((A,B),C);");
        let counts = file(".csv", "species,count\nA,2\nB,2\nD,4\n");
        let err = load_phylo_data(tree.path(), counts.path(), &LoadOptions::default()).unwrap_err();
        match err {
            ChromrecError::DataMismatch(m) => {
                assert_eq!(m.missing_in_tree, vec!["D"]);
                assert_eq!(m.missing_in_traits, vec!["C"]);
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn deep_caterpillar_tree() {
        let n = 10_000;
        let mut newick = "(".repeat(n - 1);
        newick.push_str("t0");
        let mut csv = String::from("species,count\nt0,0\n");
        for i in 1..n {
            newick.push_str(&format!(",t{}:1)", i));
            csv.push_str(&format!("t{},{}\n", i, i % 2));
        }
        newick.push(';');
        let tree = file(".nwk", &newick);
        let counts = file(".csv", &csv);

        let data = load_phylo_data(tree.path(), counts.path(), &LoadOptions::default()).unwrap();
        assert_eq!(data.tree().leaf_count(), n);
        let result = chromrec_phylo::ReconstructionMethod::Parsimony
            .run(&data, &chromrec_phylo::MethodConfig::new())
            .unwrap();
        let annotated = result.annotated_tree().unwrap().to_newick();
        assert!(annotated.ends_with(';'));
        assert_eq!(PhyloTree::from_newick(&annotated).unwrap(), *data.tree());
    }

    #[test]
    fn malformed_newick() {
        let tree = file(".nwk", "((A,B);");
        assert!(matches!(load_tree(tree.path()), Err(ChromrecError::Parse(_))));
    }
}
