//! The uniform output of every reconstruction method.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chromrec_core::{ChromrecError, Result, Summarizable};

use crate::newick;
use crate::trait_table::State;
use crate::tree::{NodeId, PhyloTree};

/// A private copy of the input tree decorated with per-node states.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedTree {
    tree: PhyloTree,
    states: Vec<State>,
    candidate_sets: Vec<BTreeSet<State>>,
}

impl AnnotatedTree {
    pub(crate) fn new(
        tree: PhyloTree,
        states: Vec<State>,
        candidate_sets: Vec<BTreeSet<State>>,
    ) -> Self {
        Self {
            tree,
            states,
            candidate_sets,
        }
    }

    pub fn tree(&self) -> &PhyloTree {
        &self.tree
    }

    /// Resolved state of node `id`.
    pub fn state(&self, id: NodeId) -> Option<&State> {
        self.states.get(id)
    }

    /// Candidate set of node `id` from the down-pass.
    pub fn candidates(&self, id: NodeId) -> Option<&BTreeSet<State>> {
        self.candidate_sets.get(id)
    }

    /// Resolved state of the first node (in pre-order) called `name`.
    pub fn state_of(&self, name: &str) -> Option<&State> {
        self.tree
            .iter_preorder()
            .find(|&id| self.tree[id].name.as_deref() == Some(name))
            .and_then(|id| self.state(id))
    }

    /// Newick string with each node's state as an `[&state=...]` comment.
    pub fn to_newick(&self) -> String {
        newick::write_with(&self.tree, |id| {
            self.states.get(id).map(|s| format!("&state={}", s))
        })
    }
}

/// A named parameter value reported by a method.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum ParamValue {
    Integer(i64),
    Float(f64),
    Text(String),
    /// Named summary statistics, e.g. a posterior mean and interval bounds.
    Summary(BTreeMap<String, f64>),
}

impl ParamValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_summary(&self) -> Option<&BTreeMap<String, f64>> {
        match self {
            Self::Summary(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => f.write_str(s),
            Self::Summary(m) => {
                f.write_str("{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for ParamValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<usize> for ParamValue {
    fn from(n: usize) -> Self {
        Self::Integer(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<BTreeMap<String, f64>> for ParamValue {
    fn from(m: BTreeMap<String, f64>) -> Self {
        Self::Summary(m)
    }
}

/// Method-specific payload carried next to the parameters.
#[derive(Debug)]
pub enum RawOutput {
    /// Per-method outcomes of an ensemble run, in configuration order.
    Ensemble(Vec<MethodOutcome>),
}

/// How a single ensemble member ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    Unimplemented,
    Error,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Unimplemented => "unimplemented",
            Self::Error => "error",
        })
    }
}

/// The result of one ensemble member: either its analysis or its error.
#[derive(Debug)]
pub struct MethodOutcome {
    method: &'static str,
    result: Result<AnalysisResult>,
}

impl MethodOutcome {
    pub fn new(method: &'static str, result: Result<AnalysisResult>) -> Self {
        Self { method, result }
    }

    /// Name of the method that produced this outcome.
    pub fn method(&self) -> &'static str {
        self.method
    }

    pub fn status(&self) -> OutcomeStatus {
        match &self.result {
            Ok(_) => OutcomeStatus::Success,
            Err(e) if e.is_unimplemented() => OutcomeStatus::Unimplemented,
            Err(_) => OutcomeStatus::Error,
        }
    }

    pub fn result(&self) -> &Result<AnalysisResult> {
        &self.result
    }

    /// The analysis, for successful outcomes.
    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.result.as_ref().ok()
    }

    /// The error, for failed or unimplemented outcomes.
    pub fn error(&self) -> Option<&ChromrecError> {
        self.result.as_ref().err()
    }

    pub fn into_result(self) -> Result<AnalysisResult> {
        self.result
    }
}

/// Uniform output record of a reconstruction method.
///
/// Built once by the method that ran and not modified afterwards.
#[derive(Debug, Default)]
pub struct AnalysisResult {
    annotated_tree: Option<AnnotatedTree>,
    parameters: BTreeMap<String, ParamValue>,
    likelihood: Option<f64>,
    raw_output: Option<RawOutput>,
}

impl AnalysisResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_annotated_tree(mut self, tree: AnnotatedTree) -> Self {
        self.annotated_tree = Some(tree);
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Log-likelihood of the fitted model.
    pub fn with_likelihood(mut self, log_likelihood: f64) -> Self {
        self.likelihood = Some(log_likelihood);
        self
    }

    pub fn with_raw_output(mut self, raw: RawOutput) -> Self {
        self.raw_output = Some(raw);
        self
    }

    pub fn annotated_tree(&self) -> Option<&AnnotatedTree> {
        self.annotated_tree.as_ref()
    }

    pub fn parameters(&self) -> &BTreeMap<String, ParamValue> {
        &self.parameters
    }

    pub fn parameter(&self, key: &str) -> Option<&ParamValue> {
        self.parameters.get(key)
    }

    pub fn likelihood(&self) -> Option<f64> {
        self.likelihood
    }

    pub fn raw_output(&self) -> Option<&RawOutput> {
        self.raw_output.as_ref()
    }

    /// Ensemble member outcomes, if this result came from an ensemble.
    pub fn outcomes(&self) -> Option<&[MethodOutcome]> {
        match &self.raw_output {
            Some(RawOutput::Ensemble(outcomes)) => Some(outcomes),
            None => None,
        }
    }
}

impl Summarizable for AnalysisResult {
    fn summary(&self) -> String {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        let mut out = format!("AnalysisResult: {}", params.join(", "));
        if let Some(ll) = self.likelihood {
            out.push_str(&format!(", logL={}", ll));
        }
        if self.annotated_tree.is_some() {
            out.push_str(" (annotated tree)");
        }
        out
    }
}
