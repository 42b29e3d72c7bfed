//! Post-processing of reconstruction results.
//!
//! - [`model_selection`]: AIC ranking of fitted models
//! - [`events`]: large state changes along branches of an annotated tree
//! - [`rates`]: evolutionary rate parameters reported by a model

pub mod events;
pub mod model_selection;
pub mod rates;

pub use events::{detect_events, EventConfig, StateChangeEvent};
pub use model_selection::{aic, compare_models, ModelScore};
pub use rates::{evolutionary_rates, RateSummary};
