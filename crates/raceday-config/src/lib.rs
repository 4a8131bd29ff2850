//! Configuration loading for the raceday ingestion pipeline.
//!
//! Two layers, as in the teacher workspace: environment variables for
//! per-deployment secrets and connection info ([`RuntimeConfig`]), and
//! layered YAML files for static tuning knobs that operators may want to
//! override without a redeploy ([`load_layered_yaml`]).

mod layered;
mod runtime;

pub use layered::{load_layered_yaml, LoadedConfig};
pub use runtime::RuntimeConfig;
