//! Reporting
//!
//! Pure derivations over the aggregated view that the CLI prints: the
//! current DR activity of a placement, per-app subscription rows, protected
//! PVC listings and per-cluster summaries.

mod activity;
mod render;
mod selection;

pub use activity::*;
pub use render::*;
pub use selection::*;
