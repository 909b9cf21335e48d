//! # View Helpers
//!
//! Display metadata for hosts rendering the workflows. Nothing here holds
//! state.

pub mod wizards;

pub use wizards::{format_wizard_progress, wizard_progress_percent, ResetFlowStep, SignUpFlowStep};
