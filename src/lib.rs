// Contact Form - validation and submission controller for a contact form
//
// This is the library crate containing the controller, its collaborators and the
// configuration/state plumbing. The binary crate (main.rs) provides a terminal front end.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use crate::config::ConfigManager;
pub use crate::metrics::FormMetrics;
pub use crate::models::{FormConfig, FormData, SubmissionOutcome, SubmissionState};
pub use crate::state::{StateChange, StateManager};
pub use crate::ui::{FormController, FormError, FormEvent, SubmitDisposition};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
