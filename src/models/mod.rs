//! Data models for the contact form.
//!
//! - [`FormConfig`]: Field rules, user-facing texts and runtime settings loaded from `Contact Form.yaml`
//! - [`FormState`]: Submission lifecycle state (wrapped by [`StateManager`](crate::state::StateManager))
//! - [`FormData`]: The ordered field map handed to the submission endpoint
//!
//! Config structs derive `Serialize`/`Deserialize` for YAML persistence. Field rules live
//! in an `IndexMap` because validation and reset order follow the form's insertion order.

pub mod config;
pub mod form_state;

pub use config::{
    EMAIL_PATTERN, EndpointSettings, FieldRule, FormConfig, FormSettings, Messages,
    NotificationSettings,
};
pub use form_state::{FormData, FormState, SubmissionOutcome, SubmissionState, SubmitControl};
