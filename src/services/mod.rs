//! Services module - the form's business logic and its outbound collaborators.
//!
//! Nothing in here touches the UI layer, so every piece can be tested on its own.
//!
//! # Components
//!
//! - [`FormValidator`]: Compiled field rules. Validation is pure: it takes a raw value
//!   and returns a [`ValidationResult`]; displaying the result is the controller's job.
//! - [`SubmissionEndpoint`]: The async call that receives validated [`FormData`](crate::models::FormData).
//!   [`SimulatedEndpoint`] stands in for a real backend.
//! - [`Notifier`]: Transient success/failure banners. [`BannerBoard`] keeps a stack of
//!   banners that dismiss themselves after a per-kind duration.
//!
//! # Validation order
//!
//! Each field runs its rules in a fixed order and stops at the first failure:
//! required, optional-and-empty short circuit, minimum length, pattern.

pub mod endpoint;
pub mod notification;
pub mod validation;

pub use endpoint::{EndpointError, SimulatedEndpoint, SubmissionEndpoint};
pub use notification::{Banner, BannerBoard, BannerKind, Notifier};
pub use validation::{FieldDefinition, FormValidator, RuleError, ValidationError, ValidationResult};
