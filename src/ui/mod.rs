// UI module - form controller and everything it talks to on the UI side
//
// This module contains:
// - FormController: Validation and submission lifecycle for one form
// - FieldSource: Trait over field values and error displays (MemoryFieldSource in-process)
// - ConfirmationPrompt: Blocking yes/no question used by cancel
// - run_event_loop: Routes FormEvents to the controller
// - terminal: Line-oriented front end used by the binary

pub mod controller;
pub mod events;
pub mod field_source;
pub mod prompt;
pub mod terminal;

pub use controller::{FormController, FormError, SubmitDisposition};
pub use events::{FormEvent, event_channel, run_event_loop};
pub use field_source::{FieldSource, FieldView, MemoryFieldSource};
pub use prompt::{ConfirmationPrompt, FixedAnswer};
