// Field Source - the UI layer's view of the form
//
// The controller reads values and writes error annotations through this trait only.
// MemoryFieldSource is the in-process implementation used by the terminal front end.

use crate::models::SubmitControl;
use indexmap::IndexMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Read/write access to form fields and their error displays.
///
/// Values are owned by the implementation; the controller never writes them except
/// through [`reset`](Self::reset). Error displays are written only by the controller.
#[cfg_attr(test, mockall::automock)]
pub trait FieldSource {
    /// Current raw value of a field (empty if the field has no value)
    fn value(&self, field: &str) -> String;

    /// Mark the field as erroneous and display `message` next to it
    fn show_error(&self, field: &str, message: &str);

    /// Remove the error flag and message. Must be idempotent.
    fn clear_error(&self, field: &str);

    fn focus(&self, field: &str);

    /// Set every field back to empty
    fn reset(&self);

    fn render_submit_control(&self, control: &SubmitControl);
}

impl<T: FieldSource + ?Sized> FieldSource for Arc<T> {
    fn value(&self, field: &str) -> String {
        (**self).value(field)
    }

    fn show_error(&self, field: &str, message: &str) {
        (**self).show_error(field, message)
    }

    fn clear_error(&self, field: &str) {
        (**self).clear_error(field)
    }

    fn focus(&self, field: &str) {
        (**self).focus(field)
    }

    fn reset(&self) {
        (**self).reset()
    }

    fn render_submit_control(&self, control: &SubmitControl) {
        (**self).render_submit_control(control)
    }
}

/// What the UI shows for one field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldView {
    pub value: String,
    /// Error flag and message; `None` when no error is displayed
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct Views {
    fields: IndexMap<String, FieldView>,
    focused: Option<String>,
    submit_control: SubmitControl,
}

/// In-memory field source.
///
/// Thread-safe so the terminal reader thread can type into it while the event loop
/// validates on the main thread.
#[derive(Debug, Default)]
pub struct MemoryFieldSource {
    views: RwLock<Views>,
    echo: bool,
}

impl MemoryFieldSource {
    /// Create a source with one empty field per name, in the given order
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|name| (name.into(), FieldView::default()))
            .collect();

        Self {
            views: RwLock::new(Views {
                fields,
                ..Views::default()
            }),
            echo: false,
        }
    }

    /// Also print error annotations and focus changes to stdout
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Simulate the user typing into a field. Returns false for unknown fields.
    pub fn type_value(&self, field: &str, value: &str) -> bool {
        match self.write().fields.get_mut(field) {
            Some(view) => {
                view.value = value.to_string();
                true
            }
            None => false,
        }
    }

    pub fn view(&self, field: &str) -> Option<FieldView> {
        self.read().fields.get(field).cloned()
    }

    pub fn error(&self, field: &str) -> Option<String> {
        self.read().fields.get(field).and_then(|view| view.error.clone())
    }

    pub fn focused(&self) -> Option<String> {
        self.read().focused.clone()
    }

    pub fn submit_control(&self) -> SubmitControl {
        self.read().submit_control.clone()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.read().fields.contains_key(field)
    }

    /// All fields in form order
    pub fn fields(&self) -> Vec<(String, FieldView)> {
        self.read()
            .fields
            .iter()
            .map(|(name, view)| (name.clone(), view.clone()))
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, Views> {
        self.views.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Views> {
        self.views.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FieldSource for MemoryFieldSource {
    fn value(&self, field: &str) -> String {
        self.read()
            .fields
            .get(field)
            .map(|view| view.value.clone())
            .unwrap_or_default()
    }

    fn show_error(&self, field: &str, message: &str) {
        if let Some(view) = self.write().fields.get_mut(field) {
            view.error = Some(message.to_string());
        }
        if self.echo {
            println!("  ! {}: {}", field, message);
        }
    }

    fn clear_error(&self, field: &str) {
        if let Some(view) = self.write().fields.get_mut(field) {
            view.error = None;
        }
    }

    fn focus(&self, field: &str) {
        self.write().focused = Some(field.to_string());
        if self.echo {
            println!("  > focus: {}", field);
        }
    }

    fn reset(&self) {
        for view in self.write().fields.values_mut() {
            view.value.clear();
        }
    }

    fn render_submit_control(&self, control: &SubmitControl) {
        self.write().submit_control = control.clone();
        if self.echo {
            println!("  [{}]", control.label);
        }
    }
}
