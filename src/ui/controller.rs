// Form Controller - validation and submission lifecycle for one form
//
// This module contains the FormController which coordinates between:
// - FieldSource (values and inline error displays)
// - FormValidator (static field rules)
// - SubmissionEndpoint (the async call)
// - Notifier (success/failure banners)
// - ConfirmationPrompt (cancel confirmation)
// - StateManager (Idle/Submitting lifecycle)
//
// The controller is the only stateful component. It is constructed once at startup
// and driven by the event loop in `ui::events`.

use crate::metrics::FormMetrics;
use crate::models::{FormConfig, FormData, Messages, SubmissionOutcome, SubmitControl};
use crate::services::{
    FormValidator, Notifier, RuleError, SubmissionEndpoint, ValidationResult,
};
use crate::state::{StateManager, TransitionError};
use crate::ui::field_source::FieldSource;
use crate::ui::prompt::ConfirmationPrompt;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;

/// Errors returned by controller operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("A submission is already in flight")]
    SubmissionInProgress,
}

impl From<TransitionError> for FormError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::AlreadySubmitting => FormError::SubmissionInProgress,
        }
    }
}

/// What a submit request turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitDisposition {
    /// A submission was already in flight; nothing happened
    Rejected,
    /// At least one field failed validation; errors are displayed
    Invalid,
    Submitted(SubmissionOutcome),
}

/// Controller for one contact form
///
/// Owns the compiled field rules and its collaborators. There is no global instance:
/// construct one with [`FormController::new`] and hand it to the event loop by reference.
///
/// # Example
/// ```ignore
/// let source = Arc::new(MemoryFieldSource::new(config.fields.keys()));
/// let controller = FormController::new(
///     &config,
///     Arc::clone(&source),
///     SimulatedEndpoint::from_settings(&config.settings.endpoint),
///     BannerBoard::from_settings(&config.settings.notifications),
///     FixedAnswer(true),
/// )?;
/// controller.handle_submit().await;
/// ```
pub struct FormController<S, E, N, P> {
    validator: FormValidator,
    messages: Messages,

    source: S,
    endpoint: E,
    notifier: N,
    prompt: P,

    /// Idle/Submitting lifecycle and submit control view
    state: StateManager,

    metrics: Arc<FormMetrics>,
}

impl<S, E, N, P> FormController<S, E, N, P>
where
    S: FieldSource,
    E: SubmissionEndpoint,
    N: Notifier,
    P: ConfirmationPrompt,
{
    /// Create a controller for the form described by `config`
    ///
    /// # Errors
    /// Fails if the configuration has no fields or a field pattern does not compile.
    pub fn new(
        config: &FormConfig,
        source: S,
        endpoint: E,
        notifier: N,
        prompt: P,
    ) -> Result<Self, RuleError> {
        let validator = FormValidator::from_config(config)?;
        let state = StateManager::with_submit_label(config.messages.submit_label.clone());

        source.render_submit_control(&state.read(|s| s.submit_control.clone()));

        tracing::info!("Form controller initialized");

        Ok(Self {
            validator,
            messages: config.messages.clone(),
            source,
            endpoint,
            notifier,
            prompt,
            state,
            metrics: Arc::new(FormMetrics::new()),
        })
    }

    /// Validate one field and update its error display to match.
    ///
    /// The value is read from the field source and trimmed before the rules run.
    pub fn validate_field(&self, field: &str) -> Result<ValidationResult, FormError> {
        let raw = self.source.value(field);
        let result = self
            .validator
            .validate(field, &raw)
            .ok_or_else(|| FormError::UnknownField(field.to_string()))?;

        self.display_result(field, &result);
        Ok(result)
    }

    /// Validate every field in form order, surfacing all errors at once.
    ///
    /// # Returns
    /// `true` only if every field passed
    pub fn validate_form(&self) -> bool {
        let mut all_valid = true;

        for field in self.validator.fields() {
            let raw = self.source.value(field);
            if let Some(result) = self.validator.validate(field, &raw) {
                self.display_result(field, &result);
                all_valid &= result.valid;
            }
        }

        all_valid
    }

    /// Clear one field's error flag and message. Idempotent.
    pub fn clear_field_error(&self, field: &str) -> Result<(), FormError> {
        if !self.validator.contains(field) {
            return Err(FormError::UnknownField(field.to_string()));
        }

        self.source.clear_error(field);
        Ok(())
    }

    /// Handle a submit request from the UI.
    ///
    /// Ignored while a submission is in flight. Otherwise validates the whole form and,
    /// if it passes, submits it.
    pub async fn handle_submit(&self) -> SubmitDisposition {
        if self.state.is_submitting() {
            tracing::warn!("Submit ignored: a submission is already in flight");
            self.metrics.record_submit_rejected();
            return SubmitDisposition::Rejected;
        }

        if !self.validate_form() {
            tracing::debug!("Submit blocked by validation errors");
            return SubmitDisposition::Invalid;
        }

        match self.submit_form().await {
            Ok(outcome) => SubmitDisposition::Submitted(outcome),
            Err(_) => {
                self.metrics.record_submit_rejected();
                SubmitDisposition::Rejected
            }
        }
    }

    /// Handle a cancel request: ask for confirmation, then reset the form.
    ///
    /// # Returns
    /// `true` if the user confirmed and the form was reset
    pub fn handle_cancel(&self) -> bool {
        if !self.prompt.confirm(&self.messages.cancel_confirm) {
            tracing::debug!("Cancel declined, keeping input");
            return false;
        }

        tracing::info!("Cancel confirmed, resetting form");
        self.metrics.record_cancel();
        self.reset_form();
        true
    }

    /// Submit the current values.
    ///
    /// Enters Submitting and disables the submit control, calls the endpoint once, then
    /// reports the outcome: success shows a banner and resets the form, failure shows a
    /// banner and keeps the values. Endpoint panics count as failures.
    ///
    /// Returning to Idle and re-enabling the control happens in a drop guard, so it also
    /// runs if this future is dropped mid-flight or a collaborator panics.
    ///
    /// # Errors
    /// [`FormError::SubmissionInProgress`] if another submission is in flight.
    pub async fn submit_form(&self) -> Result<SubmissionOutcome, FormError> {
        let loading = SubmitControl::loading(self.messages.submitting_label.clone());
        let attempt = {
            self.state.begin_submission(loading.clone())?;
            self.state.read(|s| s.attempts)
        };

        let mut guard = SubmissionGuard {
            state: &self.state,
            source: &self.source,
            metrics: &self.metrics,
            idle: SubmitControl::idle(self.messages.submit_label.clone()),
            outcome: None,
        };
        self.source.render_submit_control(&loading);

        let data = self.collect_form_data();
        tracing::info!(attempt, "Submitting form with {} fields", data.len());
        self.metrics.record_submission_started();

        let started = Instant::now();
        let result = AssertUnwindSafe(self.endpoint.submit(&data))
            .catch_unwind()
            .await;

        let outcome = match result {
            Ok(Ok(())) => {
                tracing::info!(attempt, "Form submitted successfully");
                self.notifier.notify_success(&self.messages.submit_success);
                self.reset_form();
                SubmissionOutcome::Succeeded
            }
            Ok(Err(e)) => {
                tracing::error!(attempt, "Form submission error: {}", e);
                self.notifier.notify_failure(&self.messages.submit_failure);
                SubmissionOutcome::Failed(e.to_string())
            }
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                tracing::error!(attempt, "Submission endpoint panicked: {}", reason);
                self.notifier.notify_failure(&self.messages.submit_failure);
                SubmissionOutcome::Failed(reason)
            }
        };

        self.metrics
            .record_submission_finished(outcome.is_success(), started.elapsed());
        guard.outcome = Some(outcome.clone());

        Ok(outcome)
    }

    /// Clear all values and error displays, then focus the first field.
    pub fn reset_form(&self) {
        self.source.reset();
        for field in self.validator.fields() {
            self.source.clear_error(field);
        }
        if let Some(first) = self.validator.first_field() {
            self.source.focus(first);
        }
    }

    /// Trimmed values of every field, in form order
    pub fn collect_form_data(&self) -> FormData {
        self.validator
            .fields()
            .map(|field| (field.to_string(), self.source.value(field).trim().to_string()))
            .collect()
    }

    fn display_result(&self, field: &str, result: &ValidationResult) {
        match (&result.error, &result.message) {
            (Some(error), Some(message)) => {
                tracing::debug!("Field {} invalid: {}", field, error);
                self.metrics.record_validation_failure();
                self.source.show_error(field, message);
            }
            _ => self.source.clear_error(field),
        }
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    pub fn metrics(&self) -> &Arc<FormMetrics> {
        &self.metrics
    }

    pub fn validator(&self) -> &FormValidator {
        &self.validator
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }
}

/// Restores Idle and re-enables the submit control when dropped.
///
/// A guard dropped without an outcome records the attempt as abandoned.
struct SubmissionGuard<'a, S: FieldSource> {
    state: &'a StateManager,
    source: &'a S,
    metrics: &'a FormMetrics,
    idle: SubmitControl,
    outcome: Option<SubmissionOutcome>,
}

impl<S: FieldSource> Drop for SubmissionGuard<'_, S> {
    fn drop(&mut self) {
        let outcome = self.outcome.take().unwrap_or_else(|| {
            tracing::warn!("Submission abandoned before the endpoint settled");
            self.metrics.record_submission_abandoned();
            SubmissionOutcome::Abandoned
        });

        self.state.finish_submission(outcome, self.idle.clone());
        self.source.render_submit_control(&self.idle);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
