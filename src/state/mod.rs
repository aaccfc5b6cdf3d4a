// State management module
//
// This module provides the StateManager which wraps FormState with thread-safe access
// using Arc<RwLock<T>> and emits change events for UI updates.

use crate::models::{FormState, SubmissionOutcome, SubmissionState, SubmitControl};
use std::convert::Infallible;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;

/// Change events emitted when state is modified
///
/// These events notify interested parties (the front end, tests, diagnostics) about
/// lifecycle transitions without requiring them to poll the state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// Idle → Submitting
    SubmissionStarted { attempt: usize },

    /// Submitting → Idle
    SubmissionFinished { outcome: SubmissionOutcome },

    /// Submit control was disabled or re-enabled
    SubmitControlChanged { disabled: bool, loading: bool },
}

/// Rejected state transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A submission is already in flight")]
    AlreadySubmitting,
}

/// Thread-safe state manager with event emission
///
/// The central owner of the form's [`SubmissionState`]:
/// - Provides access to [`FormState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`StateChange`] events
/// - Enforces the single-flight rule ([`begin_submission`](Self::begin_submission)
///   refuses to enter Submitting twice)
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// All mutations happen on the UI thread in response to discrete events, so the lock is
/// never contended; it exists so snapshots can be handed to other threads.
pub struct StateManager {
    /// The form state protected by RwLock
    state: Arc<RwLock<FormState>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager in the Idle state
    ///
    /// The broadcast channel buffers 100 events.
    pub fn new() -> Self {
        Self::with_submit_label("Submit")
    }

    /// Create a new StateManager whose idle submit control carries `label`
    pub fn with_submit_label(label: impl Into<String>) -> Self {
        let (state_tx, _) = broadcast::channel(100);
        let state = FormState {
            submit_control: SubmitControl::idle(label),
            ..FormState::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
            state_tx,
        }
    }

    /// Get a cloned snapshot of the current state
    pub fn snapshot(&self) -> FormState {
        self.read(FormState::clone)
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let busy = state_manager.read(|state| state.is_submitting());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&FormState) -> R,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// 1. Captures the old state
    /// 2. Applies the update function
    /// 3. Detects what changed
    /// 4. Emits appropriate events
    ///
    /// # Returns
    /// The StateChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut FormState),
    {
        let Ok(changes) = self.try_update::<_, Infallible>(|state| {
            update_fn(state);
            Ok(())
        });
        changes
    }

    /// Like [`update`](Self::update), but the update function may refuse the change.
    ///
    /// The check and the mutation happen under one write lock. On `Err` the state is
    /// restored and nothing is emitted.
    pub fn try_update<F, E>(&self, update_fn: F) -> Result<Vec<StateChange>, E>
    where
        F: FnOnce(&mut FormState) -> Result<(), E>,
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let old_state = state.clone();

        if let Err(e) = update_fn(&mut state) {
            *state = old_state;
            return Err(e);
        }

        let changes = Self::detect_changes(&old_state, &state);

        for change in &changes {
            // It's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        Ok(changes)
    }

    /// Subscribe to state change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn detect_changes(old: &FormState, new: &FormState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.submission != new.submission {
            match new.submission {
                SubmissionState::Submitting => changes.push(StateChange::SubmissionStarted {
                    attempt: new.attempts,
                }),
                SubmissionState::Idle => changes.push(StateChange::SubmissionFinished {
                    outcome: new
                        .last_outcome
                        .clone()
                        .unwrap_or(SubmissionOutcome::Abandoned),
                }),
            }
        }

        if old.submit_control.disabled != new.submit_control.disabled
            || old.submit_control.loading != new.submit_control.loading
        {
            changes.push(StateChange::SubmitControlChanged {
                disabled: new.submit_control.disabled,
                loading: new.submit_control.loading,
            });
        }

        changes
    }

    pub fn is_submitting(&self) -> bool {
        self.read(FormState::is_submitting)
    }

    /// Idle → Submitting, disabling the submit control
    ///
    /// Fails without touching the state if a submission is already in flight.
    pub fn begin_submission(
        &self,
        control: SubmitControl,
    ) -> Result<Vec<StateChange>, TransitionError> {
        self.try_update(|state| {
            if state.is_submitting() {
                return Err(TransitionError::AlreadySubmitting);
            }

            state.submission = SubmissionState::Submitting;
            state.submit_control = control;
            state.attempts += 1;
            state.last_outcome = None;
            Ok(())
        })
    }

    /// Submitting → Idle, re-enabling the submit control
    ///
    /// Always applies, even if the state is already Idle, so it is safe to call from
    /// cleanup paths.
    pub fn finish_submission(
        &self,
        outcome: SubmissionOutcome,
        control: SubmitControl,
    ) -> Vec<StateChange> {
        self.update(|state| {
            state.submission = SubmissionState::Idle;
            state.submit_control = control;
            state.last_outcome = Some(outcome);
        })
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}
