// Event loop - routes UI events to the form controller
//
// The UI layer (terminal front end, tests) pushes FormEvents into a bounded mpsc
// channel. run_event_loop consumes them on a single task with these bindings:
//
//   blur(field)   -> validate_field
//   input(field)  -> clear_field_error
//   submit        -> handle_submit (runs alongside further events)
//   cancel        -> handle_cancel
//
// At most one submission is in flight; submit events arriving meanwhile are ignored.

use crate::services::{Notifier, SubmissionEndpoint};
use crate::ui::controller::{FormController, SubmitDisposition};
use crate::ui::field_source::FieldSource;
use crate::ui::prompt::ConfirmationPrompt;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

/// Capacity of the event channel created by [`event_channel`]
pub const EVENT_CHANNEL_CAPACITY: usize = 100;

/// A UI event, as delivered by the field source's event subscriptions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// A field lost focus
    Blur(String),
    /// A field's value changed
    Input(String),
    Submit,
    Cancel,
    /// Stop the loop once any in-flight submission has settled
    Shutdown,
}

/// Create a bounded channel for feeding [`run_event_loop`]
pub fn event_channel() -> (mpsc::Sender<FormEvent>, mpsc::Receiver<FormEvent>) {
    mpsc::channel(EVENT_CHANNEL_CAPACITY)
}

type InFlight<'a> = Pin<Box<dyn Future<Output = SubmitDisposition> + 'a>>;

enum Next {
    Event(Option<FormEvent>),
    Settled(SubmitDisposition),
}

/// Dispatch events to `controller` until the channel closes or [`FormEvent::Shutdown`]
/// arrives.
///
/// Blur and input events keep being handled while a submission is in flight. On exit
/// the loop waits for the in-flight submission to settle; there is no abort path.
///
/// # Returns
/// The number of submit requests handed to the controller
pub async fn run_event_loop<S, E, N, P>(
    controller: &FormController<S, E, N, P>,
    mut events: mpsc::Receiver<FormEvent>,
) -> usize
where
    S: FieldSource,
    E: SubmissionEndpoint,
    N: Notifier,
    P: ConfirmationPrompt,
{
    tracing::debug!("Form event loop started");

    let mut in_flight: Option<InFlight<'_>> = None;
    let mut submissions = 0;

    loop {
        let next = match in_flight.as_mut() {
            Some(submission) => tokio::select! {
                biased;
                disposition = submission => Next::Settled(disposition),
                event = events.recv() => Next::Event(event),
            },
            None => Next::Event(events.recv().await),
        };

        let event = match next {
            Next::Settled(disposition) => {
                tracing::debug!("Submission settled: {:?}", disposition);
                in_flight = None;
                continue;
            }
            Next::Event(None) => break,
            Next::Event(Some(event)) => event,
        };

        match event {
            FormEvent::Blur(field) => {
                if let Err(e) = controller.validate_field(&field) {
                    tracing::warn!("Blur on {} ignored: {}", field, e);
                }
            }
            FormEvent::Input(field) => {
                if let Err(e) = controller.clear_field_error(&field) {
                    tracing::warn!("Input on {} ignored: {}", field, e);
                }
            }
            FormEvent::Submit => {
                if in_flight.is_some() {
                    tracing::warn!("Submit ignored: a submission is already in flight");
                    controller.metrics().record_submit_rejected();
                } else {
                    in_flight = Some(Box::pin(controller.handle_submit()));
                    submissions += 1;
                }
            }
            FormEvent::Cancel => {
                controller.handle_cancel();
            }
            FormEvent::Shutdown => break,
        }
    }

    if let Some(submission) = in_flight.take() {
        tracing::info!("Waiting for in-flight submission before shutting down");
        let disposition = submission.await;
        tracing::debug!("Submission settled: {:?}", disposition);
    }

    tracing::debug!("Form event loop stopped");
    submissions
}
